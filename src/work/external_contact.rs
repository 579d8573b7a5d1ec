//! Customer contact ("external contact") management.
//!
//! Seven components share this module, one per capability area:
//! contacts themselves, contact ways, statistics, group messages, the school
//! variant, moments, and group welcome templates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalProfile {
    #[serde(default)]
    pub external_userid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(rename = "type", default)]
    pub contact_type: i32,
    #[serde(default)]
    pub gender: i32,
    #[serde(default)]
    pub unionid: Option<String>,
    #[serde(default)]
    pub corp_name: Option<String>,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalContactDetail {
    #[serde(default)]
    pub external_contact: ExternalProfile,
    #[serde(default)]
    pub follow_user: Vec<Value>,
    #[serde(default)]
    pub next_cursor: String,
}

#[derive(Deserialize)]
struct FollowUsers {
    #[serde(default)]
    follow_user: Vec<String>,
}

#[derive(Deserialize)]
struct ExternalUserIds {
    #[serde(default)]
    external_userid: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Remark {
    pub userid: String,
    pub external_userid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark_company: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remark_mobiles: Vec<String>,
}

#[derive(Serialize)]
struct UnionIdArg<'a> {
    unionid: &'a str,
    openid: &'a str,
}

/// The `ExternalContact` component.
#[derive(Debug, Clone)]
pub struct ExternalContactApi {
    base: BaseClient,
}

impl ExternalContactApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Members allowed to hold customer contacts.
    ///
    /// GET /cgi-bin/externalcontact/get_follow_user_list
    pub async fn get_follow_users(&self) -> Result<Vec<String>, WechatError> {
        let response: FollowUsers = self
            .base
            .http_get("/cgi-bin/externalcontact/get_follow_user_list", &[])
            .await?;
        Ok(response.follow_user)
    }

    /// GET /cgi-bin/externalcontact/list
    pub async fn list(&self, user_id: &str) -> Result<Vec<String>, WechatError> {
        let response: ExternalUserIds = self
            .base
            .http_get("/cgi-bin/externalcontact/list", &[("userid", user_id)])
            .await?;
        Ok(response.external_userid)
    }

    /// GET /cgi-bin/externalcontact/get
    pub async fn get(
        &self,
        external_user_id: &str,
        cursor: Option<&str>,
    ) -> Result<ExternalContactDetail, WechatError> {
        let mut query = vec![("external_userid", external_user_id)];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }
        self.base
            .http_get("/cgi-bin/externalcontact/get", &query)
            .await
    }

    /// POST /cgi-bin/externalcontact/remark
    pub async fn remark(&self, remark: &Remark) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/remark", remark)
            .await
    }

    /// POST /cgi-bin/idconvert/unionid_to_external_userid
    pub async fn union_id_to_external_user_id(
        &self,
        union_id: &str,
        open_id: &str,
    ) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/idconvert/unionid_to_external_userid",
                &UnionIdArg {
                    unionid: union_id,
                    openid: open_id,
                },
            )
            .await
    }
}

impl Component for ExternalContactApi {
    fn name(&self) -> &'static str {
        "ExternalContact"
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactWayResponse {
    #[serde(default)]
    pub config_id: String,
    #[serde(default)]
    pub qr_code: String,
}

#[derive(Serialize)]
struct ConfigIdArg<'a> {
    config_id: &'a str,
}

/// The `ExternalContactContactWay` component: "contact me" buttons and QR
/// codes.
#[derive(Debug, Clone)]
pub struct ContactWayApi {
    base: BaseClient,
}

impl ContactWayApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/externalcontact/add_contact_way
    pub async fn create(&self, way: &Value) -> Result<ContactWayResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/add_contact_way", way)
            .await
    }

    /// POST /cgi-bin/externalcontact/get_contact_way
    pub async fn get(&self, config_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/get_contact_way",
                &ConfigIdArg { config_id },
            )
            .await
    }

    /// POST /cgi-bin/externalcontact/update_contact_way
    pub async fn update(&self, way: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/update_contact_way", way)
            .await
    }

    /// POST /cgi-bin/externalcontact/del_contact_way
    pub async fn delete(&self, config_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/del_contact_way",
                &ConfigIdArg { config_id },
            )
            .await
    }
}

impl Component for ContactWayApi {
    fn name(&self) -> &'static str {
        "ExternalContactContactWay"
    }
}

#[derive(Serialize)]
struct BehaviorQuery<'a> {
    userid: &'a [String],
    start_time: i64,
    end_time: i64,
}

/// The `ExternalContactStatistics` component.
#[derive(Debug, Clone)]
pub struct StatisticsApi {
    base: BaseClient,
}

impl StatisticsApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Contact behaviour per member for `[start_time, end_time]`, Unix
    /// seconds, at most 30 days.
    ///
    /// POST /cgi-bin/externalcontact/get_user_behavior_data
    pub async fn user_behavior(
        &self,
        user_ids: &[String],
        start_time: i64,
        end_time: i64,
    ) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/get_user_behavior_data",
                &BehaviorQuery {
                    userid: user_ids,
                    start_time,
                    end_time,
                },
            )
            .await
    }

    /// POST /cgi-bin/externalcontact/groupchat/statistic
    pub async fn group_chat(&self, query: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/groupchat/statistic", query)
            .await
    }

    /// POST /cgi-bin/externalcontact/groupchat/statistic_group_by_day
    pub async fn group_chat_by_day(&self, query: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/groupchat/statistic_group_by_day",
                query,
            )
            .await
    }
}

impl Component for StatisticsApi {
    fn name(&self) -> &'static str {
        "ExternalContactStatistics"
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MsgTemplateResponse {
    #[serde(default)]
    pub fail_list: Vec<String>,
    #[serde(default)]
    pub msgid: String,
}

#[derive(Serialize)]
struct MsgIdArg<'a> {
    msgid: &'a str,
}

/// The `ExternalContactMessage` component: mass messages to customers.
#[derive(Debug, Clone)]
pub struct ExternalContactMessageApi {
    base: BaseClient,
}

impl ExternalContactMessageApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/externalcontact/add_msg_template
    pub async fn add_msg_template(&self, message: &Value) -> Result<MsgTemplateResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/add_msg_template", message)
            .await
    }

    /// POST /cgi-bin/externalcontact/get_groupmsg_list_v2
    pub async fn list(&self, query: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/get_groupmsg_list_v2", query)
            .await
    }

    /// POST /cgi-bin/externalcontact/get_groupmsg_task
    pub async fn get_task(&self, msg_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/get_groupmsg_task",
                &MsgIdArg { msgid: msg_id },
            )
            .await
    }

    /// POST /cgi-bin/externalcontact/send_welcome_msg
    pub async fn send_welcome(&self, message: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/send_welcome_msg", message)
            .await
    }
}

impl Component for ExternalContactMessageApi {
    fn name(&self) -> &'static str {
        "ExternalContactMessage"
    }
}

/// The `ExternalContactSchool` component: home-school contacts.
#[derive(Debug, Clone)]
pub struct SchoolApi {
    base: BaseClient,
}

impl SchoolApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// GET /cgi-bin/school/user/get
    pub async fn get_user(&self, user_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/school/user/get", &[("userid", user_id)])
            .await
    }

    /// GET /cgi-bin/school/department/list
    pub async fn list_departments(&self, id: Option<i64>) -> Result<ApiResponse, WechatError> {
        let id = id.map(|id| id.to_string());
        let query: Vec<(&str, &str)> = id.iter().map(|id| ("id", id.as_str())).collect();
        self.base
            .http_get("/cgi-bin/school/department/list", &query)
            .await
    }

    /// POST /cgi-bin/school/user/create_student
    pub async fn create_student(&self, student: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/school/user/create_student", student)
            .await
    }
}

impl Component for SchoolApi {
    fn name(&self) -> &'static str {
        "ExternalContactSchool"
    }
}

#[derive(Serialize)]
struct MomentArg<'a> {
    moment_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    cursor: &'a str,
}

/// The `ExternalContactMoment` component: customer-facing moments.
#[derive(Debug, Clone)]
pub struct MomentApi {
    base: BaseClient,
}

impl MomentApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/externalcontact/get_moment_list
    pub async fn list(&self, query: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/get_moment_list", query)
            .await
    }

    /// POST /cgi-bin/externalcontact/get_moment_task
    pub async fn get_task(&self, moment_id: &str, cursor: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/get_moment_task",
                &MomentArg { moment_id, cursor },
            )
            .await
    }

    /// POST /cgi-bin/externalcontact/get_moment_comments
    pub async fn get_comments(&self, query: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/externalcontact/get_moment_comments", query)
            .await
    }
}

impl Component for MomentApi {
    fn name(&self) -> &'static str {
        "ExternalContactMoment"
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TemplateIdResponse {
    #[serde(default)]
    pub template_id: String,
}

#[derive(Serialize)]
struct TemplateIdArg<'a> {
    template_id: &'a str,
}

/// The `ExternalContactMessageTemplate` component: group-chat welcome
/// templates.
#[derive(Debug, Clone)]
pub struct MessageTemplateApi {
    base: BaseClient,
}

impl MessageTemplateApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/externalcontact/group_welcome_template/add
    pub async fn create(&self, template: &Value) -> Result<TemplateIdResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/group_welcome_template/add",
                template,
            )
            .await
    }

    /// POST /cgi-bin/externalcontact/group_welcome_template/get
    pub async fn get(&self, template_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/group_welcome_template/get",
                &TemplateIdArg { template_id },
            )
            .await
    }

    /// POST /cgi-bin/externalcontact/group_welcome_template/del
    pub async fn delete(&self, template_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/externalcontact/group_welcome_template/del",
                &TemplateIdArg { template_id },
            )
            .await
    }
}

impl Component for MessageTemplateApi {
    fn name(&self) -> &'static str {
        "ExternalContactMessageTemplate"
    }
}
