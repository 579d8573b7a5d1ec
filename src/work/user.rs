//! Members, batch jobs, linked corps and tags.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Member {
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: Vec<i64>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub main_department: i64,
    #[serde(default)]
    pub open_userid: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserIdResponse {
    #[serde(default)]
    pub userid: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpenIdResponse {
    #[serde(default)]
    pub openid: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeptUser {
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub department: i64,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserIdPage {
    #[serde(default)]
    pub next_cursor: String,
    #[serde(default)]
    pub dept_user: Vec<DeptUser>,
}

#[derive(Serialize)]
struct UserIdArg<'a> {
    userid: &'a str,
}

#[derive(Serialize)]
struct MobileArg<'a> {
    mobile: &'a str,
}

#[derive(Serialize)]
struct Cursor<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    cursor: &'a str,
    limit: u32,
}

/// The `UserClient` component.
#[derive(Debug, Clone)]
pub struct UserApi {
    base: BaseClient,
}

impl UserApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// `member` must carry at least `userid`, `name` and `department`.
    ///
    /// POST /cgi-bin/user/create
    pub async fn create(&self, member: &Value) -> Result<ApiResponse, WechatError> {
        self.base.http_post_json("/cgi-bin/user/create", member).await
    }

    /// GET /cgi-bin/user/get
    pub async fn get(&self, user_id: &str) -> Result<Member, WechatError> {
        self.base
            .http_get("/cgi-bin/user/get", &[("userid", user_id)])
            .await
    }

    /// POST /cgi-bin/user/update
    pub async fn update(&self, member: &Value) -> Result<ApiResponse, WechatError> {
        self.base.http_post_json("/cgi-bin/user/update", member).await
    }

    /// GET /cgi-bin/user/delete
    pub async fn delete(&self, user_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/user/delete", &[("userid", user_id)])
            .await
    }

    /// One page of member ids; pass the previous `next_cursor` to continue.
    ///
    /// POST /cgi-bin/user/list_id
    pub async fn list_id(&self, cursor: &str, limit: u32) -> Result<UserIdPage, WechatError> {
        self.base
            .http_post_json("/cgi-bin/user/list_id", &Cursor { cursor, limit })
            .await
    }

    /// POST /cgi-bin/user/getuserid
    pub async fn get_user_id_by_mobile(&self, mobile: &str) -> Result<UserIdResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/user/getuserid", &MobileArg { mobile })
            .await
    }

    /// POST /cgi-bin/user/convert_to_openid
    pub async fn user_id_to_open_id(&self, user_id: &str) -> Result<OpenIdResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/user/convert_to_openid", &UserIdArg { userid: user_id })
            .await
    }

    /// Mark a member as verified after second-factor login.
    ///
    /// GET /cgi-bin/user/authsucc
    pub async fn accept(&self, user_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/user/authsucc", &[("userid", user_id)])
            .await
    }
}

impl Component for UserApi {
    fn name(&self) -> &'static str {
        "UserClient"
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JobResponse {
    #[serde(default)]
    pub jobid: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JobResult {
    #[serde(default)]
    pub status: i32,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub percentage: i32,
    #[serde(default)]
    pub result: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Invitation {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub party: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<i64>,
}

#[derive(Serialize)]
struct SyncJob<'a> {
    media_id: &'a str,
    to_invite: bool,
}

/// The `UserBatchJobsClient` component.
#[derive(Debug, Clone)]
pub struct UserBatchJobsApi {
    base: BaseClient,
}

impl UserBatchJobsApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/batch/invite
    pub async fn invite(&self, invitation: &Invitation) -> Result<ApiResponse, WechatError> {
        self.base.http_post_json("/cgi-bin/batch/invite", invitation).await
    }

    /// Incremental sync from an uploaded CSV (`media_id`).
    ///
    /// POST /cgi-bin/batch/syncuser
    pub async fn sync_users(&self, media_id: &str, to_invite: bool) -> Result<JobResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/batch/syncuser", &SyncJob { media_id, to_invite })
            .await
    }

    /// POST /cgi-bin/batch/replaceuser
    pub async fn replace_users(&self, media_id: &str, to_invite: bool) -> Result<JobResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/batch/replaceuser", &SyncJob { media_id, to_invite })
            .await
    }

    /// POST /cgi-bin/batch/replaceparty
    pub async fn replace_departments(&self, media_id: &str) -> Result<JobResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/batch/replaceparty",
                &SyncJob {
                    media_id,
                    to_invite: false,
                },
            )
            .await
    }

    /// GET /cgi-bin/batch/getresult
    pub async fn get_result(&self, job_id: &str) -> Result<JobResult, WechatError> {
        self.base
            .http_get("/cgi-bin/batch/getresult", &[("jobid", job_id)])
            .await
    }
}

impl Component for UserBatchJobsApi {
    fn name(&self) -> &'static str {
        "UserBatchJobsClient"
    }
}

#[derive(Serialize)]
struct LinkedDepartment<'a> {
    department_id: &'a str,
}

#[derive(Serialize)]
struct LinkedUserList<'a> {
    department_id: &'a str,
    fetch_child: bool,
}

/// The `UserLinkedCorpClient` component.
///
/// Linked-corp ids take the form `CORPID/USERID` and `LINKEDID/DEPARTMENTID`.
#[derive(Debug, Clone)]
pub struct UserLinkedCorpApi {
    base: BaseClient,
}

impl UserLinkedCorpApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/linkedcorp/agent/get_perm_list
    pub async fn get_perm_list(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/linkedcorp/agent/get_perm_list", &serde_json::json!({}))
            .await
    }

    /// POST /cgi-bin/linkedcorp/user/get
    pub async fn get_user(&self, user_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/linkedcorp/user/get", &UserIdArg { userid: user_id })
            .await
    }

    /// POST /cgi-bin/linkedcorp/user/simplelist
    pub async fn list_users(&self, department_id: &str, fetch_child: bool) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/linkedcorp/user/simplelist",
                &LinkedUserList {
                    department_id,
                    fetch_child,
                },
            )
            .await
    }

    /// POST /cgi-bin/linkedcorp/department/list
    pub async fn list_departments(&self, department_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/linkedcorp/department/list",
                &LinkedDepartment { department_id },
            )
            .await
    }
}

impl Component for UserLinkedCorpApi {
    fn name(&self) -> &'static str {
        "UserLinkedCorpClient"
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Tag {
    #[serde(default)]
    pub tagid: i64,
    #[serde(default)]
    pub tagname: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagMembers {
    #[serde(default)]
    pub tagname: String,
    #[serde(default)]
    pub userlist: Vec<Value>,
    #[serde(default)]
    pub partylist: Vec<i64>,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagMembership {
    #[serde(default)]
    pub invalidlist: String,
    #[serde(default)]
    pub invalidparty: Vec<i64>,
}

#[derive(Deserialize)]
struct TagList {
    #[serde(default)]
    taglist: Vec<Tag>,
}

#[derive(Serialize)]
struct CreateTag<'a> {
    tagname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tagid: Option<i64>,
}

#[derive(Serialize)]
struct TagUsers {
    tagid: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    userlist: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    partylist: Vec<i64>,
}

/// The `UserTagClient` component.
#[derive(Debug, Clone)]
pub struct UserTagApi {
    base: BaseClient,
}

impl UserTagApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/tag/create
    pub async fn create(&self, name: &str, id: Option<i64>) -> Result<Tag, WechatError> {
        self.base
            .http_post_json("/cgi-bin/tag/create", &CreateTag { tagname: name, tagid: id })
            .await
    }

    /// POST /cgi-bin/tag/update
    pub async fn update(&self, id: i64, name: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/tag/update",
                &CreateTag {
                    tagname: name,
                    tagid: Some(id),
                },
            )
            .await
    }

    /// GET /cgi-bin/tag/delete
    pub async fn delete(&self, id: i64) -> Result<ApiResponse, WechatError> {
        let id = id.to_string();
        self.base
            .http_get("/cgi-bin/tag/delete", &[("tagid", id.as_str())])
            .await
    }

    /// GET /cgi-bin/tag/get
    pub async fn get(&self, id: i64) -> Result<TagMembers, WechatError> {
        let id = id.to_string();
        self.base
            .http_get("/cgi-bin/tag/get", &[("tagid", id.as_str())])
            .await
    }

    /// GET /cgi-bin/tag/list
    pub async fn list(&self) -> Result<Vec<Tag>, WechatError> {
        let response: TagList = self.base.http_get("/cgi-bin/tag/list", &[]).await?;
        Ok(response.taglist)
    }

    /// POST /cgi-bin/tag/addtagusers
    pub async fn tag_users(
        &self,
        id: i64,
        users: &[String],
        parties: &[i64],
    ) -> Result<TagMembership, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/tag/addtagusers",
                &TagUsers {
                    tagid: id,
                    userlist: users.to_vec(),
                    partylist: parties.to_vec(),
                },
            )
            .await
    }

    /// POST /cgi-bin/tag/deltagusers
    pub async fn untag_users(
        &self,
        id: i64,
        users: &[String],
        parties: &[i64],
    ) -> Result<TagMembership, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/tag/deltagusers",
                &TagUsers {
                    tagid: id,
                    userlist: users.to_vec(),
                    partylist: parties.to_vec(),
                },
            )
            .await
    }
}

impl Component for UserTagApi {
    fn name(&self) -> &'static str {
        "UserTagClient"
    }
}
