//! Updatable ("active") share messages.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ActivityIdResponse {
    #[serde(default)]
    pub activity_id: String,
    #[serde(default)]
    pub expiration_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParameter {
    pub name: String,
    pub value: String,
}

#[derive(Serialize)]
struct TemplateInfo<'a> {
    parameter_list: &'a [TemplateParameter],
}

#[derive(Serialize)]
struct UpdatableMessage<'a> {
    activity_id: &'a str,
    target_state: u8,
    template_info: TemplateInfo<'a>,
}

/// The `ActiveMessage` component.
#[derive(Debug, Clone)]
pub struct ActiveMessageApi {
    base: BaseClient,
}

impl ActiveMessageApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// GET /cgi-bin/message/wxopen/activityid/create
    pub async fn create_activity_id(
        &self,
        union_id: Option<&str>,
        open_id: Option<&str>,
    ) -> Result<ActivityIdResponse, WechatError> {
        let mut query = Vec::new();
        if let Some(union_id) = union_id {
            query.push(("unionid", union_id));
        }
        if let Some(open_id) = open_id {
            query.push(("openid", open_id));
        }
        self.base
            .http_get("/cgi-bin/message/wxopen/activityid/create", &query)
            .await
    }

    /// `target_state`: 0 ongoing, 1 started.
    ///
    /// POST /cgi-bin/message/wxopen/updatablemsg/send
    pub async fn update_message(
        &self,
        activity_id: &str,
        target_state: u8,
        parameters: &[TemplateParameter],
    ) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/message/wxopen/updatablemsg/send",
                &UpdatableMessage {
                    activity_id,
                    target_state,
                    template_info: TemplateInfo {
                        parameter_list: parameters,
                    },
                },
            )
            .await
    }
}

impl Component for ActiveMessageApi {
    fn name(&self) -> &'static str {
        "ActiveMessage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::testing::signed_container;
    use crate::token::TokenEndpoint;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_activity_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/message/wxopen/activityid/create"))
            .and(query_param("openid", "oUser"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "expiration_time": 1000,
                "activity_id": "966_NGiqVmu"
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::MiniProgram).await;
        let api = ActiveMessageApi::new(&container).unwrap();
        let created = api.create_activity_id(None, Some("oUser")).await.unwrap();
        assert_eq!(created.activity_id, "966_NGiqVmu");
    }

    #[tokio::test]
    async fn test_update_message_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/message/wxopen/updatablemsg/send"))
            .and(body_json(json!({
                "activity_id": "a1",
                "target_state": 0,
                "template_info": {
                    "parameter_list": [{"name": "member_count", "value": "2"}]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::MiniProgram).await;
        let api = ActiveMessageApi::new(&container).unwrap();
        let parameters = [TemplateParameter {
            name: "member_count".into(),
            value: "2".into(),
        }];
        api.update_message("a1", 0, &parameters).await.unwrap();
    }
}
