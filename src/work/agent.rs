//! Application (agent) settings and the workbench.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentInfo {
    #[serde(default)]
    pub agentid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub square_logo_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub close: i32,
    #[serde(default)]
    pub redirect_domain: String,
    #[serde(default)]
    pub report_location_flag: i32,
    #[serde(default)]
    pub isreportenter: i32,
    #[serde(default)]
    pub home_url: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentSummary {
    #[serde(default)]
    pub agentid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub square_logo_url: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentListResponse {
    #[serde(default)]
    pub agentlist: Vec<AgentSummary>,
}

/// Fields accepted by `/cgi-bin/agent/set`; unset fields are left as is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_mediaid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_location_flag: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isreportenter: Option<i32>,
}

#[derive(Serialize)]
struct SetAgent<'a> {
    agentid: i64,
    #[serde(flatten)]
    settings: &'a AgentSettings,
}

#[derive(Serialize)]
struct AgentId {
    agentid: i64,
}

/// The `Agent` component.
#[derive(Debug, Clone)]
pub struct AgentApi {
    base: BaseClient,
}

impl AgentApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// GET /cgi-bin/agent/get
    pub async fn get(&self, agent_id: i64) -> Result<AgentInfo, WechatError> {
        let agent_id = agent_id.to_string();
        self.base
            .http_get("/cgi-bin/agent/get", &[("agentid", agent_id.as_str())])
            .await
    }

    /// GET /cgi-bin/agent/list
    pub async fn list(&self) -> Result<AgentListResponse, WechatError> {
        self.base.http_get("/cgi-bin/agent/list", &[]).await
    }

    /// POST /cgi-bin/agent/set
    pub async fn set(&self, agent_id: i64, settings: &AgentSettings) -> Result<ApiResponse, WechatError> {
        let body = SetAgent {
            agentid: agent_id,
            settings,
        };
        self.base.http_post_json("/cgi-bin/agent/set", &body).await
    }
}

impl Component for AgentApi {
    fn name(&self) -> &'static str {
        "Agent"
    }
}

/// The `AgentWorkbench` component: workbench templates and per-member data.
#[derive(Debug, Clone)]
pub struct AgentWorkbenchApi {
    base: BaseClient,
}

impl AgentWorkbenchApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// `template` carries `agentid`, `type` and the type-specific block.
    ///
    /// POST /cgi-bin/agent/set_workbench_template
    pub async fn set_workbench_template(&self, template: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/agent/set_workbench_template", template)
            .await
    }

    /// POST /cgi-bin/agent/get_workbench_template
    pub async fn get_workbench_template(&self, agent_id: i64) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/agent/get_workbench_template",
                &AgentId { agentid: agent_id },
            )
            .await
    }

    /// POST /cgi-bin/agent/set_workbench_data
    pub async fn set_workbench_data(&self, data: &Value) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/agent/set_workbench_data", data)
            .await
    }
}

impl Component for AgentWorkbenchApi {
    fn name(&self) -> &'static str {
        "AgentWorkbench"
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

    #[test]
    fn test_set_agent_body_skips_unset_fields() {
        let settings = AgentSettings {
            name: Some("HR".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(SetAgent {
            agentid: 7,
            settings: &settings,
        })
        .unwrap();
        assert_eq!(body, json!({"agentid": 7, "name": "HR"}));
    }

    #[tokio::test]
    async fn test_get_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/agent/get"))
            .and(query_param("agentid", "1000005"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "agentid": 1000005,
                "name": "HR assistant",
                "close": 0
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::Work).await;
        let agent = AgentApi::new(&container).unwrap().get(1000005).await.unwrap();
        assert_eq!(agent.name, "HR assistant");
    }

    #[tokio::test]
    async fn test_get_workbench_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/agent/get_workbench_template"))
            .and(body_json(json!({"agentid": 1000005})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "type": "image"
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::Work).await;
        let workbench = AgentWorkbenchApi::new(&container).unwrap();
        let response = workbench.get_workbench_template(1000005).await.unwrap();
        assert_eq!(response.get_str("type"), Some("image"));
    }
}
