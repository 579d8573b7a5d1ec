//! Per-agent custom menus.

use std::sync::Arc;

use serde_json::Value;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

/// The `Menu` component. Calls target the configured `agent_id`.
#[derive(Debug, Clone)]
pub struct MenuApi {
    base: BaseClient,
    agent_id: String,
}

impl MenuApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        let agent_id = container
            .get_config()
            .get_i64("agent_id")
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            base: BaseClient::new(container)?,
            agent_id,
        })
    }

    /// `menu` is the `{"button": [...]}` document.
    ///
    /// POST /cgi-bin/menu/create?agentid=..
    pub async fn create(&self, menu: &Value) -> Result<ApiResponse, WechatError> {
        let endpoint = format!("/cgi-bin/menu/create?agentid={}", self.agent_id);
        self.base.http_post_json(&endpoint, menu).await
    }

    /// GET /cgi-bin/menu/get
    pub async fn get(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/menu/get", &[("agentid", self.agent_id.as_str())])
            .await
    }

    /// GET /cgi-bin/menu/delete
    pub async fn delete(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_get("/cgi-bin/menu/delete", &[("agentid", self.agent_id.as_str())])
            .await
    }
}

impl Component for MenuApi {
    fn name(&self) -> &'static str {
        "Menu"
    }
}
