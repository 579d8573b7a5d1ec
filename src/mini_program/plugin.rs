//! Plugin management, from both sides: the host app that uses plugins and
//! the developer app that publishes one.

use std::sync::Arc;

use serde_json::json;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

/// The `Plugin` component.
#[derive(Debug, Clone)]
pub struct PluginApi {
    base: BaseClient,
}

impl PluginApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Ask a plugin developer for permission to use their plugin.
    pub async fn apply(&self, plugin_app_id: &str, reason: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/wxa/plugin",
                &json!({"action": "apply", "plugin_appid": plugin_app_id, "reason": reason}),
            )
            .await
    }

    /// Plugins added to this app.
    pub async fn list(&self) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/wxa/plugin", &json!({"action": "list"}))
            .await
    }

    pub async fn unbind(&self, plugin_app_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/wxa/plugin",
                &json!({"action": "unbind", "plugin_appid": plugin_app_id}),
            )
            .await
    }

    /// Pending and past applications to use *our* plugin.
    pub async fn dev_apply_list(&self, page: u32, num: u32) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/wxa/devplugin",
                &json!({"action": "dev_apply_list", "page": page, "num": num}),
            )
            .await
    }

    /// `action` is `dev_agree`, `dev_refuse` or `dev_delete`.
    pub async fn dev_agree(&self, action: &str, app_id: &str, reason: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/wxa/devplugin",
                &json!({"action": action, "appid": app_id, "reason": reason}),
            )
            .await
    }
}

impl Component for PluginApi {
    fn name(&self) -> &'static str {
        "Plugin"
    }
}
