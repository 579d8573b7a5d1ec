use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::WechatError;
use crate::kernel::{BaseClient, Component, ServiceContainer};

#[derive(Debug, Clone, Default, Serialize)]
pub struct JumpWxa {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    /// `release`, `trial` or `develop`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_version: Option<String>,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jump_wxa: Option<JumpWxa>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expire: Option<bool>,
    /// 0 by timestamp, 1 by interval in days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_interval: Option<i64>,
}

impl SchemeOptions {
    pub fn jump_to(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            jump_wxa: Some(JumpWxa {
                path: path.into(),
                query: query.into(),
                env_version: None,
            }),
            ..Self::default()
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemeResponse {
    #[serde(default)]
    pub openlink: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemeInfo {
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub expire_time: i64,
    #[serde(default)]
    pub env_version: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemeQueryResponse {
    #[serde(default)]
    pub scheme_info: SchemeInfo,
}

/// The `URLScheme` component.
#[derive(Debug, Clone)]
pub struct UrlSchemeApi {
    base: BaseClient,
}

impl UrlSchemeApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /wxa/generatescheme
    pub async fn generate(&self, options: &SchemeOptions) -> Result<SchemeResponse, WechatError> {
        self.base.http_post_json("/wxa/generatescheme", options).await
    }

    /// POST /wxa/queryscheme
    pub async fn query(&self, scheme: &str) -> Result<SchemeQueryResponse, WechatError> {
        self.base
            .http_post_json("/wxa/queryscheme", &json!({"scheme": scheme}))
            .await
    }
}

impl Component for UrlSchemeApi {
    fn name(&self) -> &'static str {
        "URLScheme"
    }
}
