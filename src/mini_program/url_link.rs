use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UrlLinkOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expire: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_interval: Option<i64>,
}

impl UrlLinkOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Expire after `days` days.
    pub fn expire_in_days(mut self, days: i64) -> Self {
        self.is_expire = Some(true);
        self.expire_type = Some(1);
        self.expire_interval = Some(days);
        self
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UrlLinkResponse {
    #[serde(default)]
    pub url_link: String,
}

/// The `URLLink` component.
#[derive(Debug, Clone)]
pub struct UrlLinkApi {
    base: BaseClient,
}

impl UrlLinkApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /wxa/generate_urllink
    pub async fn generate(&self, options: &UrlLinkOptions) -> Result<UrlLinkResponse, WechatError> {
        self.base
            .http_post_json("/wxa/generate_urllink", options)
            .await
    }
}

impl Component for UrlLinkApi {
    fn name(&self) -> &'static str {
        "URLLink"
    }
}
