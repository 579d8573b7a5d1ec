//! Server IP ranges used by WeCom.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IpListResponse {
    #[serde(default)]
    pub ip_list: Vec<String>,
}

/// The `Base` component.
#[derive(Debug, Clone)]
pub struct BaseApi {
    base: BaseClient,
}

impl BaseApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// IPs WeCom calls back from.
    ///
    /// GET /cgi-bin/getcallbackip
    pub async fn get_callback_ip(&self) -> Result<IpListResponse, WechatError> {
        self.base.http_get("/cgi-bin/getcallbackip", &[]).await
    }

    /// IPs behind the API domain.
    ///
    /// GET /cgi-bin/get_api_domain_ip
    pub async fn get_api_domain_ip(&self) -> Result<IpListResponse, WechatError> {
        self.base.http_get("/cgi-bin/get_api_domain_ip", &[]).await
    }
}

impl Component for BaseApi {
    fn name(&self) -> &'static str {
        "Base"
    }
}
