//! Mini program codes and QR codes. Success bodies are images, failures
//! are JSON and surface as `WechatError::Api`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{BaseClient, Component, ServiceContainer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Options for `/wxa/getwxacode` (limited quota, arbitrary path).
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize)]
pub struct CodeOptions {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<LineColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hyaline: Option<bool>,
}

impl CodeOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }
}

/// Options for `/wxa/getwxacodeunlimit` (unlimited quota, 32 char scene).
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnlimitedCodeOptions {
    pub scene: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<LineColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hyaline: Option<bool>,
}

impl UnlimitedCodeOptions {
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            ..Self::default()
        }
    }

    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }
}

#[derive(Serialize)]
struct QrCodeRequest<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
}

/// The `WXACode` component.
#[derive(Debug, Clone)]
pub struct WxaCodeApi {
    base: BaseClient,
}

impl WxaCodeApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /wxa/getwxacode
    pub async fn get(&self, options: &CodeOptions) -> Result<Vec<u8>, WechatError> {
        self.base.http_post_bytes("/wxa/getwxacode", options).await
    }

    /// POST /wxa/getwxacodeunlimit
    pub async fn get_unlimited(&self, options: &UnlimitedCodeOptions) -> Result<Vec<u8>, WechatError> {
        self.base
            .http_post_bytes("/wxa/getwxacodeunlimit", options)
            .await
    }

    /// Classic square QR code.
    ///
    /// POST /cgi-bin/wxaapp/createwxaqrcode
    pub async fn get_qr_code(&self, path: &str, width: Option<u32>) -> Result<Vec<u8>, WechatError> {
        self.base
            .http_post_bytes(
                "/cgi-bin/wxaapp/createwxaqrcode",
                &QrCodeRequest { path, width },
            )
            .await
    }
}

impl Component for WxaCodeApi {
    fn name(&self) -> &'static str {
        "WXACode"
    }
}
