use std::sync::Arc;

use serde::Serialize;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[derive(Serialize)]
pub(crate) struct ImageUrl<'a> {
    pub(crate) img_url: &'a str,
}

/// The `Image` component: smart crop, QR code scan, super resolution.
#[derive(Debug, Clone)]
pub struct ImageApi {
    base: BaseClient,
}

impl ImageApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cv/img/aicrop
    pub async fn ai_crop(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cv/img/aicrop", &ImageUrl { img_url })
            .await
    }

    /// POST /cv/img/qrcode
    pub async fn scan_qr_code(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cv/img/qrcode", &ImageUrl { img_url })
            .await
    }

    /// POST /cv/img/superresolution
    pub async fn super_resolution(&self, img_url: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cv/img/superresolution", &ImageUrl { img_url })
            .await
    }
}

impl Component for ImageApi {
    fn name(&self) -> &'static str {
        "Image"
    }
}
