//! Temporary media upload and download.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{media_form, BaseClient, Component, ServiceContainer};

/// Media kinds accepted by `/cgi-bin/media/upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Voice,
    Video,
    File,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Voice => "voice",
            MediaType::Video => "video",
            MediaType::File => "file",
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadedMedia {
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub media_id: String,
    #[serde(default)]
    pub created_at: String,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadedImage {
    #[serde(default)]
    pub url: String,
}

/// The `Media` component.
#[derive(Debug, Clone)]
pub struct MediaApi {
    base: BaseClient,
}

impl MediaApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Upload a temporary media file, valid for three days.
    ///
    /// POST /cgi-bin/media/upload?type=..
    pub async fn upload(
        &self,
        media_type: MediaType,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<UploadedMedia, WechatError> {
        let endpoint = format!("/cgi-bin/media/upload?type={}", media_type.as_str());
        self.base.http_upload(&endpoint, media_form(file_name, content)).await
    }

    /// Upload an image for use inside message content; returns a permanent
    /// URL.
    ///
    /// POST /cgi-bin/media/uploadimg
    pub async fn upload_image(&self, file_name: &str, content: Vec<u8>) -> Result<UploadedImage, WechatError> {
        self.base
            .http_upload("/cgi-bin/media/uploadimg", media_form(file_name, content))
            .await
    }

    /// Raw bytes of a temporary media file.
    ///
    /// GET /cgi-bin/media/get
    pub async fn get(&self, media_id: &str) -> Result<Vec<u8>, WechatError> {
        self.base
            .http_get_bytes("/cgi-bin/media/get", &[("media_id", media_id)])
            .await
    }
}

impl Component for MediaApi {
    fn name(&self) -> &'static str {
        "Media"
    }
}
