//! Content security checks
//!
//! - [`SecurityApi::img_sec_check`] - synchronous image check (multipart upload)
//! - [`SecurityApi::media_check_async`] - asynchronous audio/image check, result
//!   pushed to the message endpoint
//! - [`SecurityApi::msg_sec_check`] - text check

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{media_form, ApiResponse, BaseClient, Component, ServiceContainer};

#[derive(Serialize)]
struct MediaCheckRequest<'a> {
    media_url: &'a str,
    media_type: u8,
    version: u8,
    openid: &'a str,
    scene: u8,
}

/// Text to check plus the context it appears in.
///
/// `scene`: 1 profile, 2 comment, 3 forum, 4 social log.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize)]
pub struct MsgSecCheck {
    pub openid: String,
    pub scene: u8,
    pub version: u8,
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nickname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

impl MsgSecCheck {
    pub fn new(openid: impl Into<String>, scene: u8, content: impl Into<String>) -> Self {
        Self {
            openid: openid.into(),
            scene,
            version: 2,
            content: content.into(),
            nickname: String::new(),
            title: String::new(),
            signature: String::new(),
        }
    }

    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MsgSecCheckDetail {
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub errcode: i32,
    /// `pass`, `risky` or `review`.
    #[serde(default)]
    pub suggest: String,
    #[serde(default)]
    pub label: i32,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub prob: i32,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MsgSecCheckResult {
    #[serde(default)]
    pub suggest: String,
    #[serde(default)]
    pub label: i32,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MsgSecCheckResponse {
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub result: MsgSecCheckResult,
    #[serde(default)]
    pub detail: Vec<MsgSecCheckDetail>,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaCheckAsyncResponse {
    #[serde(default)]
    pub trace_id: String,
}

/// The `Security` component.
#[derive(Debug, Clone)]
pub struct SecurityApi {
    base: BaseClient,
}

impl SecurityApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Upload an image (at most 750 x 1334) and check it synchronously.
    /// A violation comes back as `WechatError::Api` with code 87014.
    ///
    /// POST /wxa/img_sec_check
    pub async fn img_sec_check(&self, file_name: &str, content: Vec<u8>) -> Result<ApiResponse, WechatError> {
        self.base
            .http_upload("/wxa/img_sec_check", media_form(file_name, content))
            .await
    }

    /// `media_type`: 1 audio, 2 image.
    ///
    /// POST /wxa/media_check_async
    pub async fn media_check_async(
        &self,
        media_url: &str,
        media_type: u8,
        openid: &str,
        scene: u8,
    ) -> Result<MediaCheckAsyncResponse, WechatError> {
        self.base
            .http_post_json(
                "/wxa/media_check_async",
                &MediaCheckRequest {
                    media_url,
                    media_type,
                    version: 2,
                    openid,
                    scene,
                },
            )
            .await
    }

    /// POST /wxa/msg_sec_check
    pub async fn msg_sec_check(&self, check: &MsgSecCheck) -> Result<MsgSecCheckResponse, WechatError> {
        self.base.http_post_json("/wxa/msg_sec_check", check).await
    }
}

impl Component for SecurityApi {
    fn name(&self) -> &'static str {
        "Security"
    }
}
