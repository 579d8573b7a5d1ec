//! Uniform service messages: one send call for mini program and official
//! account templates.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

/// Official account template message delivered through the mini program.
#[derive(Debug, Clone, Serialize)]
pub struct MpTemplateMessage {
    pub appid: String,
    pub template_id: String,
    pub url: String,
    pub miniprogram: Value,
    pub data: Value,
}

#[derive(Serialize)]
struct UniformSend<'a> {
    touser: &'a str,
    mp_template_msg: &'a MpTemplateMessage,
}

/// The `UniformMessage` component.
#[derive(Debug, Clone)]
pub struct UniformMessageApi {
    base: BaseClient,
}

impl UniformMessageApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/message/wxopen/template/uniform_send
    pub async fn send(&self, to_user: &str, message: &MpTemplateMessage) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                "/cgi-bin/message/wxopen/template/uniform_send",
                &UniformSend {
                    touser: to_user,
                    mp_template_msg: message,
                },
            )
            .await
    }
}

impl Component for UniformMessageApi {
    fn name(&self) -> &'static str {
        "UniformMessage"
    }
}
