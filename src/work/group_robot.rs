//! Group chat robots.
//!
//! Robots are addressed by their webhook `key` and never sign requests with
//! the access token.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::client::WechatClient;
use crate::error::WechatError;
use crate::kernel::{ApiResponse, Component, ServiceContainer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picurl: Option<String>,
}

/// Robot message body, one variant per `msgtype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotMessage {
    Text {
        content: String,
        mentioned_list: Vec<String>,
        mentioned_mobile_list: Vec<String>,
    },
    Markdown(String),
    News(Vec<NewsArticle>),
    File { media_id: String },
}

impl RobotMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            mentioned_list: Vec::new(),
            mentioned_mobile_list: Vec::new(),
        }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self::Markdown(content.into())
    }

    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Markdown(_) => "markdown",
            Self::News(_) => "news",
            Self::File { .. } => "file",
        }
    }

    pub fn to_body(&self) -> Value {
        let payload = match self {
            Self::Text {
                content,
                mentioned_list,
                mentioned_mobile_list,
            } => {
                let mut text = json!({ "content": content });
                if !mentioned_list.is_empty() {
                    text["mentioned_list"] = json!(mentioned_list);
                }
                if !mentioned_mobile_list.is_empty() {
                    text["mentioned_mobile_list"] = json!(mentioned_mobile_list);
                }
                text
            }
            Self::Markdown(content) => json!({ "content": content }),
            Self::News(articles) => json!({ "articles": articles }),
            Self::File { media_id } => json!({ "media_id": media_id }),
        };
        let msg_type = self.msg_type();
        json!({ "msgtype": msg_type, msg_type: payload })
    }
}

/// The `GroupRobot` component.
#[derive(Debug, Clone)]
pub struct GroupRobotApi {
    client: WechatClient,
}

impl GroupRobotApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            client: container.client().clone(),
        })
    }

    /// POST /cgi-bin/webhook/send?key=..
    pub async fn send(&self, key: &str, message: &RobotMessage) -> Result<ApiResponse, WechatError> {
        if key.is_empty() {
            return Err(WechatError::missing("webhook key"));
        }
        let endpoint = format!(
            "/cgi-bin/webhook/send?key={}",
            percent_encoding::utf8_percent_encode(key, percent_encoding::NON_ALPHANUMERIC)
        );
        self.client.post(&endpoint, &message.to_body()).await
    }
}

impl Component for GroupRobotApi {
    fn name(&self) -> &'static str {
        "GroupRobot"
    }
}

/// The `GroupRobotMessenger` component: fluent front end over
/// [`GroupRobotApi`].
#[derive(Debug, Clone)]
pub struct GroupRobotMessenger {
    api: Arc<GroupRobotApi>,
}

impl GroupRobotMessenger {
    pub fn new(api: Arc<GroupRobotApi>) -> Self {
        Self { api }
    }

    pub fn message(&self, message: RobotMessage) -> PendingRobotMessage<'_> {
        PendingRobotMessage {
            api: &self.api,
            key: String::new(),
            message,
        }
    }
}

impl Component for GroupRobotMessenger {
    fn name(&self) -> &'static str {
        "GroupRobotMessenger"
    }
}

#[derive(Debug)]
pub struct PendingRobotMessage<'a> {
    api: &'a GroupRobotApi,
    key: String,
    message: RobotMessage,
}

impl PendingRobotMessage<'_> {
    pub fn to_group(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Mention members by userid (`@all` for everyone). Text messages only.
    pub fn mention<I, S>(mut self, user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let RobotMessage::Text { mentioned_list, .. } = &mut self.message {
            mentioned_list.extend(user_ids.into_iter().map(Into::into));
        }
        self
    }

    pub fn mention_mobiles<I, S>(mut self, mobiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let RobotMessage::Text {
            mentioned_mobile_list,
            ..
        } = &mut self.message
        {
            mentioned_mobile_list.extend(mobiles.into_iter().map(Into::into));
        }
        self
    }

    pub async fn send(self) -> Result<ApiResponse, WechatError> {
        self.api.send(&self.key, &self.message).await
    }
}
