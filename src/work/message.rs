//! Application messages.
//!
//! [`MessageApi`] is the raw `/cgi-bin/message/*` client; [`Messager`]
//! assembles a send request fluently:
//!
//! ```rust,ignore
//! work.messager
//!     .message(MessageContent::text("Build finished"))
//!     .to_users(["zhangsan", "lisi"])
//!     .send()
//!     .await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextCard {
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btntxt: Option<String>,
}

/// Message body, one variant per `msgtype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Markdown(String),
    Image { media_id: String },
    File { media_id: String },
    TextCard(TextCard),
}

impl MessageContent {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self::Markdown(content.into())
    }

    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Markdown(_) => "markdown",
            Self::Image { .. } => "image",
            Self::File { .. } => "file",
            Self::TextCard(_) => "textcard",
        }
    }

    fn payload(&self) -> Value {
        match self {
            Self::Text(content) | Self::Markdown(content) => json!({ "content": content }),
            Self::Image { media_id } | Self::File { media_id } => json!({ "media_id": media_id }),
            Self::TextCard(card) => json!(card),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(content: &str) -> Self {
        Self::text(content)
    }
}

impl From<String> for MessageContent {
    fn from(content: String) -> Self {
        Self::Text(content)
    }
}

/// A complete `/cgi-bin/message/send` request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub to_user: Vec<String>,
    pub to_party: Vec<String>,
    pub to_tag: Vec<String>,
    pub agent_id: i64,
    pub content: MessageContent,
    pub safe: bool,
    pub enable_duplicate_check: bool,
    pub duplicate_check_interval: Option<u32>,
}

impl OutgoingMessage {
    pub fn new(agent_id: i64, content: MessageContent) -> Self {
        Self {
            to_user: Vec::new(),
            to_party: Vec::new(),
            to_tag: Vec::new(),
            agent_id,
            content,
            safe: false,
            enable_duplicate_check: false,
            duplicate_check_interval: None,
        }
    }

    pub fn has_recipients(&self) -> bool {
        !(self.to_user.is_empty() && self.to_party.is_empty() && self.to_tag.is_empty())
    }

    /// Wire body. Recipient lists are `|`-joined.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        for (key, list) in [
            ("touser", &self.to_user),
            ("toparty", &self.to_party),
            ("totag", &self.to_tag),
        ] {
            if !list.is_empty() {
                body.insert(key.to_string(), Value::from(list.join("|")));
            }
        }
        let msg_type = self.content.msg_type();
        body.insert("msgtype".to_string(), Value::from(msg_type));
        body.insert("agentid".to_string(), Value::from(self.agent_id));
        body.insert(msg_type.to_string(), self.content.payload());
        if self.safe {
            body.insert("safe".to_string(), Value::from(1));
        }
        if self.enable_duplicate_check {
            body.insert("enable_duplicate_check".to_string(), Value::from(1));
            if let Some(interval) = self.duplicate_check_interval {
                body.insert("duplicate_check_interval".to_string(), Value::from(interval));
            }
        }
        Value::Object(body)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub invaliduser: String,
    #[serde(default)]
    pub invalidparty: String,
    #[serde(default)]
    pub invalidtag: String,
    #[serde(default)]
    pub unlicenseduser: String,
    #[serde(default)]
    pub msgid: String,
    #[serde(default)]
    pub response_code: String,
}

#[derive(Serialize)]
struct Recall<'a> {
    msgid: &'a str,
}

/// The `Message` component.
#[derive(Debug, Clone)]
pub struct MessageApi {
    base: BaseClient,
}

impl MessageApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// POST /cgi-bin/message/send
    ///
    /// # Errors
    /// `WechatError::Config` when the message names no recipient.
    pub async fn send(&self, message: &OutgoingMessage) -> Result<SendMessageResponse, WechatError> {
        if !message.has_recipients() {
            return Err(WechatError::Config(
                "message needs at least one of touser, toparty, totag".to_string(),
            ));
        }
        self.base
            .http_post_json("/cgi-bin/message/send", &message.to_body())
            .await
    }

    /// Withdraw a message sent within the last 24 hours.
    ///
    /// POST /cgi-bin/message/recall
    pub async fn recall(&self, msg_id: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json("/cgi-bin/message/recall", &Recall { msgid: msg_id })
            .await
    }
}

impl Component for MessageApi {
    fn name(&self) -> &'static str {
        "Message"
    }
}

/// The `Messager` component: fluent front end over [`MessageApi`] that
/// defaults the agent to the configured `agent_id`.
#[derive(Debug, Clone)]
pub struct Messager {
    api: Arc<MessageApi>,
    agent_id: i64,
}

impl Messager {
    pub fn new(api: Arc<MessageApi>, container: &Arc<ServiceContainer>) -> Self {
        Self {
            api,
            agent_id: container.get_config().get_i64("agent_id").unwrap_or_default(),
        }
    }

    pub fn message(&self, content: impl Into<MessageContent>) -> PendingMessage<'_> {
        PendingMessage {
            api: &self.api,
            message: OutgoingMessage::new(self.agent_id, content.into()),
        }
    }
}

impl Component for Messager {
    fn name(&self) -> &'static str {
        "Messager"
    }
}

/// A message being addressed; consumed by [`send`](Self::send).
#[derive(Debug)]
pub struct PendingMessage<'a> {
    api: &'a MessageApi,
    message: OutgoingMessage,
}

impl PendingMessage<'_> {
    pub fn to_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.to_user.extend(users.into_iter().map(Into::into));
        self
    }

    /// Every member visible to the agent.
    pub fn to_all(mut self) -> Self {
        self.message.to_user = vec!["@all".to_string()];
        self
    }

    pub fn to_parties<I, S>(mut self, parties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.to_party.extend(parties.into_iter().map(Into::into));
        self
    }

    pub fn to_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.to_tag.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn of_agent(mut self, agent_id: i64) -> Self {
        self.message.agent_id = agent_id;
        self
    }

    pub fn safe(mut self) -> Self {
        self.message.safe = true;
        self
    }

    pub fn duplicate_check(mut self, interval_secs: u32) -> Self {
        self.message.enable_duplicate_check = true;
        self.message.duplicate_check_interval = Some(interval_secs);
        self
    }

    pub fn build(self) -> OutgoingMessage {
        self.message
    }

    pub async fn send(self) -> Result<SendMessageResponse, WechatError> {
        self.api.send(&self.message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::testing::signed_container;
    use crate::token::TokenEndpoint;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_body_layout() {
        let mut message = OutgoingMessage::new(1000002, MessageContent::text("hi"));
        message.to_user = vec!["a".into(), "b".into()];
        message.to_tag = vec!["7".into()];

        assert_eq!(
            message.to_body(),
            json!({
                "touser": "a|b",
                "totag": "7",
                "msgtype": "text",
                "agentid": 1000002,
                "text": {"content": "hi"}
            })
        );
    }

    #[test]
    fn test_text_card_payload() {
        let content = MessageContent::TextCard(TextCard {
            title: "Leave approved".into(),
            description: "See details".into(),
            url: "https://example.com".into(),
            btntxt: None,
        });
        let body = OutgoingMessage::new(1, content).to_body();
        assert_eq!(body["msgtype"], "textcard");
        assert_eq!(body["textcard"]["title"], "Leave approved");
        assert!(body["textcard"].get("btntxt").is_none());
    }

    #[tokio::test]
    async fn test_messager_sends_with_configured_agent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/message/send"))
            .and(body_json(json!({
                "touser": "zhangsan",
                "toparty": "2",
                "msgtype": "markdown",
                "agentid": 1000002,
                "markdown": {"content": "**done**"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "invaliduser": "",
                "msgid": "MSGID"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::Work).await;
        let api = Arc::new(MessageApi::new(&container).unwrap());
        let messager = Messager::new(api, &container);

        let response = messager
            .message(MessageContent::markdown("**done**"))
            .to_users(["zhangsan"])
            .to_parties(["2"])
            .send()
            .await
            .unwrap();
        assert_eq!(response.msgid, "MSGID");
    }

    #[tokio::test]
    async fn test_send_without_recipients_fails() {
        let server = MockServer::start().await;
        let container = signed_container(&server, TokenEndpoint::Work).await;
        let api = Arc::new(MessageApi::new(&container).unwrap());
        let messager = Messager::new(api, &container);

        let result = messager.message("hello").send().await;
        assert!(matches!(result, Err(WechatError::Config(_))));
    }
}
