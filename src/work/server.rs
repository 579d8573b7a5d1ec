//! Callback server support: the `Encryptor` and `Server` components.
//!
//! Callback bodies arrive as `<xml><Encrypt>...</Encrypt>...</xml>` and URL
//! verification as an encrypted `echostr`. Both are opened with the
//! configured `aes_key` and bound to `corp_id`. Message signatures are
//! checked by the host application before the payload reaches this module.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::{DecryptedMessage, MessageCrypt};
use crate::error::WechatError;
use crate::kernel::{Component, ServiceContainer};

/// The `Encryptor` component.
///
/// Never fails to build over `aes_key`: a missing or malformed key is
/// reported by every cipher operation instead.
#[derive(Debug, Clone)]
pub struct Encryptor {
    cipher: Cipher,
    token: String,
}

#[derive(Debug, Clone)]
enum Cipher {
    Missing,
    Invalid(String),
    Ready(MessageCrypt),
}

impl Encryptor {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        let config = container.get_config();
        let receive_id = config.get_str("corp_id").unwrap_or_default();
        let cipher = match config.get_str("aes_key").filter(|key| !key.is_empty()) {
            None => Cipher::Missing,
            Some(key) => match MessageCrypt::new(key, receive_id) {
                Ok(crypt) => Cipher::Ready(crypt),
                Err(e) => {
                    log::warn!("[WeChat] aes_key rejected, callbacks are disabled: {e}");
                    Cipher::Invalid(e.to_string())
                }
            },
        };

        Ok(Self {
            cipher,
            token: config.get_str("token").unwrap_or_default().to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.cipher, Cipher::Ready(_))
    }

    /// Callback token the host uses for signature checks.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<DecryptedMessage, WechatError> {
        self.crypt()?.decrypt(encrypted)
    }

    pub fn encrypt(&self, message: &str) -> Result<String, WechatError> {
        self.crypt()?.encrypt(message)
    }

    fn crypt(&self) -> Result<&MessageCrypt, WechatError> {
        match &self.cipher {
            Cipher::Ready(crypt) => Ok(crypt),
            Cipher::Missing => Err(WechatError::missing("aes_key")),
            Cipher::Invalid(reason) => {
                Err(WechatError::Config(format!("aes_key is invalid: {reason}")))
            }
        }
    }
}

impl Component for Encryptor {
    fn name(&self) -> &'static str {
        "Encryptor"
    }
}

/// The `Server` component: opens callback requests and seals passive
/// replies.
#[derive(Debug, Clone)]
pub struct ServerGuard {
    encryptor: Arc<Encryptor>,
}

impl ServerGuard {
    pub fn new(encryptor: Arc<Encryptor>) -> Self {
        Self { encryptor }
    }

    pub fn encryptor(&self) -> &Arc<Encryptor> {
        &self.encryptor
    }

    /// Plain `echostr` to answer a URL verification request with.
    pub fn verify_url(&self, echo_str: &str) -> Result<String, WechatError> {
        Ok(self.encryptor.decrypt(echo_str)?.message)
    }

    /// Plain XML of an encrypted callback body.
    pub fn decrypt_body(&self, body: &str) -> Result<String, WechatError> {
        let encrypted = extract_element(body, "Encrypt")
            .ok_or_else(|| WechatError::Decode("callback body has no Encrypt element".to_string()))?;
        Ok(self.encryptor.decrypt(encrypted)?.message)
    }

    /// Encrypted reply envelope for a plain reply XML.
    pub fn encrypt_reply(&self, reply: &str, nonce: &str) -> Result<String, WechatError> {
        let encrypted = self.encryptor.encrypt(reply)?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Ok(format!(
            "<xml><Encrypt><![CDATA[{encrypted}]]></Encrypt>\
             <TimeStamp>{timestamp}</TimeStamp>\
             <Nonce><![CDATA[{nonce}]]></Nonce></xml>"
        ))
    }
}

impl Component for ServerGuard {
    fn name(&self) -> &'static str {
        "Server"
    }
}

/// Text of the first `<tag>` element, CDATA unwrapped.
pub fn extract_element<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    let text = xml[start..end].trim();
    Some(
        text.strip_prefix("<![CDATA[")
            .and_then(|inner| inner.strip_suffix("]]>"))
            .unwrap_or(text),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigTree;
    use crate::kernel::testing::{TEST_AES_KEY, TEST_CORP_ID};
    use serde_json::json;

    fn container(aes_key: &str) -> Arc<ServiceContainer> {
        let user: ConfigTree = [
            ("corp_id", json!(TEST_CORP_ID)),
            ("token", json!("callback_token")),
            ("aes_key", json!(aes_key)),
            ("http.base_uri", json!("https://qyapi.weixin.qq.com/")),
        ]
        .into_iter()
        .collect();
        Arc::new(ServiceContainer::new(user, ConfigTree::new()).unwrap())
    }

    #[test]
    fn test_extract_element() {
        let xml = "<xml><ToUserName><![CDATA[ww1]]></ToUserName>\
                   <Encrypt><![CDATA[abc==]]></Encrypt><AgentID>7</AgentID></xml>";
        assert_eq!(extract_element(xml, "Encrypt"), Some("abc=="));
        assert_eq!(extract_element(xml, "AgentID"), Some("7"));
        assert_eq!(extract_element(xml, "Missing"), None);
    }

    #[test]
    fn test_reply_then_decrypt_body() {
        let guard = ServerGuard::new(Arc::new(Encryptor::new(&container(TEST_AES_KEY)).unwrap()));
        let reply = "<xml><MsgType><![CDATA[text]]></MsgType></xml>";

        let envelope = guard.encrypt_reply(reply, "n0nce").unwrap();
        assert!(envelope.contains("<Nonce><![CDATA[n0nce]]></Nonce>"));
        assert_eq!(guard.decrypt_body(&envelope).unwrap(), reply);
    }

    #[test]
    fn test_verify_url() {
        let encryptor = Arc::new(Encryptor::new(&container(TEST_AES_KEY)).unwrap());
        let echo = encryptor.encrypt("1616140317555161061").unwrap();
        let guard = ServerGuard::new(encryptor);
        assert_eq!(guard.verify_url(&echo).unwrap(), "1616140317555161061");
    }

    #[test]
    fn test_without_aes_key() {
        let encryptor = Encryptor::new(&container("")).unwrap();
        assert!(!encryptor.is_configured());
        assert!(matches!(encryptor.encrypt("x"), Err(WechatError::Config(_))));
    }

    #[test]
    fn test_malformed_aes_key_fails_on_use() {
        let encryptor = Encryptor::new(&container("too-short")).unwrap();
        assert!(!encryptor.is_configured());

        match encryptor.decrypt("anything") {
            Err(WechatError::Config(message)) => assert!(message.contains("aes_key")),
            other => panic!("expected a config error, got {other:?}"),
        }
        assert!(matches!(encryptor.encrypt("x"), Err(WechatError::Config(_))));
    }

    #[test]
    fn test_body_without_encrypt() {
        let guard = ServerGuard::new(Arc::new(Encryptor::new(&container(TEST_AES_KEY)).unwrap()));
        assert!(matches!(
            guard.decrypt_body("<xml></xml>"),
            Err(WechatError::Decode(_))
        ));
    }
}
