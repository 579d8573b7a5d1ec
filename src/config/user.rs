//! Typed user settings and their projection into a [`ConfigTree`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ConfigTree;

/// Settings supplied by the caller when creating an application.
///
/// `corp_id` carries the corp id for Work and the app id for Mini Program.
///
/// # Example
///
/// ```rust
/// use wechat_sdk::config::UserConfig;
///
/// let config = UserConfig {
///     corp_id: "ww1234567890abcdef".to_string(),
///     agent_id: 1000002,
///     secret: "secret".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.agent_id, 1000002);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub corp_id: String,
    pub agent_id: i64,
    pub secret: String,
    /// Callback token
    pub token: String,
    /// 43-character EncodingAESKey for callback payloads
    pub aes_key: String,
    pub auth_callback_host: String,

    pub response_type: String,
    pub log: LogConfig,
    pub oauth: OAuthConfig,
    pub http: HttpConfig,
    pub http_debug: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub callback: String,
    pub scopes: Vec<String>,
}

/// Transport overrides. Unset fields fall back to application defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub base_uri: Option<String>,
    /// Total request timeout in seconds
    pub timeout: Option<u64>,
    /// Connect timeout in seconds
    pub connect_timeout: Option<u64>,
}

/// Project user settings onto configuration keys.
///
/// Total and deterministic: every field lands on exactly one dotted key and
/// no validation happens here.
pub fn map_user_config(config: &UserConfig) -> ConfigTree {
    let mut tree = ConfigTree::new();

    tree.insert("corp_id", config.corp_id.as_str());
    tree.insert("agent_id", config.agent_id);
    tree.insert("secret", config.secret.as_str());
    tree.insert("token", config.token.as_str());
    tree.insert("aes_key", config.aes_key.as_str());
    tree.insert("auth_callback_host", config.auth_callback_host.as_str());

    tree.insert("response_type", config.response_type.as_str());
    tree.insert("log.level", config.log.level.as_str());
    tree.insert("log.file", config.log.file.as_str());
    tree.insert("oauth.callback", config.oauth.callback.as_str());
    tree.insert("oauth.scopes", Value::from(config.oauth.scopes.clone()));
    tree.insert("http_debug", config.http_debug);
    tree.insert("debug", config.debug);

    if let Some(base_uri) = &config.http.base_uri {
        tree.insert("http.base_uri", base_uri.as_str());
    }
    if let Some(timeout) = config.http.timeout {
        tree.insert("http.timeout", timeout);
    }
    if let Some(connect_timeout) = config.http.connect_timeout {
        tree.insert("http.connect_timeout", connect_timeout);
    }

    tree
}
