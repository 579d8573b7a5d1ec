//! The `Config` component: typed read access to the effective configuration.

use std::sync::Arc;

use log::LevelFilter;
use serde_json::Value;

use super::{Component, ServiceContainer};
use crate::config::ConfigTree;
use crate::error::WechatError;

#[derive(Debug, Clone)]
pub struct Config {
    container: Arc<ServiceContainer>,
}

impl Config {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            container: Arc::clone(container),
        })
    }

    pub fn tree(&self) -> &ConfigTree {
        self.container.get_config()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.tree().get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.tree().get_str(key)
    }

    fn str_or_empty(&self, key: &str) -> &str {
        self.get_str(key).unwrap_or_default()
    }

    pub fn corp_id(&self) -> &str {
        self.str_or_empty("corp_id")
    }

    pub fn agent_id(&self) -> i64 {
        self.tree().get_i64("agent_id").unwrap_or_default()
    }

    pub fn secret(&self) -> &str {
        self.str_or_empty("secret")
    }

    pub fn token(&self) -> &str {
        self.str_or_empty("token")
    }

    pub fn aes_key(&self) -> &str {
        self.str_or_empty("aes_key")
    }

    pub fn auth_callback_host(&self) -> &str {
        self.str_or_empty("auth_callback_host")
    }

    pub fn response_type(&self) -> &str {
        self.str_or_empty("response_type")
    }

    pub fn base_uri(&self) -> &str {
        self.str_or_empty("http.base_uri")
    }

    /// `log.level` as a filter for the host's logger; `Info` when unset or
    /// unrecognised.
    pub fn log_level(&self) -> LevelFilter {
        self.get_str("log.level")
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    }

    pub fn log_file(&self) -> &str {
        self.str_or_empty("log.file")
    }

    pub fn oauth_callback(&self) -> &str {
        self.str_or_empty("oauth.callback")
    }

    pub fn oauth_scopes(&self) -> Vec<String> {
        self.tree().get_str_list("oauth.scopes")
    }

    pub fn http_debug(&self) -> bool {
        self.tree().get_bool("http_debug").unwrap_or(false)
    }

    pub fn debug(&self) -> bool {
        self.tree().get_bool("debug").unwrap_or(false)
    }
}

impl Component for Config {
    fn name(&self) -> &'static str {
        "Config"
    }
}
