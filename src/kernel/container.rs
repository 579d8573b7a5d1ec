//! Service container
//!
//! One container per application. It owns the effective configuration, the
//! shared transport and the credential handle; every component keeps an
//! `Arc` to it.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::client::WechatClient;
use crate::config::ConfigTree;
use crate::error::WechatError;
use crate::middleware::LoggingMiddleware;
use crate::token::TokenManager;

pub struct ServiceContainer {
    user_config: ConfigTree,
    default_config: ConfigTree,
    effective_config: OnceLock<ConfigTree>,
    client: WechatClient,
    access_token: OnceLock<Arc<TokenManager>>,
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("client", &self.client)
            .field("access_token", &self.access_token.get().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl ServiceContainer {
    /// Merge `user_config` over `default_config` and build the transport
    /// from the result.
    ///
    /// # Errors
    /// `WechatError::Config` when the effective `http.base_uri` is missing
    /// or malformed.
    pub fn new(user_config: ConfigTree, default_config: ConfigTree) -> Result<Self, WechatError> {
        let effective_config = OnceLock::new();
        let config =
            effective_config.get_or_init(|| Self::configure(&user_config, &default_config));
        let client = build_client(config)?;

        Ok(Self {
            user_config,
            default_config,
            effective_config,
            client,
            access_token: OnceLock::new(),
        })
    }

    /// User values win over defaults on key conflict; nested maps merge.
    pub fn configure(user_config: &ConfigTree, default_config: &ConfigTree) -> ConfigTree {
        ConfigTree::merged(default_config, user_config)
    }

    /// The effective configuration. Computed once, then served as is.
    pub fn get_config(&self) -> &ConfigTree {
        self.effective_config
            .get_or_init(|| Self::configure(&self.user_config, &self.default_config))
    }

    pub fn user_config(&self) -> &ConfigTree {
        &self.user_config
    }

    pub fn default_config(&self) -> &ConfigTree {
        &self.default_config
    }

    pub fn client(&self) -> &WechatClient {
        &self.client
    }

    /// Non-empty string at `key`, or a configuration error naming it.
    pub fn require_str(&self, key: &str) -> Result<&str, WechatError> {
        self.get_config()
            .get_str(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| WechatError::missing(key))
    }

    /// The credential handle installed by the `AccessToken` component.
    ///
    /// # Errors
    /// `WechatError::Config` when nothing has been installed yet.
    pub fn access_token(&self) -> Result<Arc<TokenManager>, WechatError> {
        self.access_token.get().cloned().ok_or_else(|| {
            WechatError::Config(
                "AccessToken must be registered before components that sign requests".to_string(),
            )
        })
    }

    pub(crate) fn install_access_token(&self, manager: Arc<TokenManager>) -> Result<(), WechatError> {
        self.access_token
            .set(manager)
            .map_err(|_| WechatError::Config("AccessToken is already registered".to_string()))
    }
}

fn build_client(config: &ConfigTree) -> Result<WechatClient, WechatError> {
    let mut builder = WechatClient::builder();

    if let Some(base_uri) = config.get_str("http.base_uri") {
        builder = builder.base_url(base_uri);
    }
    if let Some(timeout) = config.get_i64("http.timeout").and_then(positive_secs) {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = config.get_i64("http.connect_timeout").and_then(positive_secs) {
        builder = builder.connect_timeout(timeout);
    }

    let client = builder.build()?;

    if config.get_bool("http_debug").unwrap_or(false) {
        let mut logging = LoggingMiddleware::new();
        if config.get_bool("debug").unwrap_or(false) {
            logging = logging.verbose();
        }
        return Ok(client.layered(logging));
    }

    Ok(client)
}

fn positive_secs(secs: i64) -> Option<Duration> {
    u64::try_from(secs)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
