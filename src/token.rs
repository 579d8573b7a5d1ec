//! Shared `access_token` cache behind the `AccessToken` component.
//!
//! Readers take a shared lock on the cache. A refresh holds a separate
//! mutex for the whole fetch and re-checks the cache once it owns it, so at
//! most one refresh is in flight and concurrent callers observe either the
//! previous token or the new one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::client::WechatClient;
use crate::error::WechatError;
use crate::kernel::{Component, ServiceContainer};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 100;
const DEFAULT_REFRESH_BUFFER_SECS: u64 = 5 * 60;

/// Which token endpoint an application authenticates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEndpoint {
    /// `GET /cgi-bin/gettoken?corpid=..&corpsecret=..`
    Work,
    /// `GET /cgi-bin/token?grant_type=client_credential&appid=..&secret=..`
    MiniProgram,
}

impl TokenEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            TokenEndpoint::Work => "/cgi-bin/gettoken",
            TokenEndpoint::MiniProgram => "/cgi-bin/token",
        }
    }

    fn query<'a>(self, id: &'a str, secret: &'a str) -> Vec<(&'static str, &'a str)> {
        match self {
            TokenEndpoint::Work => vec![("corpid", id), ("corpsecret", secret)],
            TokenEndpoint::MiniProgram => vec![
                ("grant_type", "client_credential"),
                ("appid", id),
                ("secret", secret),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: Instant,
    /// Validity granted when the token was issued.
    pub lifetime: Duration,
}

impl CachedToken {
    pub fn new(token: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            token: token.into(),
            expires_at: Instant::now() + expires_in,
            lifetime: expires_in,
        }
    }

    /// True once less than `buffer` remains. The buffer never exceeds half
    /// the lifetime, so a short-lived token is still served for a while.
    pub fn is_expired(&self, buffer: Duration) -> bool {
        let buffer = buffer.min(self.lifetime / 2);
        Instant::now() + buffer >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// Fetches, caches and refreshes one application's `access_token`.
///
/// Registered on every application as the `AccessToken` component; the
/// container hands the same instance to each component that signs requests.
pub struct TokenManager {
    client: WechatClient,
    endpoint: TokenEndpoint,
    id: String,
    secret: String,
    pub(crate) cache: RwLock<Option<CachedToken>>,
    refresh_lock: Mutex<()>,
    pub(crate) refresh_buffer: Duration,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("endpoint", &self.endpoint)
            .field("id", &self.id)
            .field("refresh_buffer", &self.refresh_buffer)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(
        client: WechatClient,
        endpoint: TokenEndpoint,
        id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint,
            id: id.into(),
            secret: secret.into(),
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refresh_buffer: Duration::from_secs(DEFAULT_REFRESH_BUFFER_SECS),
        }
    }

    /// Build the manager from container configuration and install it as the
    /// container's credential handle.
    ///
    /// # Errors
    /// `WechatError::Config` when `corp_id` or `secret` is missing or empty,
    /// or when a credential handle is already installed.
    pub fn register(
        container: &Arc<ServiceContainer>,
        endpoint: TokenEndpoint,
    ) -> Result<Arc<Self>, WechatError> {
        let id = container.require_str("corp_id")?;
        let secret = container.require_str("secret")?;

        let manager = Arc::new(Self::new(container.client().clone(), endpoint, id, secret));
        container.install_access_token(Arc::clone(&manager))?;
        Ok(manager)
    }

    pub fn endpoint(&self) -> TokenEndpoint {
        self.endpoint
    }

    pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.refresh_buffer = buffer;
        self
    }

    /// Current valid token, refreshing it first when missing or expiring.
    pub async fn get_token(&self) -> Result<String, WechatError> {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _refresh = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        self.refresh_locked().await
    }

    /// Fetch a new token regardless of the cached one.
    pub async fn refresh(&self) -> Result<String, WechatError> {
        let _refresh = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Seed the cache with an externally obtained token.
    pub async fn set_token(&self, token: impl Into<String>, expires_in: Duration) {
        *self.cache.write().await = Some(CachedToken::new(token, expires_in));
    }

    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    async fn cached(&self) -> Option<String> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|cached| !cached.is_expired(self.refresh_buffer))
            .map(|cached| cached.token.clone())
    }

    async fn refresh_locked(&self) -> Result<String, WechatError> {
        let response = self.fetch_token_with_retry().await?;

        if response.access_token.is_empty() {
            return Err(WechatError::Token(
                "token endpoint returned an empty access_token".to_string(),
            ));
        }

        log::info!(
            "[WeChat] access token refreshed via {}, expires in {}s",
            self.endpoint.path(),
            response.expires_in
        );

        if Duration::from_secs(response.expires_in) <= self.refresh_buffer {
            log::warn!(
                "[WeChat] access token lifetime {}s is within the refresh buffer",
                response.expires_in
            );
        }

        let cached = CachedToken::new(
            response.access_token,
            Duration::from_secs(response.expires_in),
        );
        let token = cached.token.clone();
        *self.cache.write().await = Some(cached);
        Ok(token)
    }

    async fn fetch_token_with_retry(&self) -> Result<TokenResponse, WechatError> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match self.fetch_token().await {
                Ok(response) => return Ok(response),
                Err(WechatError::Http(e)) => {
                    log::warn!(
                        "[WeChat] token request failed (attempt {}): {}",
                        attempt + 1,
                        e
                    );
                    last_error = Some(WechatError::Http(e));
                    if attempt < MAX_RETRIES - 1 {
                        tokio::time::sleep(Duration::from_millis(
                            RETRY_DELAY_MS * (attempt + 1) as u64,
                        ))
                        .await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| WechatError::Token("Unknown error".to_string())))
    }

    async fn fetch_token(&self) -> Result<TokenResponse, WechatError> {
        let query = self.endpoint.query(&self.id, &self.secret);
        self.client.get(self.endpoint.path(), &query).await
    }
}

impl Component for TokenManager {
    fn name(&self) -> &'static str {
        "AccessToken"
    }
}
