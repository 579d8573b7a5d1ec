//! Mini Program login and encrypted user data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::WechatClient;
use crate::crypto::{decrypt_user_data, verify_watermark, DecryptedUserData};
use crate::error::WechatError;
use crate::kernel::{Component, ServiceContainer};

/// Response of `code2Session`.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub openid: String,
    #[serde(default)]
    pub session_key: String,
    #[serde(default)]
    pub unionid: Option<String>,
}

/// The `Auth` component.
///
/// `code2Session` authenticates with app id and secret directly, so this
/// component holds the plain transport rather than a signed client.
#[derive(Clone)]
pub struct AuthApi {
    client: WechatClient,
    app_id: String,
    secret: String,
}

impl std::fmt::Debug for AuthApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthApi")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

impl AuthApi {
    /// # Errors
    /// `WechatError::Config` when the app id (`corp_id`) or `secret` is
    /// missing.
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            client: container.client().clone(),
            app_id: container.require_str("corp_id")?.to_string(),
            secret: container.require_str("secret")?.to_string(),
        })
    }

    /// Exchange a `wx.login()` code for the user's session.
    ///
    /// GET /sns/jscode2session
    pub async fn session(&self, js_code: &str) -> Result<SessionResponse, WechatError> {
        let query = [
            ("appid", self.app_id.as_str()),
            ("secret", self.secret.as_str()),
            ("js_code", js_code),
            ("grant_type", "authorization_code"),
        ];
        self.client.get("/sns/jscode2session", &query).await
    }

    /// Decrypt data from `getPhoneNumber`, `getUserInfo` and friends, and
    /// check that its watermark names this app.
    pub fn decrypt_data(
        &self,
        session_key: &str,
        iv: &str,
        encrypted_data: &str,
    ) -> Result<DecryptedUserData, WechatError> {
        let data = decrypt_user_data(session_key, encrypted_data, iv)?;
        verify_watermark(&data, &self.app_id)?;
        Ok(data)
    }
}

impl Component for AuthApi {
    fn name(&self) -> &'static str {
        "Auth"
    }
}
