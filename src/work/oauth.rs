//! Web OAuth for WeCom members.
//!
//! Builds the `open.weixin.qq.com` authorize URL from `oauth.callback`,
//! `oauth.scopes` and `agent_id`, and resolves the returned `code` to a
//! member identity.

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{BaseClient, Component, ServiceContainer};

const AUTHORIZE_URL: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";
const DEFAULT_SCOPE: &str = "snsapi_base";

/// Identity behind an OAuth `code`.
///
/// Members carry `userid` (and `user_ticket` for `snsapi_privateinfo`);
/// non-members carry `openid` or `external_userid`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub userid: Option<String>,
    #[serde(default)]
    pub user_ticket: Option<String>,
    #[serde(default)]
    pub openid: Option<String>,
    #[serde(default)]
    pub external_userid: Option<String>,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserDetail {
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub qr_code: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub biz_mail: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Serialize)]
struct UserTicket<'a> {
    user_ticket: &'a str,
}

/// The `OAuth` component.
#[derive(Debug, Clone)]
pub struct OAuthApi {
    base: BaseClient,
    corp_id: String,
    agent_id: i64,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl OAuthApi {
    /// # Errors
    /// `WechatError::Config` for a relative `oauth.callback` without an
    /// `auth_callback_host` to resolve it against.
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        let base = BaseClient::new(container)?;
        let config = container.get_config();

        let callback = config.get_str("oauth.callback").unwrap_or_default();
        let host = config.get_str("auth_callback_host").unwrap_or_default();
        let redirect_uri = resolve_callback(host, callback)?;

        let mut scopes = config.get_str_list("oauth.scopes");
        if scopes.is_empty() {
            scopes.push(DEFAULT_SCOPE.to_string());
        }

        Ok(Self {
            base,
            corp_id: config.get_str("corp_id").unwrap_or_default().to_string(),
            agent_id: config.get_i64("agent_id").unwrap_or_default(),
            redirect_uri,
            scopes,
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Authorize URL the member's browser is sent to.
    pub fn authorize_url(&self, state: &str) -> String {
        self.authorize_url_to(&self.redirect_uri, state)
    }

    /// Authorize URL with an explicit redirect target.
    pub fn authorize_url_to(&self, redirect_uri: &str, state: &str) -> String {
        let mut url = format!(
            "{}?appid={}&redirect_uri={}&response_type=code&scope={}",
            AUTHORIZE_URL,
            encode(&self.corp_id),
            encode(redirect_uri),
            encode(&self.scopes.join(","))
        );
        if !state.is_empty() {
            url.push_str("&state=");
            url.push_str(&encode(state));
        }
        if self.agent_id != 0 {
            url.push_str(&format!("&agentid={}", self.agent_id));
        }
        url.push_str("#wechat_redirect");
        url
    }

    /// GET /cgi-bin/auth/getuserinfo
    pub async fn get_user_info(&self, code: &str) -> Result<UserIdentity, WechatError> {
        self.base
            .http_get("/cgi-bin/auth/getuserinfo", &[("code", code)])
            .await
    }

    /// Sensitive profile fields for a `snsapi_privateinfo` ticket.
    ///
    /// POST /cgi-bin/auth/getuserdetail
    pub async fn get_user_detail(&self, user_ticket: &str) -> Result<UserDetail, WechatError> {
        self.base
            .http_post_json("/cgi-bin/auth/getuserdetail", &UserTicket { user_ticket })
            .await
    }
}

impl Component for OAuthApi {
    fn name(&self) -> &'static str {
        "OAuth"
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

fn resolve_callback(host: &str, callback: &str) -> Result<String, WechatError> {
    if callback.is_empty() || callback.starts_with("http://") || callback.starts_with("https://") {
        return Ok(callback.to_string());
    }
    if host.is_empty() {
        return Err(WechatError::Config(format!(
            "oauth.callback {callback} is relative and auth_callback_host is not set"
        )));
    }
    Ok(format!(
        "{}/{}",
        host.trim_end_matches('/'),
        callback.trim_start_matches('/')
    ))
}
