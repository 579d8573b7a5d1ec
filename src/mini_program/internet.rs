use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WechatError;
use crate::kernel::{BaseClient, Component, ServiceContainer};

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserEncryptKey {
    #[serde(default)]
    pub encrypt_key: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub expire_in: i64,
    #[serde(default)]
    pub iv: String,
    #[serde(default)]
    pub create_time: i64,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserEncryptKeyResponse {
    #[serde(default)]
    pub key_info_list: Vec<UserEncryptKey>,
}

#[derive(Serialize)]
struct EncryptKeyRequest<'a> {
    openid: &'a str,
    signature: &'a str,
    sig_method: &'a str,
}

/// The `Internet` component.
#[derive(Debug, Clone)]
pub struct InternetApi {
    base: BaseClient,
}

impl InternetApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    /// Recent user encryption keys for secure network transport.
    /// `signature` is the HMAC-SHA256 of an empty string keyed by the
    /// session key; `sig_method` is `hmac_sha256`.
    ///
    /// POST /wxa/business/getuserencryptkey
    pub async fn get_user_encrypt_key(
        &self,
        open_id: &str,
        signature: &str,
        sig_method: &str,
    ) -> Result<UserEncryptKeyResponse, WechatError> {
        self.base
            .http_post_json(
                "/wxa/business/getuserencryptkey",
                &EncryptKeyRequest {
                    openid: open_id,
                    signature,
                    sig_method,
                },
            )
            .await
    }
}

impl Component for InternetApi {
    fn name(&self) -> &'static str {
        "Internet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::testing::signed_container;
    use crate::token::TokenEndpoint;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_user_encrypt_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wxa/business/getuserencryptkey"))
            .and(body_json(json!({
                "openid": "oUser",
                "signature": "sig",
                "sig_method": "hmac_sha256"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "key_info_list": [{
                    "encrypt_key": "VI6BpyrK9XH4i4AIGe86tg==",
                    "version": 10,
                    "expire_in": 3597,
                    "iv": "6003f73ec441c386",
                    "create_time": 1616572301
                }]
            })))
            .mount(&server)
            .await;

        let container = signed_container(&server, TokenEndpoint::MiniProgram).await;
        let internet = InternetApi::new(&container).unwrap();
        let keys = internet
            .get_user_encrypt_key("oUser", "sig", "hmac_sha256")
            .await
            .unwrap();
        assert_eq!(keys.key_info_list.len(), 1);
        assert_eq!(keys.key_info_list[0].version, 10);
    }
}
