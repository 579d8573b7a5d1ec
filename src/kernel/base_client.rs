//! Authenticated request helper embedded by components.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ServiceContainer;
use crate::client::WechatClient;
use crate::config::ConfigTree;
use crate::error::WechatError;
use crate::token::TokenManager;

/// Container back-reference plus the credential handle, captured when the
/// component is constructed.
///
/// Every `http_*` call fetches the current access token and appends it to
/// the endpoint as the `access_token` query parameter.
#[derive(Clone)]
pub struct BaseClient {
    container: Arc<ServiceContainer>,
    token_manager: Arc<TokenManager>,
}

impl std::fmt::Debug for BaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseClient")
            .field("base_url", &self.container.client().base_url())
            .finish_non_exhaustive()
    }
}

impl BaseClient {
    /// # Errors
    /// `WechatError::Config` when the container has no credential handle
    /// yet, i.e. `AccessToken` was not registered first.
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            container: Arc::clone(container),
            token_manager: container.access_token()?,
        })
    }

    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    pub fn config(&self) -> &ConfigTree {
        self.container.get_config()
    }

    pub fn client(&self) -> &WechatClient {
        self.container.client()
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    async fn signed(&self, endpoint: &str) -> Result<String, WechatError> {
        let access_token = self.token_manager.get_token().await?;
        Ok(WechatClient::append_access_token(endpoint, &access_token))
    }

    pub async fn http_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WechatError> {
        let path = self.signed(endpoint).await?;
        self.client().get(&path, query).await
    }

    pub async fn http_post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, WechatError> {
        let path = self.signed(endpoint).await?;
        self.client().post(&path, body).await
    }

    pub async fn http_get_bytes(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, WechatError> {
        let path = self.signed(endpoint).await?;
        self.client().get_bytes(&path, query).await
    }

    pub async fn http_post_bytes<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Vec<u8>, WechatError> {
        let path = self.signed(endpoint).await?;
        self.client().post_bytes(&path, body).await
    }

    pub async fn http_upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, WechatError> {
        let path = self.signed(endpoint).await?;
        self.client().post_multipart(&path, form).await
    }
}

/// Single-file multipart form with the file under the `media` field.
pub(crate) fn media_form(file_name: &str, content: Vec<u8>) -> Form {
    Form::new().part("media", Part::bytes(content).file_name(file_name.to_string()))
}
