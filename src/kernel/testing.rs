//! Fixtures for component unit tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::MockServer;

use super::ServiceContainer;
use crate::config::ConfigTree;
use crate::token::{TokenEndpoint, TokenManager};

pub(crate) const TEST_TOKEN: &str = "test_token";
pub(crate) const TEST_CORP_ID: &str = "ww1234567890abcdef";
pub(crate) const TEST_AES_KEY: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG";

/// Container pointed at `server` with a pre-seeded access token, so
/// component calls never hit the token endpoint.
pub(crate) async fn signed_container(
    server: &MockServer,
    endpoint: TokenEndpoint,
) -> Arc<ServiceContainer> {
    let user: ConfigTree = [
        ("corp_id", json!(TEST_CORP_ID)),
        ("agent_id", json!(1000002)),
        ("secret", json!("secret_test")),
        ("token", json!("callback_token")),
        ("aes_key", json!(TEST_AES_KEY)),
        ("http.base_uri", json!(server.uri())),
    ]
    .into_iter()
    .collect();

    let container = Arc::new(ServiceContainer::new(user, ConfigTree::new()).unwrap());
    let manager = TokenManager::register(&container, endpoint).unwrap();
    manager
        .set_token(TEST_TOKEN, Duration::from_secs(7200))
        .await;
    container
}
