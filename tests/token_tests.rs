use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use wechat_sdk::config::{HttpConfig, UserConfig};
use wechat_sdk::token::{CachedToken, TokenEndpoint, TokenManager};
use wechat_sdk::{MiniProgram, WechatClient, WechatError, Work};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token_json(token: &str) -> serde_json::Value {
    serde_json::json!({
        "errcode": 0,
        "errmsg": "ok",
        "access_token": token,
        "expires_in": 7200
    })
}

fn user_config(base_uri: String) -> UserConfig {
    UserConfig {
        corp_id: "ww_corp".to_string(),
        agent_id: 1000002,
        secret: "corp_secret".to_string(),
        http: HttpConfig {
            base_uri: Some(base_uri),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn manager(server: &MockServer, endpoint: TokenEndpoint) -> TokenManager {
    let client = WechatClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap();
    TokenManager::new(client, endpoint, "ww_corp", "corp_secret")
}

#[test]
fn test_cached_token_expiry_buffer() {
    let fresh = CachedToken::new("t", Duration::from_secs(7200));
    assert!(!fresh.is_expired(Duration::from_secs(300)));

    let expiring = CachedToken {
        token: "t".to_string(),
        expires_at: Instant::now() + Duration::from_secs(100),
        lifetime: Duration::from_secs(7200),
    };
    assert!(expiring.is_expired(Duration::from_secs(300)));
}

// ============================================================
// Concurrent refresh
// ============================================================

/// Two callers hit a component while the first refresh is still in flight:
/// both see the refreshed token and the endpoint is called once.
#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .and(query_param("corpid", "ww_corp"))
        .and(query_param("corpsecret", "corp_secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_json("fresh_token"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/getcallbackip"))
        .and(query_param("access_token", "fresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip_list": ["101.226.103.0/25"]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let work = Work::new(&user_config(server.uri())).unwrap();

    let (first, second) = futures::join!(work.base.get_callback_ip(), work.base.get_callback_ip());

    assert_eq!(first.unwrap().ip_list, vec!["101.226.103.0/25"]);
    assert_eq!(second.unwrap().ip_list, vec!["101.226.103.0/25"]);
}

/// Many spawned tasks during a slow refresh: one token request, every task
/// sees the same complete token.
#[tokio::test]
async fn test_spawned_callers_never_see_partial_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/token"))
        .and(query_param("grant_type", "client_credential"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_json("mini_program_token"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = MiniProgram::new(&user_config(server.uri())).unwrap();
    let token = app.get_access_token();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let token = Arc::clone(&token);
            tokio::spawn(async move { token.get_token().await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert_eq!(result.unwrap().unwrap(), "mini_program_token");
    }
}

/// Readers racing a forced refresh observe the old or the new token only.
#[tokio::test]
async fn test_reader_during_refresh_sees_old_or_new() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_json("new_token"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    manager
        .set_token("old_token", Duration::from_secs(7200))
        .await;

    let (refreshed, read) = futures::join!(manager.refresh(), manager.get_token());

    assert_eq!(refreshed.unwrap(), "new_token");
    let read = read.unwrap();
    assert!(read == "old_token" || read == "new_token", "torn read: {read}");
    assert_eq!(manager.get_token().await.unwrap(), "new_token");
}

// ============================================================
// Cache lifecycle
// ============================================================

#[tokio::test]
async fn test_cached_token_is_reused() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("cached")))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    assert_eq!(manager.get_token().await.unwrap(), "cached");
    assert_eq!(manager.get_token().await.unwrap(), "cached");
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(move |_: &wiremock::Request| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            ResponseTemplate::new(200).set_body_json(token_json(&format!("token_v{n}")))
        })
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    assert_eq!(manager.get_token().await.unwrap(), "token_v1");

    manager.invalidate().await;
    assert_eq!(manager.get_token().await.unwrap(), "token_v2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("replacement")))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    manager.set_token("stale", Duration::ZERO).await;
    assert_eq!(manager.get_token().await.unwrap(), "replacement");
}

#[tokio::test]
async fn test_short_lived_token_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "short_lived",
            "expires_in": 120
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    assert_eq!(manager.get_token().await.unwrap(), "short_lived");
    assert_eq!(manager.get_token().await.unwrap(), "short_lived");
}

// ============================================================
// Failures
// ============================================================

#[tokio::test]
async fn test_credential_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 40001,
            "errmsg": "invalid credential"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    assert!(matches!(
        manager.get_token().await,
        Err(WechatError::Api { code: 40001, .. })
    ));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("third_time")))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    assert_eq!(manager.get_token().await.unwrap(), "third_time");
}

#[tokio::test]
async fn test_empty_token_is_token_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "expires_in": 7200
        })))
        .mount(&server)
        .await;

    let manager = manager(&server, TokenEndpoint::Work);
    assert!(matches!(
        manager.get_token().await,
        Err(WechatError::Token(_))
    ));
}
