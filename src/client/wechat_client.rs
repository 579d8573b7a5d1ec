//! reqwest transport shared by every component of an application.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::multipart::Form;
use reqwest::{Client, Request, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service};

use crate::error::WechatError;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, reqwest::Error>> + Send>>;
type MiddlewareExecutor = Arc<dyn Fn(Request) -> MiddlewareFuture + Send + Sync>;

/// Base-URI-bound HTTP client with `errcode` checking.
///
/// Cheap to clone; clones share the connection pool and middleware.
#[derive(Clone)]
pub struct WechatClient {
    http: Client,
    base_url: String,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for WechatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatClient")
            .field("base_url", &self.base_url)
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errcode: i32,
    #[serde(default)]
    errmsg: String,
}

impl WechatClient {
    pub fn builder() -> WechatClientBuilder {
        WechatClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base URL and an endpoint path with exactly one `/`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn append_access_token(path: &str, access_token: &str) -> String {
        let encoded = utf8_percent_encode(access_token, NON_ALPHANUMERIC);
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{path}{separator}access_token={encoded}")
    }

    /// Wrap the transport with a tower layer.
    ///
    /// Every request issued through this client afterwards runs through the
    /// layered service.
    pub fn layered<L>(self, layer: L) -> Self
    where
        L: Layer<WechatClient>,
        L::Service: Service<Request, Response = Response, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        let service = layer.layer(self.clone());
        let executor = make_middleware_executor(service);
        self.with_middleware_executor(executor)
    }

    fn with_middleware_executor(mut self, executor: MiddlewareExecutor) -> Self {
        self.middleware_executor = Some(executor);
        self
    }

    pub(crate) async fn send_request(&self, request: Request) -> Result<Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T, WechatError> {
        let response = self.send_request(request).await?;

        if let Err(e) = response.error_for_status_ref() {
            return Err(e.into());
        }

        let value: serde_json::Value = response.json().await?;

        if let Some(errcode) = value.get("errcode").and_then(|v| v.as_i64()) {
            if errcode != 0 {
                let errmsg = value
                    .get("errmsg")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown error");
                return Err(WechatError::Api {
                    code: errcode.try_into().unwrap_or(i32::MAX),
                    message: errmsg.to_string(),
                });
            }
        }

        serde_json::from_value(value).map_err(|e| WechatError::Decode(e.to_string()))
    }

    async fn execute_bytes(&self, request: Request) -> Result<Vec<u8>, WechatError> {
        let response = self.send_request(request).await?;

        if let Err(e) = response.error_for_status_ref() {
            return Err(e.into());
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("json"))
            .unwrap_or(false);

        if is_json {
            let error: ErrorResponse = response.json().await?;
            WechatError::check_api(error.errcode, &error.errmsg)?;
            return Err(WechatError::Decode(
                "expected binary body, got JSON".to_string(),
            ));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// GET `path` with `query` and decode the JSON answer into `T`.
    ///
    /// # Errors
    /// `Http` for a non-2xx status, `Api` for a non-zero `errcode`,
    /// `Decode` when the body does not fit `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WechatError> {
        let request = self.http.get(self.url(path)).query(query).build()?;
        self.execute(request).await
    }

    /// POST `body` as JSON and decode the answer into `T`.
    ///
    /// # Errors
    /// Same as [`get`](Self::get).
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, WechatError> {
        let request = self.http.post(self.url(path)).json(body).build()?;
        self.execute(request).await
    }

    /// GET an endpoint that answers with a binary body.
    ///
    /// A JSON answer is reported as an API error.
    pub async fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, WechatError> {
        let request = self.http.get(self.url(path)).query(query).build()?;
        self.execute_bytes(request).await
    }

    /// POST JSON to an endpoint that answers with a binary body (images).
    pub async fn post_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, WechatError> {
        let request = self.http.post(self.url(path)).json(body).build()?;
        self.execute_bytes(request).await
    }

    /// POST a multipart form (file uploads).
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, WechatError> {
        let request = self.http.post(self.url(path)).multipart(form).build()?;
        self.execute(request).await
    }
}

impl Service<Request> for WechatClient {
    type Response = Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

fn make_middleware_executor<S>(service: S) -> MiddlewareExecutor
where
    S: Service<Request, Response = Response, Error = reqwest::Error>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    let service = Arc::new(service);

    Arc::new(move |request: Request| {
        let mut service = (*service).clone();
        Box::pin(async move { service.call(request).await })
    })
}

/// Configures the base URI and timeouts of a [`WechatClient`].
///
/// # Example
///
/// ```rust
/// use wechat_sdk::client::WechatClient;
///
/// let client = WechatClient::builder()
///     .base_url("https://qyapi.weixin.qq.com/")
///     .build()
///     .unwrap();
/// assert_eq!(client.url("/cgi-bin/gettoken"), "https://qyapi.weixin.qq.com/cgi-bin/gettoken");
/// ```
#[derive(Debug, Default)]
pub struct WechatClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl WechatClientBuilder {
    /// Required; usually taken from `http.base_uri`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Whole-request timeout, 30 s unless set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 10 s unless set.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// # Errors
    /// `Config` when the base URL is missing or not http(s).
    pub fn build(self) -> Result<WechatClient, WechatError> {
        let base_url = self
            .base_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| WechatError::missing("http.base_uri"))?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(WechatError::Config(format!(
                "http.base_uri must be an http(s) URL, got {base_url:?}"
            )));
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(WechatClient {
            http: client,
            base_url,
            middleware_executor: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct IpList {
        ip_list: Vec<String>,
    }

    #[test]
    fn test_builder_custom_base_url() {
        let client = WechatClient::builder()
            .base_url("https://custom.api.example.com")
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://custom.api.example.com");
    }

    #[test]
    fn test_builder_custom_timeouts() {
        let client = WechatClient::builder()
            .base_url("https://qyapi.weixin.qq.com/")
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        // reqwest::Client doesn't expose timeout getters
        assert_eq!(client.base_url(), "https://qyapi.weixin.qq.com/");
    }

    #[test]
    fn test_builder_missing_base_url() {
        let result = WechatClient::builder().build();
        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[test]
    fn test_builder_rejects_non_http_base_url() {
        let result = WechatClient::builder().base_url("ftp://example.com").build();
        assert!(matches!(result, Err(WechatError::Config(_))));
    }

    #[test]
    fn test_url_joins_with_single_slash() {
        let client = WechatClient::builder()
            .base_url("https://qyapi.weixin.qq.com/")
            .build()
            .unwrap();
        assert_eq!(
            client.url("/cgi-bin/gettoken"),
            "https://qyapi.weixin.qq.com/cgi-bin/gettoken"
        );
        assert_eq!(
            client.url("cgi-bin/gettoken"),
            "https://qyapi.weixin.qq.com/cgi-bin/gettoken"
        );
    }

    #[test]
    fn test_append_access_token() {
        assert_eq!(
            WechatClient::append_access_token("/cgi-bin/user/get", "tok"),
            "/cgi-bin/user/get?access_token=tok"
        );
        assert_eq!(
            WechatClient::append_access_token("/cgi-bin/media/upload?type=image", "tok"),
            "/cgi-bin/media/upload?type=image&access_token=tok"
        );
        assert_eq!(
            WechatClient::append_access_token("/wxa/msg_sec_check", "a+b"),
            "/wxa/msg_sec_check?access_token=a%2Bb"
        );
    }

    #[tokio::test]
    async fn test_get_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/getcallbackip"))
            .and(query_param("access_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip_list": ["1.1.1.1"]
            })))
            .mount(&mock_server)
            .await;

        let client = WechatClient::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let list: IpList = client
            .get("/cgi-bin/getcallbackip", &[("access_token", "tok")])
            .await
            .unwrap();
        assert_eq!(list.ip_list, vec!["1.1.1.1".to_string()]);
    }

    #[tokio::test]
    async fn test_post_api_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/message/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 40014,
                "errmsg": "invalid access_token"
            })))
            .mount(&mock_server)
            .await;

        let client = WechatClient::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let result: Result<serde_json::Value, _> = client
            .post("/cgi-bin/message/send", &serde_json::json!({}))
            .await;
        match result {
            Err(WechatError::Api { code, message }) => {
                assert_eq!(code, 40014);
                assert_eq!(message, "invalid access_token");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/getcallbackip"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = WechatClient::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let result: Result<IpList, _> = client.get("/cgi-bin/getcallbackip", &[]).await;
        assert!(matches!(result, Err(WechatError::Http(_))));
    }

    #[tokio::test]
    async fn test_decode_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/getcallbackip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 0,
                "errmsg": "ok"
            })))
            .mount(&mock_server)
            .await;

        let client = WechatClient::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let result: Result<IpList, _> = client.get("/cgi-bin/getcallbackip", &[]).await;
        assert!(matches!(result, Err(WechatError::Decode(_))));
    }

    #[tokio::test]
    async fn test_post_bytes_returns_binary_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wxa/getwxacode"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0xFF, 0xD8, 0xFF]),
            )
            .mount(&mock_server)
            .await;

        let client = WechatClient::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let bytes = client
            .post_bytes("/wxa/getwxacode", &serde_json::json!({"path": "pages/index"}))
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_post_bytes_json_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wxa/getwxacode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errcode": 45009,
                "errmsg": "reach max api daily quota limit"
            })))
            .mount(&mock_server)
            .await;

        let client = WechatClient::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let result = client
            .post_bytes("/wxa/getwxacode", &serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(WechatError::Api { code: 45009, .. })));
    }

    #[tokio::test]
    async fn test_layered_client_runs_middleware() {
        #[derive(Clone)]
        struct FlagLayer {
            flag: Arc<AtomicBool>,
        }

        impl Layer<WechatClient> for FlagLayer {
            type Service = FlagService;

            fn layer(&self, inner: WechatClient) -> Self::Service {
                FlagService {
                    inner,
                    flag: Arc::clone(&self.flag),
                }
            }
        }

        #[derive(Clone)]
        struct FlagService {
            inner: WechatClient,
            flag: Arc<AtomicBool>,
        }

        impl Service<Request> for FlagService {
            type Response = Response;
            type Error = reqwest::Error;
            type Future = MiddlewareFuture;

            fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                Poll::Ready(Ok(()))
            }

            fn call(&mut self, req: Request) -> Self::Future {
                self.flag.store(true, Ordering::SeqCst);
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
        }

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/getcallbackip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip_list": []
            })))
            .mount(&mock_server)
            .await;

        let invoked = Arc::new(AtomicBool::new(false));
        let client = WechatClient::builder()
            .base_url(mock_server.uri())
            .build()
            .unwrap()
            .layered(FlagLayer {
                flag: Arc::clone(&invoked),
            });

        let _: IpList = client.get("/cgi-bin/getcallbackip", &[]).await.unwrap();
        assert!(invoked.load(Ordering::SeqCst));
    }
}
