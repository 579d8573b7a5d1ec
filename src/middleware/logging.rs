use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use log::Level;
use reqwest::{Request, Response, Url};
use tower::{Layer, Service};

/// Query parameters whose values never reach the log.
const REDACTED_PARAMS: &[&str] = &[
    "access_token",
    "secret",
    "corpsecret",
    "appsecret",
    "key",
    "js_code",
    "session_key",
    "code",
];

/// Request/response logging for the transport, attached by the container
/// when `http_debug` is set.
///
/// Requests and responses log at `debug`; `verbose` (the `debug` flag)
/// raises them to `info` and adds response headers of interest. Credential
/// query parameters are replaced by `***`.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    verbose: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl<S> Layer<S> for LoggingMiddleware {
    type Service = Logged<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logged {
            inner,
            level: if self.verbose { Level::Info } else { Level::Debug },
            verbose: self.verbose,
        }
    }
}

/// Service produced by [`LoggingMiddleware`].
#[derive(Debug, Clone)]
pub struct Logged<S> {
    inner: S,
    level: Level,
    verbose: bool,
}

impl<S> Service<Request> for Logged<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: std::fmt::Display + Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let target = redact(request.url());
        let method = request.method().clone();
        let level = self.level;
        let verbose = self.verbose;
        // Drive the clone that was polled ready, leave a fresh one behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            log::log!(level, "[WeChat] --> {method} {target}");
            let started = Instant::now();

            match inner.call(request).await {
                Ok(response) => {
                    let elapsed = started.elapsed();
                    log::log!(
                        level,
                        "[WeChat] <-- {} {method} {target} ({elapsed:?})",
                        response.status()
                    );
                    if verbose {
                        let content_type = response
                            .headers()
                            .get(reqwest::header::CONTENT_TYPE)
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or("-");
                        log::log!(
                            level,
                            "[WeChat]     content-type: {content_type}, length: {:?}",
                            response.content_length()
                        );
                    }
                    Ok(response)
                }
                Err(error) => {
                    log::warn!("[WeChat] <-- failed {method} {target}: {error}");
                    Err(error)
                }
            }
        })
    }
}

/// `path?query` of `url` with credential values masked.
fn redact(url: &Url) -> String {
    let mut target = url.path().to_string();
    let pairs: Vec<String> = url
        .query_pairs()
        .map(|(name, value)| {
            if REDACTED_PARAMS
                .iter()
                .any(|param| name.eq_ignore_ascii_case(param))
            {
                format!("{name}=***")
            } else {
                format!("{name}={value}")
            }
        })
        .collect();
    if !pairs.is_empty() {
        target.push('?');
        target.push_str(&pairs.join("&"));
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WechatClient;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_redact_keeps_plain_params() {
        assert_eq!(
            redact(&url("https://qyapi.weixin.qq.com/cgi-bin/department/list?id=1")),
            "/cgi-bin/department/list?id=1"
        );
        assert_eq!(
            redact(&url("https://qyapi.weixin.qq.com/cgi-bin/getcallbackip")),
            "/cgi-bin/getcallbackip"
        );
    }

    #[test]
    fn test_redact_masks_credentials() {
        let target = redact(&url(
            "https://qyapi.weixin.qq.com/cgi-bin/gettoken?corpid=ww1&corpsecret=s3cr3t",
        ));
        assert_eq!(target, "/cgi-bin/gettoken?corpid=ww1&corpsecret=***");

        let target = redact(&url(
            "https://qyapi.weixin.qq.com/cgi-bin/user/get?access_token=abc&userid=zhangsan",
        ));
        assert_eq!(target, "/cgi-bin/user/get?access_token=***&userid=zhangsan");
    }

    #[test]
    fn test_redact_masks_webhook_key_and_login_code() {
        assert_eq!(
            redact(&url("https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=robot")),
            "/cgi-bin/webhook/send?key=***"
        );
        assert_eq!(
            redact(&url(
                "https://api.weixin.qq.com/sns/jscode2session?appid=wx1&secret=s&js_code=c"
            )),
            "/sns/jscode2session?appid=wx1&secret=***&js_code=***"
        );
    }

    #[tokio::test]
    async fn test_layered_client_passes_responses_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/gettoken"))
            .and(query_param("corpsecret", "s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "expires_in": 7200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WechatClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap()
            .layered(LoggingMiddleware::new().verbose());

        let body: serde_json::Value = client
            .get("/cgi-bin/gettoken", &[("corpid", "ww1"), ("corpsecret", "s3cr3t")])
            .await
            .unwrap();
        assert_eq!(body["access_token"], "tok");
    }

    #[tokio::test]
    async fn test_layered_client_keeps_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/department/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 42001,
                "errmsg": "access_token expired"
            })))
            .mount(&server)
            .await;

        let client = WechatClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap()
            .layered(LoggingMiddleware::new());

        let result: Result<serde_json::Value, _> =
            client.get("/cgi-bin/department/list", &[]).await;
        assert!(matches!(
            result,
            Err(crate::WechatError::Api { code: 42001, .. })
        ));
    }
}
