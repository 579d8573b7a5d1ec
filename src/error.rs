use thiserror::Error;

/// WeChat SDK error types
#[derive(Debug, Error)]
pub enum WechatError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("WeChat API error (code={code}): {message}")]
    Api { code: i32, message: String },

    #[error("Access token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Signature verification failed: {0}")]
    Signature(String),
}

impl WechatError {
    /// Turn an `errcode` / `errmsg` pair into a result.
    ///
    /// `0` is success, anything else becomes [`WechatError::Api`].
    pub fn check_api(code: i32, message: &str) -> Result<(), WechatError> {
        if code == 0 {
            return Ok(());
        }
        Err(WechatError::Api {
            code,
            message: message.to_string(),
        })
    }

    pub(crate) fn missing(key: &str) -> Self {
        WechatError::Config(format!("{key} is required"))
    }
}
