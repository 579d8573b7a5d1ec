//! Tower layers for the transport.
//!
//! A layer is applied with [`WechatClient::layered`](crate::WechatClient::layered);
//! every request the client sends afterwards runs through it. The service
//! container applies [`LoggingMiddleware`] on its own when `http_debug` is
//! set, so hosts normally only touch this module for custom layers.
//!
//! ```
//! use wechat_sdk::middleware::LoggingMiddleware;
//! use wechat_sdk::WechatClient;
//!
//! let client = WechatClient::builder()
//!     .base_url("https://qyapi.weixin.qq.com/")
//!     .build()
//!     .unwrap()
//!     .layered(LoggingMiddleware::new().verbose());
//! assert_eq!(client.base_url(), "https://qyapi.weixin.qq.com/");
//! ```

pub use tower::{Layer, Service, ServiceBuilder};

mod logging;

pub use logging::{Logged, LoggingMiddleware};
