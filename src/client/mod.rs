//! WeChat HTTP transport
//!
//! [`WechatClient`] is the one transport every component of an application
//! shares. It joins endpoint paths onto the configured base URI, sends JSON
//! or multipart bodies, and maps `errcode != 0` answers to
//! [`WechatError::Api`](crate::WechatError::Api).

mod wechat_client;
pub use wechat_client::{WechatClient, WechatClientBuilder};
