//! WeChat Work and Mini Program SDK for Rust
//!
//! Server-side clients for the WeCom (WeChat Work) and WeChat Mini Program
//! open-platform APIs. Each product is an *application*: a service
//! container holding the merged configuration, the shared HTTP transport
//! and the access-token manager, plus a fixed, ordered set of components
//! bound to it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wechat_sdk::{UserConfig, Work};
//! use wechat_sdk::work::DepartmentApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let work = Work::new(&UserConfig {
//!         corp_id: "ww1234567890abcdef".into(),
//!         agent_id: 1000002,
//!         secret: "your_secret".into(),
//!         ..Default::default()
//!     })?;
//!
//!     // Typed field
//!     let departments = work.department.list(None).await?;
//!     println!("{} departments", departments.len());
//!
//!     // Name lookup
//!     if let Some(handle) = work.get_component("Department") {
//!         let department = handle.downcast::<DepartmentApi>();
//!         assert!(department.is_some());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`work`] - the WeCom application and its components
//! - [`mini_program`] - the Mini Program application and its components
//! - [`kernel`] - service container, component registry, application skeleton
//! - [`config`] - configuration tree and user settings
//! - [`client`] - HTTP transport
//! - [`middleware`] - tower layers for the transport
//! - [`token`] - access token management
//! - [`crypto`] - callback message cipher and user-data decryption
//! - [`error`] - error types
//!
//! ## Error Handling
//!
//! Every fallible call returns [`WechatError`]:
//!
//! ```rust,ignore
//! use wechat_sdk::WechatError;
//!
//! match work.department.get(1).await {
//!     Ok(department) => { /* handle success */ }
//!     Err(WechatError::Api { code, message }) => {
//!         eprintln!("API error: {} - {}", code, message);
//!     }
//!     Err(WechatError::Config(e)) => {
//!         eprintln!("Misconfigured: {}", e);
//!     }
//!     Err(e) => {
//!         eprintln!("Other error: {}", e);
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod kernel;
pub mod middleware;
pub mod mini_program;
pub mod token;
pub mod work;

pub use client::{WechatClient, WechatClientBuilder};
pub use config::{map_user_config, ConfigTree, UserConfig};
pub use error::WechatError;
pub use kernel::{Application, Component, ComponentHandle, ServiceContainer};
pub use mini_program::MiniProgram;
pub use token::{TokenEndpoint, TokenManager};
pub use work::Work;
