//! Service container and component registry
//!
//! The pieces every application is assembled from:
//!
//! - [`ServiceContainer`] - effective configuration, shared transport and
//!   credential handle
//! - [`Component`] / [`ComponentHandle`] / [`ComponentRegistry`] - name-keyed,
//!   downcastable component lookup
//! - [`ApplicationBuilder`] / [`Application`] - ordered registration and the
//!   frozen result
//! - [`BaseClient`] - access-token-signed requests for components
//! - [`Config`] - the `Config` component
//! - [`ApiResponse`] - generic `errcode` / `errmsg` response

mod application;
mod base_client;
mod component;
mod config;
mod container;
mod response;
#[cfg(test)]
pub(crate) mod testing;

pub use application::{Application, ApplicationBuilder};
pub use base_client::BaseClient;
pub(crate) use base_client::media_form;
pub use component::{AnyComponent, Component, ComponentHandle, ComponentRegistry};
pub use config::Config;
pub use container::ServiceContainer;
pub use response::ApiResponse;
