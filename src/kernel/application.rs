//! Application skeleton shared by the Work and Mini Program facades.
//!
//! A facade creates an [`ApplicationBuilder`] from its merged
//! configuration, registers its components in dependency order, and keeps
//! the returned `Arc`s as typed fields. [`ApplicationBuilder::build`] then
//! freezes the registry; nothing is added or removed afterwards.

use std::sync::Arc;

use super::{Component, ComponentHandle, ComponentRegistry, ServiceContainer};
use crate::config::ConfigTree;
use crate::error::WechatError;
use crate::token::TokenManager;

pub struct ApplicationBuilder {
    container: Arc<ServiceContainer>,
    registry: ComponentRegistry,
}

impl ApplicationBuilder {
    /// # Errors
    /// Propagates container construction errors.
    pub fn new(user_config: ConfigTree, default_config: ConfigTree) -> Result<Self, WechatError> {
        let container = ServiceContainer::new(user_config, default_config)?;
        Ok(Self::with_container(Arc::new(container)))
    }

    pub fn with_container(container: Arc<ServiceContainer>) -> Self {
        Self {
            container,
            registry: ComponentRegistry::new(),
        }
    }

    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    /// Run `constructor` against the container and register the result.
    ///
    /// # Errors
    /// Whatever the constructor reports, or `WechatError::Config` for a
    /// duplicate name.
    pub fn register<C, F>(&mut self, constructor: F) -> Result<Arc<C>, WechatError>
    where
        C: Component,
        F: FnOnce(&Arc<ServiceContainer>) -> Result<C, WechatError>,
    {
        self.register_shared(|container| constructor(container).map(Arc::new))
    }

    /// Like [`register`](Self::register) for constructors that already
    /// hand out an `Arc`.
    pub fn register_shared<C, F>(&mut self, constructor: F) -> Result<Arc<C>, WechatError>
    where
        C: Component,
        F: FnOnce(&Arc<ServiceContainer>) -> Result<Arc<C>, WechatError>,
    {
        let component = constructor(&self.container)?;
        self.registry
            .insert(ComponentHandle::new(Arc::clone(&component)))?;
        log::debug!("[WeChat] registered component {}", component.name());
        Ok(component)
    }

    pub fn build(self) -> Application {
        Application {
            container: self.container,
            registry: self.registry,
        }
    }
}

/// A fully constructed application: container plus frozen registry.
pub struct Application {
    container: Arc<ServiceContainer>,
    registry: ComponentRegistry,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("components", &self.registry.names())
            .finish_non_exhaustive()
    }
}

impl Application {
    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    pub fn get_config(&self) -> &ConfigTree {
        self.container.get_config()
    }

    pub fn get_access_token(&self) -> Result<Arc<TokenManager>, WechatError> {
        self.container.access_token()
    }

    /// Name-keyed lookup. `None` for names that were never registered.
    pub fn get_component(&self, name: &str) -> Option<ComponentHandle> {
        self.registry.get(name)
    }

    /// Lookup plus downcast in one step.
    pub fn component<T: Component>(&self, name: &str) -> Option<Arc<T>> {
        self.registry.get(name)?.downcast::<T>()
    }

    pub fn component_names(&self) -> &[&'static str] {
        self.registry.names()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }
}
