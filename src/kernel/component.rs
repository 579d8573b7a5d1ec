//! Components and the name-keyed registry
//!
//! Every capability-area client implements [`Component`]. The registry keeps
//! one [`ComponentHandle`] per component name, in registration order, so
//! generic tooling can reach a component by name and downcast it to its
//! concrete type.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::WechatError;

/// A capability-area client bound to an application's container.
pub trait Component: Send + Sync + 'static {
    /// Lookup name, unique within an application (e.g. `"Department"`).
    fn name(&self) -> &'static str;
}

/// Type-erased view of a [`Component`], implemented for every component.
pub trait AnyComponent: Component {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Component> AnyComponent for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Shared, type-erased reference to a registered component.
#[derive(Clone)]
pub struct ComponentHandle {
    inner: Arc<dyn AnyComponent>,
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.name())
            .finish()
    }
}

impl ComponentHandle {
    pub fn new<T: Component>(component: Arc<T>) -> Self {
        Self { inner: component }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub fn is<T: Component>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// The component as its concrete type, or `None` on a type mismatch.
    pub fn downcast<T: Component>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).into_any().downcast::<T>().ok()
    }
}

/// Ordered, name-unique set of components.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    order: Vec<&'static str>,
    components: HashMap<&'static str, ComponentHandle>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// `WechatError::Config` when a component with the same name exists.
    pub fn insert(&mut self, handle: ComponentHandle) -> Result<(), WechatError> {
        let name = handle.name();
        if self.components.contains_key(name) {
            return Err(WechatError::Config(format!(
                "component {name} is already registered"
            )));
        }
        self.order.push(name);
        self.components.insert(name, handle);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<ComponentHandle> {
        self.components.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Names in registration order.
    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentHandle> + '_ {
        self.order
            .iter()
            .filter_map(move |name| self.components.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
