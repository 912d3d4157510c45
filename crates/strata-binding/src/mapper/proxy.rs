//! Bound mapper instances and their method cache

use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxHasher;
use strata_reflect::Value;

use super::interface::{object_method, MapperInterface, MapperMethod, MethodKey};
use crate::error::{unwrap_failure, BindingError, Result};
use crate::handler::{MapperMethodFactory, MapperMethodHandler};
use crate::session::Session;

/// Handlers built for one interface, shared by every bound instance
pub(crate) type MethodCache =
    DashMap<MethodKey, Arc<dyn MapperMethodHandler>, BuildHasherDefault<FxHasher>>;

struct ProxyInner {
    session: Arc<dyn Session>,
    interface: Arc<MapperInterface>,
    method_cache: Arc<MethodCache>,
    method_factory: Arc<dyn MapperMethodFactory>,
}

/// Dispatcher behind a bound mapper.
///
/// Generated mapper types hold a `MapperProxy` and forward every method to
/// [`invoke`](MapperProxy::invoke). Cloning is cheap and keeps identity.
#[derive(Clone)]
pub struct MapperProxy {
    inner: Arc<ProxyInner>,
}

impl MapperProxy {
    /// Interface this instance is bound to
    pub fn interface(&self) -> &Arc<MapperInterface> {
        &self.inner.interface
    }

    /// Session calls are executed against
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.inner.session
    }

    /// Identity hash, stable for the lifetime of the bound instance
    pub fn identity_hash(&self) -> i64 {
        Arc::as_ptr(&self.inner) as *const () as usize as i64
    }

    /// Call `method` with `args`.
    ///
    /// `equals`, `hash_code` and `to_string` of the object contract are
    /// answered by the instance itself, even when the interface redeclares
    /// them. Other methods are resolved by name and arguments.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        if let Some(object) = object_method(method, args.len()) {
            return Ok(self.invoke_object_method(object, args));
        }
        match self.inner.interface.resolve_method(method, args) {
            Some(resolved) => self.invoke_method(&resolved, args),
            None => Err(BindingError::NoSuchMethod {
                mapper: self.inner.interface.name().to_string(),
                method: method.to_string(),
                arity: args.len(),
            }
            .into()),
        }
    }

    /// Call a resolved method
    pub fn invoke_method(&self, method: &Arc<MapperMethod>, args: &[Value]) -> Result<Value> {
        if method.is_object_method() {
            return Ok(self.invoke_object_method(method, args));
        }
        if let Some(body) = method.default_body() {
            return body(self, args).map_err(unwrap_failure);
        }
        let handler = self.cached_handler(method)?;
        handler
            .execute(self.inner.session.as_ref(), args)
            .map_err(unwrap_failure)
    }

    fn invoke_object_method(&self, method: &MapperMethod, _args: &[Value]) -> Value {
        match method.name() {
            "hash_code" => Value::Long(self.identity_hash()),
            "to_string" => Value::Str(self.to_string()),
            // A value never refers to a bound instance; compare proxies with `==`.
            _ => Value::Bool(false),
        }
    }

    fn cached_handler(&self, method: &Arc<MapperMethod>) -> Result<Arc<dyn MapperMethodHandler>> {
        let key = method.key();
        if let Some(handler) = self.inner.method_cache.get(&key) {
            return Ok(handler.clone());
        }
        match self.inner.method_cache.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let handler = self
                    .inner
                    .method_factory
                    .create(
                        &self.inner.interface,
                        method,
                        self.inner.session.configuration(),
                    )
                    .map_err(unwrap_failure)?;
                log::debug!("Built handler for {}", entry.key());
                entry.insert(handler.clone());
                Ok(handler)
            }
        }
    }
}

impl PartialEq for MapperProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MapperProxy {}

impl fmt::Display for MapperProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapperProxy({})", self.inner.interface.name())
    }
}

impl fmt::Debug for MapperProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Creates bound instances of one mapper interface
pub struct MapperProxyFactory {
    interface: Arc<MapperInterface>,
    method_cache: Arc<MethodCache>,
    method_factory: Arc<dyn MapperMethodFactory>,
}

impl MapperProxyFactory {
    /// Factory for `interface`, building handlers with `method_factory`
    pub fn new(interface: Arc<MapperInterface>, method_factory: Arc<dyn MapperMethodFactory>) -> Self {
        Self {
            interface,
            method_cache: Arc::new(MethodCache::default()),
            method_factory,
        }
    }

    /// Bound interface
    pub fn interface(&self) -> &Arc<MapperInterface> {
        &self.interface
    }

    /// Number of handlers built so far
    pub fn cached_method_count(&self) -> usize {
        self.method_cache.len()
    }

    /// New instance executing against `session`
    pub fn new_instance(&self, session: Arc<dyn Session>) -> MapperProxy {
        MapperProxy {
            inner: Arc::new(ProxyInner {
                session,
                interface: self.interface.clone(),
                method_cache: self.method_cache.clone(),
                method_factory: self.method_factory.clone(),
            }),
        }
    }
}

impl fmt::Debug for MapperProxyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperProxyFactory")
            .field("interface", &self.interface.name())
            .field("cached_methods", &self.method_cache.len())
            .finish()
    }
}
