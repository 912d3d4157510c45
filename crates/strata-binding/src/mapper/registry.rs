//! Registry of bound mapper interfaces

use std::any::{type_name, TypeId};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::interface::MapperInterface;
use super::proxy::{MapperProxy, MapperProxyFactory};
use crate::error::{BindingError, BindingResult};
use crate::handler::MapperMethodFactory;
use crate::session::Session;

/// Adapter type for a mapper interface.
///
/// Implementations describe the interface and wrap a bound
/// [`MapperProxy`], forwarding each method to [`MapperProxy::invoke`].
pub trait Mapper: Sized + Send + Sync + 'static {
    /// Descriptor of the interface
    fn interface() -> MapperInterface;

    /// Wrap a bound instance
    fn bind(proxy: MapperProxy) -> Self;
}

/// Short type name for messages
fn short_name<M: 'static>() -> &'static str {
    let full = type_name::<M>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Known mapper interfaces, one proxy factory each
pub struct MapperRegistry {
    method_factory: Arc<dyn MapperMethodFactory>,
    known: RwLock<FxHashMap<TypeId, Arc<MapperProxyFactory>>>,
}

impl MapperRegistry {
    /// Registry building handlers with `method_factory`
    pub fn new(method_factory: Arc<dyn MapperMethodFactory>) -> Self {
        Self {
            method_factory,
            known: RwLock::new(FxHashMap::default()),
        }
    }

    /// Bind mapper `M`.
    ///
    /// The interface is visible in the registry while its methods are
    /// validated; if validation fails it is removed again and nothing stays
    /// registered.
    pub fn add_mapper<M: Mapper>(&self) -> BindingResult<()> {
        let interface = M::interface();
        if !interface.is_interface() {
            return Err(BindingError::NotAnInterface {
                mapper: interface.name().to_string(),
            });
        }

        let type_id = TypeId::of::<M>();
        let factory = Arc::new(MapperProxyFactory::new(
            Arc::new(interface),
            self.method_factory.clone(),
        ));
        {
            let mut known = self.known.write();
            if known.contains_key(&type_id) {
                return Err(BindingError::AlreadyBound {
                    mapper: factory.interface().name().to_string(),
                });
            }
            known.insert(type_id, factory.clone());
        }

        if let Err(err) = self.validate(factory.interface()) {
            self.known.write().remove(&type_id);
            log::debug!("Rolled back registration of {}: {}", factory.interface().name(), err);
            return Err(err);
        }

        log::debug!(
            "Registered mapper {} ({} methods)",
            factory.interface().name(),
            factory.interface().methods().len()
        );
        Ok(())
    }

    fn validate(&self, interface: &MapperInterface) -> BindingResult<()> {
        let invalid = |reason: String| BindingError::InvalidMapper {
            mapper: interface.name().to_string(),
            reason,
        };

        let duplicates = interface.duplicate_signatures();
        if !duplicates.is_empty() {
            return Err(invalid(format!(
                "duplicate method signatures: {}",
                duplicates.join(", ")
            )));
        }

        for method in interface.methods() {
            if method.is_default() || method.is_object_method() {
                continue;
            }
            self.method_factory
                .validate(self, interface, &method)
                .map_err(|err| invalid(format!("{}: {:#}", method.name(), err)))?;
        }
        Ok(())
    }

    /// Bound instance of `M` executing against `session`
    pub fn get_mapper<M: Mapper>(&self, session: Arc<dyn Session>) -> BindingResult<M> {
        let factory = self
            .known
            .read()
            .get(&TypeId::of::<M>())
            .cloned()
            .ok_or_else(|| BindingError::NotRegistered {
                mapper: short_name::<M>().to_string(),
            })?;
        Ok(M::bind(factory.new_instance(session)))
    }

    /// Whether `M` is bound
    pub fn has_mapper<M: Mapper>(&self) -> bool {
        self.known.read().contains_key(&TypeId::of::<M>())
    }

    /// Whether an interface named `name` is bound
    pub fn has_mapper_named(&self, name: &str) -> bool {
        self.known
            .read()
            .values()
            .any(|factory| factory.interface().name() == name)
    }

    /// Proxy factory of `M`
    pub fn proxy_factory<M: Mapper>(&self) -> Option<Arc<MapperProxyFactory>> {
        self.known.read().get(&TypeId::of::<M>()).cloned()
    }

    /// Names of bound interfaces, sorted
    pub fn mappers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .known
            .read()
            .values()
            .map(|factory| factory.interface().name().to_string())
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("mappers", &self.mappers())
            .finish()
    }
}
