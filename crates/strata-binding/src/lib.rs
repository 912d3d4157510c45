//! Strata Binding - mapper registry, dispatch and configuration
//!
//! Mapper interfaces are described with [`MapperInterface`] and bound in a
//! [`MapperRegistry`]. A bound instance routes each call to a handler built
//! by the configured [`MapperMethodFactory`]; handlers are built once per
//! interface method and shared by every instance, whatever session it uses.
//!
//! # Example
//!
//! ```ignore
//! struct UserMapper(MapperProxy);
//!
//! impl Mapper for UserMapper {
//!     fn interface() -> MapperInterface {
//!         MapperInterface::builder("UserMapper")
//!             .method("count", vec![], TypeRef::Long)
//!             .build()
//!     }
//!
//!     fn bind(proxy: MapperProxy) -> Self {
//!         UserMapper(proxy)
//!     }
//! }
//!
//! impl UserMapper {
//!     fn count(&self) -> strata_binding::Result<Value> {
//!         self.0.invoke("count", &[])
//!     }
//! }
//!
//! registry.add_mapper::<UserMapper>()?;
//! let users: UserMapper = registry.get_mapper(session)?;
//! ```

#![warn(missing_docs)]

pub mod configuration;
pub mod error;
pub mod handler;
pub mod mapper;
pub mod session;
pub mod settings;
pub mod type_alias;

pub use configuration::Configuration;
pub use error::{BindingError, BindingResult, Error, Result};
pub use handler::{MapperMethodFactory, MapperMethodHandler};
pub use mapper::{
    Mapper, MapperInterface, MapperInterfaceBuilder, MapperMethod, MapperProxy,
    MapperProxyFactory, MapperRegistry, MethodKey,
};
pub use session::Session;
pub use settings::Settings;
pub use type_alias::TypeAliasRegistry;

pub use strata_reflect;
