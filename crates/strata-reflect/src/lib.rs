//! Strata Reflect - runtime class model and property-path navigation
//!
//! Domain classes are described at runtime with [`ClassBuilder`]; their
//! instances are [`Value`]s. On top of that model this crate provides:
//!
//! - [`Reflector`]: per-class property tables (getters, setters, types),
//!   cached by a [`ReflectorFactory`]
//! - [`ObjectFactory`]: creation of beans and containers from a [`TypeRef`]
//! - [`PropertyTokenizer`]: splitting of paths like `orders[0].customer.name`
//! - [`MetaObject`] and [`MetaClass`]: reading, writing and inspecting
//!   nested properties through such paths
//!
//! # Example
//!
//! ```ignore
//! use strata_reflect::{ClassBuilder, MetaContext, MetaObject, TypeRef, Value};
//!
//! let address = ClassBuilder::new("Address").property("city", TypeRef::Str).build();
//! let user = ClassBuilder::new("User")
//!     .property("address", TypeRef::bean(&address))
//!     .build();
//!
//! let meta = MetaObject::with_context(Value::object(&user), MetaContext::default());
//! meta.set_value("address.city", Value::from("Lisbon"))?;
//! assert_eq!(meta.get_value("address.city")?, Value::from("Lisbon"));
//! ```

#![warn(missing_docs)]

pub mod class;
pub mod error;
pub mod invoker;
pub mod meta_class;
pub mod meta_object;
pub mod object_factory;
pub mod property;
pub mod reflector;
pub mod reflector_factory;
pub mod types;
pub mod value;
pub mod wrapper;

pub use class::{Class, ClassBuilder, ClassId, ClassRef, ConstructorDef, FieldDef, MethodDef};
pub use error::{Accessor, ReflectionError, ReflectionResult};
pub use invoker::Invoker;
pub use meta_class::MetaClass;
pub use meta_object::{MetaContext, MetaObject};
pub use object_factory::{DefaultObjectFactory, ObjectFactory};
pub use property::{PropertyTokenizer, Segments};
pub use reflector::Reflector;
pub use reflector_factory::{DefaultReflectorFactory, ReflectorFactory};
pub use types::{CollectionKind, TypeRef};
pub use value::{
    ArrayData, ArrayRef, ListData, ListRef, MapData, MapRef, Object, ObjectRef, SetData, SetItems,
    SetRef, Shared, Value,
};
pub use wrapper::{
    BeanWrapper, CollectionWrapper, DefaultObjectWrapperFactory, MapWrapper, NullWrapper,
    ObjectWrapper, ObjectWrapperFactory, ScalarWrapper,
};
