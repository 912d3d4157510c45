//! Mapper binding and dispatch

mod interface;
mod proxy;
mod registry;

pub use interface::{
    object_method, DefaultMethodBody, MapperInterface, MapperInterfaceBuilder, MapperMethod,
    MethodKey, OBJECT_CONTRACT,
};
pub use proxy::{MapperProxy, MapperProxyFactory};
pub use registry::{Mapper, MapperRegistry};
