//! Pluggable method execution

use std::sync::Arc;

use strata_reflect::Value;

use crate::configuration::Configuration;
use crate::mapper::{MapperInterface, MapperMethod, MapperRegistry};
use crate::session::Session;

/// Executes one mapper method against a session
pub trait MapperMethodHandler: Send + Sync {
    /// Run the method with `args`; the result is returned to the caller unchanged
    fn execute(&self, session: &dyn Session, args: &[Value]) -> anyhow::Result<Value>;
}

impl<F> MapperMethodHandler for F
where
    F: Fn(&dyn Session, &[Value]) -> anyhow::Result<Value> + Send + Sync,
{
    fn execute(&self, session: &dyn Session, args: &[Value]) -> anyhow::Result<Value> {
        self(session, args)
    }
}

/// Builds method handlers. Called at most once per interface method.
pub trait MapperMethodFactory: Send + Sync {
    /// Check a method while its interface is being registered.
    ///
    /// The interface is already visible in `registry`, so methods may
    /// refer to their own or to each other's mappers.
    fn validate(
        &self,
        _registry: &MapperRegistry,
        _interface: &MapperInterface,
        _method: &MapperMethod,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Build the handler for `method`
    fn create(
        &self,
        interface: &MapperInterface,
        method: &MapperMethod,
        configuration: &Configuration,
    ) -> anyhow::Result<Arc<dyn MapperMethodHandler>>;
}
