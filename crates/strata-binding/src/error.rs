//! Error types for mapper binding and dispatch

use strata_reflect::ReflectionError;
use thiserror::Error;

/// Result type for registry and configuration operations
pub type BindingResult<T> = std::result::Result<T, BindingError>;

/// Errors raised while binding mapper interfaces or loading configuration
#[derive(Debug, Error)]
pub enum BindingError {
    /// No factory is registered for the mapper
    #[error("Type {mapper} is not known to the MapperRegistry.")]
    NotRegistered {
        /// Mapper interface name
        mapper: String,
    },

    /// The mapper was registered before
    #[error("Type {mapper} is already known to the MapperRegistry.")]
    AlreadyBound {
        /// Mapper interface name
        mapper: String,
    },

    /// Only interfaces can be bound
    #[error("Type {mapper} is not an interface and cannot be bound as a mapper.")]
    NotAnInterface {
        /// Descriptor name
        mapper: String,
    },

    /// Method validation failed during registration
    #[error("Invalid mapper {mapper}: {reason}")]
    InvalidMapper {
        /// Mapper interface name
        mapper: String,
        /// Validation failure
        reason: String,
    },

    /// The mapper declares no such method
    #[error("Mapper {mapper} has no method {method} taking {arity} argument(s)")]
    NoSuchMethod {
        /// Mapper interface name
        mapper: String,
        /// Method name
        method: String,
        /// Number of arguments given
        arity: usize,
    },

    /// Type alias lookup failed
    #[error("Could not resolve type alias '{0}'")]
    UnknownTypeAlias(String),

    /// Settings file could not be read
    #[error("Failed to read settings: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings could not be parsed
    #[error("Failed to parse settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),
}

/// Result type for mapper calls
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by mapper calls
#[derive(Debug, Error)]
pub enum Error {
    /// Binding or dispatch failure
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// Property access failure
    #[error(transparent)]
    Reflection(#[from] ReflectionError),

    /// Failure reported by a method handler
    #[error(transparent)]
    Execution(anyhow::Error),
}

impl Error {
    /// Handler failure, if this error came from one
    pub fn as_execution(&self) -> Option<&anyhow::Error> {
        match self {
            Error::Execution(err) => Some(err),
            _ => None,
        }
    }
}

/// Strip context layers that handlers added on the way up and surface the
/// underlying binding or reflection error. Anything else is reported as an
/// execution failure, unchanged.
pub(crate) fn unwrap_failure(err: anyhow::Error) -> Error {
    let err = match err.downcast::<Error>() {
        Ok(err) => return err,
        Err(err) => err,
    };
    let err = match err.downcast::<BindingError>() {
        Ok(err) => return Error::Binding(err),
        Err(err) => err,
    };
    match err.downcast::<ReflectionError>() {
        Ok(err) => Error::Reflection(err),
        Err(err) => Error::Execution(err),
    }
}
