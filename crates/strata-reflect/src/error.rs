//! Error types for reflection and path navigation

use std::fmt;

use thiserror::Error;

/// Result type for reflection operations
pub type ReflectionResult<T> = Result<T, ReflectionError>;

/// Direction of a property access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// Reading a property
    Getter,
    /// Writing a property
    Setter,
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Getter => f.write_str("getter"),
            Accessor::Setter => f.write_str("setter"),
        }
    }
}

/// Errors raised by invokers, reflectors, factories and meta objects
#[derive(Debug, Error)]
pub enum ReflectionError {
    /// The property exists but the accessor rejected this call
    #[error("Could not invoke {accessor} of property '{property}' in '{class}': {reason}")]
    Access {
        /// Class owning the property
        class: String,
        /// Property name
        property: String,
        /// Accessor direction
        accessor: Accessor,
        /// Why the accessor failed
        reason: String,
    },

    /// The property does not exist (in the requested direction)
    #[error("There is no {accessor} for property named '{property}' in '{class}'")]
    NoSuchProperty {
        /// Class or type that was searched
        class: String,
        /// Property name
        property: String,
        /// Accessor direction
        accessor: Accessor,
    },

    /// A path cannot be walked or an intermediate value cannot be created
    #[error("Cannot navigate '{path}': {reason}")]
    Navigation {
        /// Path segment being navigated
        path: String,
        /// Reason
        reason: String,
    },

    /// No matching constructor, or construction failed
    #[error("Error instantiating {ty} with types ({arg_types}) and values ({args}): {cause}")]
    Instantiation {
        /// Requested type
        ty: String,
        /// Constructor signature that was requested
        arg_types: String,
        /// Constructor arguments
        args: String,
        /// Underlying failure
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Indexed write past the end of a container that cannot grow
    #[error("Index {index} is out of range for '{property}' (length {len})")]
    IndexOutOfRange {
        /// Container property
        property: String,
        /// Requested index
        index: usize,
        /// Current container length
        len: usize,
    },

    /// Operation not supported by this kind of object
    #[error("Operation '{operation}' is not supported on {target}")]
    Unsupported {
        /// Operation name
        operation: &'static str,
        /// Description of the wrapped object
        target: String,
    },
}

impl ReflectionError {
    pub(crate) fn navigation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ReflectionError::Navigation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn no_getter(class: impl Into<String>, property: impl Into<String>) -> Self {
        ReflectionError::NoSuchProperty {
            class: class.into(),
            property: property.into(),
            accessor: Accessor::Getter,
        }
    }

    pub(crate) fn no_setter(class: impl Into<String>, property: impl Into<String>) -> Self {
        ReflectionError::NoSuchProperty {
            class: class.into(),
            property: property.into(),
            accessor: Accessor::Setter,
        }
    }

    pub(crate) fn unsupported(operation: &'static str, target: impl Into<String>) -> Self {
        ReflectionError::Unsupported {
            operation,
            target: target.into(),
        }
    }

    /// True when the error reports a missing property
    pub fn is_no_such_property(&self) -> bool {
        matches!(self, ReflectionError::NoSuchProperty { .. })
    }
}
