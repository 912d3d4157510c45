//! Uniform property access over beans, maps and collections
//!
//! A wrapper handles exactly one path segment. Walking deeper paths is
//! done by [`MetaObject`](crate::MetaObject), which asks the wrapper for
//! the value at the current segment and wraps that value in turn.

mod bean;
mod collection;
mod map;
mod plain;

pub use bean::BeanWrapper;
pub use collection::CollectionWrapper;
pub use map::MapWrapper;
pub use plain::{NullWrapper, ScalarWrapper};

use crate::error::{ReflectionError, ReflectionResult};
use crate::meta_object::MetaContext;
use crate::property::PropertyTokenizer;
use crate::types::TypeRef;
use crate::value::Value;

/// Property access on one wrapped value
pub trait ObjectWrapper {
    /// Value at `prop` (name plus optional index); children are ignored
    fn get(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value>;

    /// Write `value` at `prop`; children are ignored
    fn set(&self, prop: &PropertyTokenizer<'_>, value: Value) -> ReflectionResult<()>;

    /// Canonical spelling of a (possibly nested) property name
    fn find_property(&self, name: &str, use_camel_case_mapping: bool) -> Option<String>;

    /// Readable property names
    fn getter_names(&self) -> Vec<String>;

    /// Writable property names
    fn setter_names(&self) -> Vec<String>;

    /// Type accepted when writing a (possibly nested) property
    fn setter_type(&self, name: &str) -> ReflectionResult<TypeRef>;

    /// Type returned when reading a (possibly nested) property
    fn getter_type(&self, name: &str) -> ReflectionResult<TypeRef>;

    /// Whether a (possibly nested) property can be written
    fn has_setter(&self, name: &str) -> bool;

    /// Whether a (possibly nested) property can be read
    fn has_getter(&self, name: &str) -> bool;

    /// Create a value for the missing intermediate at `prop`.
    ///
    /// The value is returned unattached; the caller stores it with
    /// [`set`](ObjectWrapper::set) once it has been filled.
    fn instantiate_property_value(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value>;

    /// True when the wrapped value is a collection or array
    fn is_collection(&self) -> bool;

    /// Append one element
    fn add(&self, element: Value) -> ReflectionResult<()>;

    /// Append several elements
    fn add_all(&self, elements: Vec<Value>) -> ReflectionResult<()>;
}

/// Supplies custom wrappers. Consulted before the built-in wrappers.
pub trait ObjectWrapperFactory: Send + Sync {
    /// Wrapper for `object`, or `None` to fall back to the built-in ones
    fn wrapper_for(&self, ctx: &MetaContext, object: &Value) -> Option<Box<dyn ObjectWrapper>>;
}

/// Wrapper factory that never supplies a wrapper
#[derive(Debug, Default, Clone)]
pub struct DefaultObjectWrapperFactory;

impl ObjectWrapperFactory for DefaultObjectWrapperFactory {
    fn wrapper_for(&self, _ctx: &MetaContext, _object: &Value) -> Option<Box<dyn ObjectWrapper>> {
        None
    }
}

/// Name of the container addressed by an indexed segment
fn container_name<'a>(prop: &PropertyTokenizer<'a>) -> &'a str {
    if prop.name().is_empty() {
        prop.indexed_name()
    } else {
        prop.name()
    }
}

/// Indices are non-negative decimals; `-1` or `x` is a navigation error
/// on reads and writes alike, never an out-of-range access.
fn parse_index(prop: &PropertyTokenizer<'_>, index: &str) -> ReflectionResult<usize> {
    index.trim().parse::<usize>().map_err(|_| {
        ReflectionError::navigation(
            prop.indexed_name(),
            format!("'{}' is not a valid index", index),
        )
    })
}

/// Largest number of elements one auto-growing write may append
pub(crate) const MAX_AUTO_GROWTH: usize = 1 << 16;

/// Reserve room for writing at `index`, refusing growth beyond
/// [`MAX_AUTO_GROWTH`] or what the allocator can provide
fn can_grow(items: &mut Vec<Value>, index: usize) -> bool {
    match (index - items.len()).checked_add(1) {
        Some(additional) if additional <= MAX_AUTO_GROWTH => items.try_reserve(additional).is_ok(),
        _ => false,
    }
}

/// Read the element addressed by the index of `prop` from `container`.
/// Missing keys and out-of-range indices read as null.
pub(crate) fn read_indexed(container: &Value, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
    let index = prop.index().unwrap_or_default();
    match container {
        Value::Null => Ok(Value::Null),
        Value::Map(map) => Ok(map.read().entries.get(index).cloned().unwrap_or_default()),
        Value::List(list) => {
            let i = parse_index(prop, index)?;
            Ok(list.read().items.get(i).cloned().unwrap_or_default())
        }
        Value::Array(array) => {
            let i = parse_index(prop, index)?;
            Ok(array.read().items.get(i).cloned().unwrap_or_default())
        }
        other => Err(ReflectionError::navigation(
            prop.indexed_name(),
            format!(
                "'{}' is a {}, not a list, array or map",
                container_name(prop),
                other.type_name()
            ),
        )),
    }
}

/// Write `value` at the index of `prop` into `container`. Lists grow
/// (padding with null) only when `auto_grow` is set; arrays never grow.
pub(crate) fn write_indexed(
    container: &Value,
    prop: &PropertyTokenizer<'_>,
    value: Value,
    auto_grow: bool,
) -> ReflectionResult<()> {
    let index = prop.index().unwrap_or_default();
    match container {
        Value::Map(map) => {
            map.write().entries.insert(index.to_string(), value);
            Ok(())
        }
        Value::List(list) => {
            let i = parse_index(prop, index)?;
            let mut list = list.write();
            let len = list.items.len();
            if i < len {
                list.items[i] = value;
            } else if auto_grow && can_grow(&mut list.items, i) {
                list.items.resize(i, Value::Null);
                list.items.push(value);
            } else {
                return Err(ReflectionError::IndexOutOfRange {
                    property: container_name(prop).to_string(),
                    index: i,
                    len,
                });
            }
            Ok(())
        }
        Value::Array(array) => {
            let i = parse_index(prop, index)?;
            let element_type = array.read().element_type.clone();
            let found = value.type_name();
            let value = element_type.coerce(value).ok_or_else(|| {
                ReflectionError::navigation(
                    prop.indexed_name(),
                    format!("cannot store {} in an array of {}", found, element_type),
                )
            })?;
            let mut array = array.write();
            let len = array.items.len();
            match array.items.get_mut(i) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(ReflectionError::IndexOutOfRange {
                    property: container_name(prop).to_string(),
                    index: i,
                    len,
                }),
            }
        }
        other => Err(ReflectionError::navigation(
            prop.indexed_name(),
            format!(
                "'{}' is a {}, not a list, array or map",
                container_name(prop),
                other.type_name()
            ),
        )),
    }
}

/// Element type addressed by indexing a value of `ty`
pub(crate) fn element_of(ty: &TypeRef) -> Option<TypeRef> {
    match ty {
        TypeRef::Collection { .. } | TypeRef::Map { .. } | TypeRef::Array(_) => {
            ty.element_type().cloned()
        }
        _ => None,
    }
}

/// Type of the value to create for `prop`, given the declared type of the
/// property it names
pub(crate) fn vivified_type(declared: TypeRef, prop: &PropertyTokenizer<'_>) -> ReflectionResult<TypeRef> {
    if prop.index().is_none() {
        return Ok(declared);
    }
    element_of(&declared).ok_or_else(|| {
        ReflectionError::navigation(
            prop.indexed_name(),
            format!("element type of '{}' ({}) is not declared", container_name(prop), declared),
        )
    })
}

/// Create an intermediate value of `ty` with the configured object factory
pub(crate) fn instantiate(ctx: &MetaContext, ty: &TypeRef, path: &str) -> ReflectionResult<Value> {
    match ty {
        TypeRef::Bean(_) | TypeRef::Collection { .. } | TypeRef::Map { .. } => {
            log::trace!("Creating {} for '{}'", ty, path);
            ctx.object_factory().create(ty).map_err(|err| {
                ReflectionError::navigation(path, format!("cannot create {}: {}", ty, err))
            })
        }
        other => Err(ReflectionError::navigation(
            path,
            format!("cannot create an intermediate value of type {}", other),
        )),
    }
}
