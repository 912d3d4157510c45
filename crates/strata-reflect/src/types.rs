//! Declared types
//!
//! `TypeRef` describes the declared type of a field, accessor parameter or
//! return value. Collection element types are informational: assignability
//! only looks at the container kind, the way erased generics behave.

use std::fmt;

use crate::class::ClassRef;
use crate::value::Value;

/// Abstract collection kinds, from most to least general
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    /// Anything that can be iterated
    Iterable,
    /// Sized collection
    Collection,
    /// Ordered sequence with index access
    List,
    /// Unique elements, no ordering guarantee
    Set,
    /// Unique elements kept in order
    SortedSet,
}

impl CollectionKind {
    /// Check whether a collection of kind `other` can be stored where `self` is declared
    pub fn is_assignable_from(self, other: CollectionKind) -> bool {
        use CollectionKind::*;
        match (self, other) {
            (a, b) if a == b => true,
            (Iterable, _) | (Collection, _) => true,
            (Set, SortedSet) => true,
            _ => false,
        }
    }

    /// Type name used in messages
    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::Iterable => "Iterable",
            CollectionKind::Collection => "Collection",
            CollectionKind::List => "List",
            CollectionKind::Set => "Set",
            CollectionKind::SortedSet => "SortedSet",
        }
    }
}

/// Declared type of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// No value (method return only)
    Void,
    /// Any value, the root object type
    Any,
    /// Primitive boolean
    Bool,
    /// Primitive 32-bit integer
    Int,
    /// Primitive 64-bit integer
    Long,
    /// Primitive double
    Double,
    /// String
    Str,
    /// Instance of a class (or any subclass)
    Bean(ClassRef),
    /// Collection of the given kind
    Collection {
        /// Collection kind
        kind: CollectionKind,
        /// Declared element type, when known
        element: Option<Box<TypeRef>>,
    },
    /// String-keyed map
    Map {
        /// Declared value type, when known
        value: Option<Box<TypeRef>>,
    },
    /// Fixed-length array
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// Bean type for a class
    pub fn bean(class: &ClassRef) -> Self {
        TypeRef::Bean(class.clone())
    }

    /// Collection type without a declared element type
    pub fn collection(kind: CollectionKind) -> Self {
        TypeRef::Collection {
            kind,
            element: None,
        }
    }

    /// Collection type with a declared element type
    pub fn collection_of(kind: CollectionKind, element: TypeRef) -> Self {
        TypeRef::Collection {
            kind,
            element: Some(Box::new(element)),
        }
    }

    /// `List` without element type
    pub fn list() -> Self {
        Self::collection(CollectionKind::List)
    }

    /// `List<element>`
    pub fn list_of(element: TypeRef) -> Self {
        Self::collection_of(CollectionKind::List, element)
    }

    /// `Map` without value type
    pub fn map() -> Self {
        TypeRef::Map { value: None }
    }

    /// `Map<String, value>`
    pub fn map_of(value: TypeRef) -> Self {
        TypeRef::Map {
            value: Some(Box::new(value)),
        }
    }

    /// `element[]`
    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// Primitive types cannot hold null
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeRef::Bool | TypeRef::Int | TypeRef::Long | TypeRef::Double
        )
    }

    /// Declared element type of a collection, value type of a map, or array component
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Collection { element, .. } => element.as_deref(),
            TypeRef::Map { value } => value.as_deref(),
            TypeRef::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Class of a bean type
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            TypeRef::Bean(class) => Some(class),
            _ => None,
        }
    }

    /// Check whether a value of declared type `other` can be stored where `self` is declared
    pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
        match (self, other) {
            (TypeRef::Any, other) => *other != TypeRef::Void,
            (TypeRef::Bean(target), TypeRef::Bean(source)) => source.is_subclass_of(target),
            (TypeRef::Collection { kind: a, .. }, TypeRef::Collection { kind: b, .. }) => {
                a.is_assignable_from(*b)
            }
            (TypeRef::Map { .. }, TypeRef::Map { .. }) => true,
            (TypeRef::Array(a), TypeRef::Array(b)) => a.is_assignable_from(b),
            (a, b) => a == b,
        }
    }

    /// Convert `value` for storage into a slot of this type.
    ///
    /// Applies numeric widening (`Int` to `Long`/`Double`, `Long` to
    /// `Double`). Returns `None` when the value is not acceptable.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (TypeRef::Void, _) => None,
            (ty, Value::Null) => (!ty.is_primitive()).then_some(Value::Null),
            (TypeRef::Long, Value::Int(i)) => Some(Value::Long(i as i64)),
            (TypeRef::Double, Value::Int(i)) => Some(Value::Double(i as f64)),
            (TypeRef::Double, Value::Long(l)) => Some(Value::Double(l as f64)),
            (ty, value) => ty.is_assignable_from(&value.type_ref()).then_some(value),
        }
    }

    /// Check whether `value` could be stored into a slot of this type
    pub fn accepts(&self, value: &Value) -> bool {
        self.coerce(value.clone()).is_some()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Any => f.write_str("Object"),
            TypeRef::Bool => f.write_str("boolean"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Long => f.write_str("long"),
            TypeRef::Double => f.write_str("double"),
            TypeRef::Str => f.write_str("String"),
            TypeRef::Bean(class) => f.write_str(class.name()),
            TypeRef::Collection { kind, element } => match element {
                Some(element) => write!(f, "{}<{}>", kind.name(), element),
                None => f.write_str(kind.name()),
            },
            TypeRef::Map { value } => match value {
                Some(value) => write!(f, "Map<String, {}>", value),
                None => f.write_str("Map"),
            },
            TypeRef::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// Join types for signatures and messages
pub(crate) fn join_types(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
