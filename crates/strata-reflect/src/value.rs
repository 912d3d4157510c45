//! Value model
//!
//! `Value` is the tagged union every accessor reads and writes. Scalars are
//! stored inline; objects and containers are shared handles, so writing
//! through a child obtained from a parent mutates the parent's graph.
//!
//! Equality, hashing and ordering are total: doubles compare by their
//! IEEE total order and shared handles compare by identity. This lets any
//! value be an element of a set.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::class::ClassRef;
use crate::types::{CollectionKind, TypeRef};

/// Shared, lockable handle with identity semantics
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    /// Lock for reading
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Lock for reading unless a writer holds the lock
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
        self.0.try_read()
    }

    /// Lock for writing
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address used for identity hashing and ordering
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.addr())
    }
}

/// Instance of a runtime class
#[derive(Debug, Clone)]
pub struct Object {
    class: ClassRef,
    slots: Vec<Value>,
}

impl Object {
    /// Create an instance with default slot values
    pub fn new(class: ClassRef) -> Self {
        let slots = class.default_slots();
        Self { class, slots }
    }

    /// Class of this instance
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Read a slot
    pub fn slot(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    /// Write a slot
    pub fn set_slot(&mut self, index: usize, value: Value) -> Result<(), String> {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(format!(
                "Slot index {} out of bounds (object has {} slots)",
                index,
                self.slots.len()
            )),
        }
    }

    /// Read a field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        let slot = self.class.field(field)?.slot;
        self.slots.get(slot)
    }

    /// Write a field by name, bypassing accessors
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), String> {
        let slot = self
            .class
            .field(field)
            .ok_or_else(|| format!("'{}' has no field '{}'", self.class.name(), field))?
            .slot;
        self.set_slot(slot, value)
    }
}

/// Contents of a map value
#[derive(Debug, Clone, Default)]
pub struct MapData {
    /// Entries
    pub entries: FxHashMap<String, Value>,
    /// Declared value type, used to create missing entries
    pub value_type: Option<TypeRef>,
}

/// Contents of a list value
#[derive(Debug, Clone, Default)]
pub struct ListData {
    /// Elements in insertion order
    pub items: Vec<Value>,
    /// Declared element type
    pub element_type: Option<TypeRef>,
}

/// Set storage
#[derive(Debug, Clone)]
pub enum SetItems {
    /// No ordering guarantee
    Unordered(FxHashSet<Value>),
    /// Kept in value order
    Sorted(BTreeSet<Value>),
}

/// Contents of a set value
#[derive(Debug, Clone)]
pub struct SetData {
    /// Elements
    pub items: SetItems,
    /// Declared element type
    pub element_type: Option<TypeRef>,
}

impl SetData {
    /// Empty unordered set
    pub fn unordered(element_type: Option<TypeRef>) -> Self {
        Self {
            items: SetItems::Unordered(FxHashSet::default()),
            element_type,
        }
    }

    /// Empty sorted set
    pub fn sorted(element_type: Option<TypeRef>) -> Self {
        Self {
            items: SetItems::Sorted(BTreeSet::new()),
            element_type,
        }
    }

    /// Whether elements are kept sorted
    pub fn is_sorted(&self) -> bool {
        matches!(self.items, SetItems::Sorted(_))
    }

    /// Insert an element; returns false if it was already present
    pub fn insert(&mut self, value: Value) -> bool {
        match &mut self.items {
            SetItems::Unordered(items) => items.insert(value),
            SetItems::Sorted(items) => items.insert(value),
        }
    }

    /// Membership test
    pub fn contains(&self, value: &Value) -> bool {
        match &self.items {
            SetItems::Unordered(items) => items.contains(value),
            SetItems::Sorted(items) => items.contains(value),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match &self.items {
            SetItems::Unordered(items) => items.len(),
            SetItems::Sorted(items) => items.len(),
        }
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements as a vector (sorted sets keep their order)
    pub fn to_vec(&self) -> Vec<Value> {
        match &self.items {
            SetItems::Unordered(items) => items.iter().cloned().collect(),
            SetItems::Sorted(items) => items.iter().cloned().collect(),
        }
    }
}

/// Contents of an array value
#[derive(Debug, Clone)]
pub struct ArrayData {
    /// Fixed-length elements
    pub items: Vec<Value>,
    /// Component type
    pub element_type: TypeRef,
}

/// Shared object instance
pub type ObjectRef = Shared<Object>;
/// Shared map
pub type MapRef = Shared<MapData>;
/// Shared list
pub type ListRef = Shared<ListData>;
/// Shared set
pub type SetRef = Shared<SetData>;
/// Shared array
pub type ArrayRef = Shared<ArrayData>;

/// Dynamically typed value
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Double
    Double(f64),
    /// String
    Str(String),
    /// Class instance
    Object(ObjectRef),
    /// String-keyed map
    Map(MapRef),
    /// Ordered sequence
    List(ListRef),
    /// Unique elements
    Set(SetRef),
    /// Fixed-length array
    Array(ArrayRef),
}

impl Value {
    /// New instance of `class` with default slots
    pub fn object(class: &ClassRef) -> Self {
        Value::Object(ObjectRef::new(Object::new(class.clone())))
    }

    /// New list holding `items`
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListRef::new(ListData {
            items,
            element_type: None,
        }))
    }

    /// New map holding `entries`
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(MapRef::new(MapData {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            value_type: None,
        }))
    }

    /// New array of `element_type` holding `items`
    pub fn array(element_type: TypeRef, items: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(ArrayData {
            items,
            element_type,
        }))
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload (`Int` only)
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integer payload (`Int` or `Long`)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i as i64),
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Numeric payload as double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Long(l) => Some(*l as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Object handle
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Map handle
    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// List handle
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Set handle
    pub fn as_set(&self) -> Option<&SetRef> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Array handle
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Runtime type of this value (`Any` for null)
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Value::Null => TypeRef::Any,
            Value::Bool(_) => TypeRef::Bool,
            Value::Int(_) => TypeRef::Int,
            Value::Long(_) => TypeRef::Long,
            Value::Double(_) => TypeRef::Double,
            Value::Str(_) => TypeRef::Str,
            Value::Object(o) => TypeRef::Bean(o.read().class().clone()),
            Value::Map(m) => TypeRef::Map {
                value: m.read().value_type.clone().map(Box::new),
            },
            Value::List(l) => TypeRef::Collection {
                kind: CollectionKind::List,
                element: l.read().element_type.clone().map(Box::new),
            },
            Value::Set(s) => {
                let set = s.read();
                let kind = if set.is_sorted() {
                    CollectionKind::SortedSet
                } else {
                    CollectionKind::Set
                };
                TypeRef::Collection {
                    kind,
                    element: set.element_type.clone().map(Box::new),
                }
            }
            Value::Array(a) => TypeRef::Array(Box::new(a.read().element_type.clone())),
        }
    }

    /// Short type name for messages
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            other => other.type_ref().to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Long(_) => 3,
            Value::Double(_) => 4,
            Value::Str(_) => 5,
            Value::Object(_) => 6,
            Value::Map(_) => 7,
            Value::List(_) => 8,
            Value::Set(_) => 9,
            Value::Array(_) => 10,
        }
    }

    fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(o) => Some(o.addr()),
            Value::Map(m) => Some(m.addr()),
            Value::List(l) => Some(l.addr()),
            Value::Set(s) => Some(s.addr()),
            Value::Array(a) => Some(a.addr()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => self
                .rank()
                .cmp(&other.rank())
                .then_with(|| self.identity().cmp(&other.identity())),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Long(l) => l.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            other => other.identity().hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Long(l) => write!(f, "Long({})", l),
            Value::Double(d) => write!(f, "Double({})", d),
            Value::Str(s) => write!(f, "Str({:?})", s),
            // Shallow: object graphs may be cyclic, and the handle may be locked by the caller.
            Value::Object(o) => match o.try_read() {
                Some(obj) => write!(f, "Object({}@{:#x})", obj.class().name(), o.addr()),
                None => write!(f, "Object(<locked>@{:#x})", o.addr()),
            },
            Value::Map(m) => write!(f, "Map@{:#x}", m.addr()),
            Value::List(l) => write!(f, "List@{:#x}", l.addr()),
            Value::Set(s) => write!(f, "Set@{:#x}", s.addr()),
            Value::Array(a) => write!(f, "Array@{:#x}", a.addr()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Value::Long(l)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
