use crate::error::{ReflectionError, ReflectionResult};
use crate::meta_object::MetaContext;
use crate::property::PropertyTokenizer;
use crate::types::TypeRef;
use crate::value::Value;

use super::{read_indexed, write_indexed, ObjectWrapper};

/// Wrapper over a list, set or array.
///
/// Only indexed access to the wrapped container itself (`"[2]"`) and
/// appending are supported; collections have no named properties.
pub struct CollectionWrapper {
    collection: Value,
    ctx: MetaContext,
}

impl CollectionWrapper {
    /// Wrap a list, set or array value
    pub fn new(collection: Value, ctx: MetaContext) -> Self {
        debug_assert!(matches!(
            collection,
            Value::List(_) | Value::Set(_) | Value::Array(_)
        ));
        Self { collection, ctx }
    }

    fn describe(&self) -> String {
        self.collection.type_name()
    }

    fn check_indexed(&self, prop: &PropertyTokenizer<'_>, operation: &'static str) -> ReflectionResult<()> {
        if prop.name().is_empty() && prop.index().is_some() {
            Ok(())
        } else {
            Err(ReflectionError::unsupported(operation, self.describe()))
        }
    }
}

impl ObjectWrapper for CollectionWrapper {
    fn get(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        self.check_indexed(prop, "get")?;
        read_indexed(&self.collection, prop)
    }

    fn set(&self, prop: &PropertyTokenizer<'_>, value: Value) -> ReflectionResult<()> {
        self.check_indexed(prop, "set")?;
        write_indexed(&self.collection, prop, value, self.ctx.auto_grow_collections())
    }

    fn find_property(&self, _name: &str, _use_camel_case_mapping: bool) -> Option<String> {
        None
    }

    fn getter_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn setter_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn setter_type(&self, _name: &str) -> ReflectionResult<TypeRef> {
        Err(ReflectionError::unsupported("setter_type", self.describe()))
    }

    fn getter_type(&self, _name: &str) -> ReflectionResult<TypeRef> {
        Err(ReflectionError::unsupported("getter_type", self.describe()))
    }

    fn has_setter(&self, _name: &str) -> bool {
        false
    }

    fn has_getter(&self, _name: &str) -> bool {
        false
    }

    fn instantiate_property_value(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        Err(ReflectionError::navigation(
            prop.indexed_name(),
            "a collection has no properties to create",
        ))
    }

    fn is_collection(&self) -> bool {
        true
    }

    fn add(&self, element: Value) -> ReflectionResult<()> {
        match &self.collection {
            Value::List(list) => list.write().items.push(element),
            Value::Set(set) => {
                set.write().insert(element);
            }
            _ => return Err(ReflectionError::unsupported("add", self.describe())),
        }
        Ok(())
    }

    fn add_all(&self, elements: Vec<Value>) -> ReflectionResult<()> {
        match &self.collection {
            Value::List(list) => list.write().items.extend(elements),
            Value::Set(set) => {
                let mut set = set.write();
                for element in elements {
                    set.insert(element);
                }
            }
            _ => return Err(ReflectionError::unsupported("add_all", self.describe())),
        }
        Ok(())
    }
}
