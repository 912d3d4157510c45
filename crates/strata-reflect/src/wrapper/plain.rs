use crate::error::{ReflectionError, ReflectionResult};
use crate::property::PropertyTokenizer;
use crate::types::TypeRef;
use crate::value::Value;

use super::ObjectWrapper;

/// Wrapper over a null value: every read yields null, writes fail
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWrapper;

impl ObjectWrapper for NullWrapper {
    fn get(&self, _prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        Ok(Value::Null)
    }

    fn set(&self, prop: &PropertyTokenizer<'_>, _value: Value) -> ReflectionResult<()> {
        Err(ReflectionError::navigation(
            prop.indexed_name(),
            "cannot set a property of a null object",
        ))
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

    fn setter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        Err(ReflectionError::no_setter("null", name))
    }

    fn getter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        Err(ReflectionError::no_getter("null", name))
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
            "cannot create a property of a null object",
        ))
    }

    fn is_collection(&self) -> bool {
        false
    }

    fn add(&self, _element: Value) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add", "null"))
    }

    fn add_all(&self, _elements: Vec<Value>) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add_all", "null"))
    }
}

/// Wrapper over a boolean, number or string. Scalars have no properties.
pub struct ScalarWrapper {
    type_name: String,
}

impl ScalarWrapper {
    /// Wrap a scalar value
    pub fn new(value: &Value) -> Self {
        Self {
            type_name: value.type_name(),
        }
    }
}

impl ObjectWrapper for ScalarWrapper {
    fn get(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        Err(ReflectionError::no_getter(&self.type_name, prop.name()))
    }

    fn set(&self, prop: &PropertyTokenizer<'_>, _value: Value) -> ReflectionResult<()> {
        Err(ReflectionError::no_setter(&self.type_name, prop.name()))
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

    fn setter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        Err(ReflectionError::no_setter(&self.type_name, name))
    }

    fn getter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        Err(ReflectionError::no_getter(&self.type_name, name))
    }

    fn has_setter(&self, _name: &str) -> bool {
        false
    }

    fn has_getter(&self, _name: &str) -> bool {
        false
    }

    fn instantiate_property_value(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        Err(ReflectionError::no_setter(&self.type_name, prop.name()))
    }

    fn is_collection(&self) -> bool {
        false
    }

    fn add(&self, _element: Value) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add", self.type_name.clone()))
    }

    fn add_all(&self, _elements: Vec<Value>) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add_all", self.type_name.clone()))
    }
}
