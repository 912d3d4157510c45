use crate::error::{ReflectionError, ReflectionResult};
use crate::meta_object::{MetaContext, MetaObject};
use crate::property::PropertyTokenizer;
use crate::types::TypeRef;
use crate::value::{MapRef, Value};

use super::{instantiate, read_indexed, vivified_type, write_indexed, ObjectWrapper};

/// Wrapper over a string-keyed map. Every key is a property.
pub struct MapWrapper {
    map: MapRef,
    ctx: MetaContext,
}

impl MapWrapper {
    /// Wrap `map`
    pub fn new(map: MapRef, ctx: MetaContext) -> Self {
        Self { map, ctx }
    }

    fn entry(&self, key: &str) -> Value {
        self.map.read().entries.get(key).cloned().unwrap_or_default()
    }

    /// Container addressed by an indexed segment: the named entry, or the
    /// map itself for a bare `[key]`
    fn container(&self, prop: &PropertyTokenizer<'_>) -> Value {
        if prop.name().is_empty() {
            Value::Map(self.map.clone())
        } else {
            self.entry(prop.name())
        }
    }

    fn declared_value_type(&self) -> Option<TypeRef> {
        self.map.read().value_type.clone()
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.map.read().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn property_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        let prop = PropertyTokenizer::new(name);
        if let Some(children) = prop.children() {
            let child = self.get(&prop)?;
            if child.is_null() {
                return Ok(TypeRef::Any);
            }
            return MetaObject::with_context(child, self.ctx.clone()).getter_type(children);
        }
        let value = self.get(&prop)?;
        if !value.is_null() {
            return Ok(value.type_ref());
        }
        Ok(self.declared_value_type().unwrap_or(TypeRef::Any))
    }
}

impl ObjectWrapper for MapWrapper {
    fn get(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        match prop.index() {
            Some(_) => read_indexed(&self.container(prop), prop),
            None => Ok(self.entry(prop.name())),
        }
    }

    fn set(&self, prop: &PropertyTokenizer<'_>, value: Value) -> ReflectionResult<()> {
        if prop.index().is_none() {
            self.map
                .write()
                .entries
                .insert(prop.name().to_string(), value);
            return Ok(());
        }
        let container = self.container(prop);
        if !container.is_null() {
            return write_indexed(&container, prop, value, self.ctx.auto_grow_collections());
        }
        let declared = self.declared_value_type().ok_or_else(|| {
            ReflectionError::navigation(prop.indexed_name(), "map does not declare a value type")
        })?;
        let container = instantiate(&self.ctx, &declared, prop.indexed_name())?;
        write_indexed(&container, prop, value, self.ctx.auto_grow_collections())?;
        self.map
            .write()
            .entries
            .insert(prop.name().to_string(), container);
        Ok(())
    }

    fn find_property(&self, name: &str, _use_camel_case_mapping: bool) -> Option<String> {
        Some(name.to_string())
    }

    fn getter_names(&self) -> Vec<String> {
        self.keys()
    }

    fn setter_names(&self) -> Vec<String> {
        self.keys()
    }

    fn setter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        self.property_type(name)
    }

    fn getter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        self.property_type(name)
    }

    fn has_setter(&self, _name: &str) -> bool {
        true
    }

    fn has_getter(&self, name: &str) -> bool {
        let prop = PropertyTokenizer::new(name);
        if !self.map.read().entries.contains_key(prop.name()) {
            return false;
        }
        let Some(children) = prop.children() else {
            return true;
        };
        match self.get(&prop) {
            Ok(Value::Null) => true,
            Ok(child) => MetaObject::with_context(child, self.ctx.clone()).has_getter(children),
            Err(_) => false,
        }
    }

    fn instantiate_property_value(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        let declared = self.declared_value_type().ok_or_else(|| {
            ReflectionError::navigation(prop.indexed_name(), "map does not declare a value type")
        })?;
        let ty = vivified_type(declared, prop)?;
        instantiate(&self.ctx, &ty, prop.indexed_name())
    }

    fn is_collection(&self) -> bool {
        false
    }

    fn add(&self, _element: Value) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add", "a map"))
    }

    fn add_all(&self, _elements: Vec<Value>) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add_all", "a map"))
    }
}
