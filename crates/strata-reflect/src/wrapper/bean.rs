use crate::error::{ReflectionError, ReflectionResult};
use crate::meta_class::MetaClass;
use crate::meta_object::{MetaContext, MetaObject};
use crate::property::PropertyTokenizer;
use crate::types::TypeRef;
use crate::value::{ObjectRef, Value};

use super::{instantiate, read_indexed, vivified_type, write_indexed, ObjectWrapper};

/// Wrapper over a class instance, backed by the class reflector
pub struct BeanWrapper {
    object: ObjectRef,
    meta_class: MetaClass,
    ctx: MetaContext,
}

impl BeanWrapper {
    /// Wrap `object`
    pub fn new(object: ObjectRef, ctx: MetaContext) -> Self {
        let class = object.read().class().clone();
        let meta_class = MetaClass::for_class(&class, ctx.reflector_factory().clone());
        Self {
            object,
            meta_class,
            ctx,
        }
    }

    /// Class-level view of the wrapped instance
    pub fn meta_class(&self) -> &MetaClass {
        &self.meta_class
    }

    fn class_name(&self) -> &str {
        self.meta_class.class().name()
    }

    fn get_property(&self, name: &str) -> ReflectionResult<Value> {
        self.meta_class
            .get_get_invoker(name)?
            .invoke(&self.object, &[])
    }

    fn set_property(&self, name: &str, value: Value) -> ReflectionResult<()> {
        self.meta_class
            .get_set_invoker(name)?
            .invoke(&self.object, &[value])
            .map(|_| ())
    }

    fn require_name<'a>(&self, prop: &PropertyTokenizer<'a>) -> ReflectionResult<&'a str> {
        if prop.name().is_empty() {
            return Err(ReflectionError::navigation(
                prop.indexed_name(),
                format!("'{}' is not a list, array or map", self.class_name()),
            ));
        }
        Ok(prop.name())
    }

    /// Meta object over the value at `prop`, or `None` when it is null
    fn child(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Option<MetaObject>> {
        let value = self.get(prop)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(MetaObject::with_context(value, self.ctx.clone())))
    }
}

impl ObjectWrapper for BeanWrapper {
    fn get(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        let name = self.require_name(prop)?;
        let value = self.get_property(name)?;
        match prop.index() {
            Some(_) => read_indexed(&value, prop),
            None => Ok(value),
        }
    }

    fn set(&self, prop: &PropertyTokenizer<'_>, value: Value) -> ReflectionResult<()> {
        let name = self.require_name(prop)?;
        if prop.index().is_none() {
            return self.set_property(name, value);
        }
        let container = self.get_property(name)?;
        if !container.is_null() {
            return write_indexed(&container, prop, value, self.ctx.auto_grow_collections());
        }
        let declared = self.meta_class.setter_type(name)?;
        let container = instantiate(&self.ctx, &declared, prop.indexed_name())?;
        write_indexed(&container, prop, value, self.ctx.auto_grow_collections())?;
        self.set_property(name, container)
    }

    fn find_property(&self, name: &str, use_camel_case_mapping: bool) -> Option<String> {
        self.meta_class.find_property(name, use_camel_case_mapping)
    }

    fn getter_names(&self) -> Vec<String> {
        self.meta_class.getter_names().to_vec()
    }

    fn setter_names(&self) -> Vec<String> {
        self.meta_class.setter_names().to_vec()
    }

    fn setter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        let prop = PropertyTokenizer::new(name);
        match prop.children() {
            Some(children) => match self.child(&prop)? {
                Some(child) => child.setter_type(children),
                None => self.meta_class.setter_type(name),
            },
            None => self.meta_class.setter_type(name),
        }
    }

    fn getter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        let prop = PropertyTokenizer::new(name);
        match prop.children() {
            Some(children) => match self.child(&prop)? {
                Some(child) => child.getter_type(children),
                None => self.meta_class.getter_type(name),
            },
            None => self.meta_class.getter_type(name),
        }
    }

    fn has_setter(&self, name: &str) -> bool {
        let prop = PropertyTokenizer::new(name);
        let Some(children) = prop.children() else {
            return self.meta_class.has_setter(name);
        };
        if !self.meta_class.has_setter(prop.indexed_name()) {
            return false;
        }
        match self.child(&prop) {
            Ok(Some(child)) => child.has_setter(children),
            Ok(None) => self.meta_class.has_setter(name),
            Err(_) => false,
        }
    }

    fn has_getter(&self, name: &str) -> bool {
        let prop = PropertyTokenizer::new(name);
        let Some(children) = prop.children() else {
            return self.meta_class.has_getter(name);
        };
        if !self.meta_class.has_getter(prop.indexed_name()) {
            return false;
        }
        match self.child(&prop) {
            Ok(Some(child)) => child.has_getter(children),
            Ok(None) => self.meta_class.has_getter(name),
            Err(_) => false,
        }
    }

    fn instantiate_property_value(&self, prop: &PropertyTokenizer<'_>) -> ReflectionResult<Value> {
        let name = self.require_name(prop)?;
        let declared = self.meta_class.setter_type(name)?;
        let ty = vivified_type(declared, prop)?;
        instantiate(&self.ctx, &ty, prop.indexed_name())
    }

    fn is_collection(&self) -> bool {
        false
    }

    fn add(&self, _element: Value) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add", self.class_name()))
    }

    fn add_all(&self, _elements: Vec<Value>) -> ReflectionResult<()> {
        Err(ReflectionError::unsupported("add_all", self.class_name()))
    }
}
