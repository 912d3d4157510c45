//! Path navigation over live values
//!
//! `MetaObject` reads and writes nested values through paths such as
//! `orders[0].customer.name`. Reads stop at the first null intermediate and
//! yield null. Writes create missing intermediates from their declared type;
//! a created value is attached to its parent only after the rest of the
//! path was written into it, so a failed write leaves the graph unchanged.

use std::sync::Arc;

use crate::error::{ReflectionError, ReflectionResult};
use crate::object_factory::{DefaultObjectFactory, ObjectFactory};
use crate::property::PropertyTokenizer;
use crate::reflector_factory::{DefaultReflectorFactory, ReflectorFactory};
use crate::types::TypeRef;
use crate::value::Value;
use crate::wrapper::{
    BeanWrapper, CollectionWrapper, DefaultObjectWrapperFactory, MapWrapper, NullWrapper,
    ObjectWrapper, ObjectWrapperFactory, ScalarWrapper,
};

/// Factories and switches shared by every meta object of one navigation
#[derive(Clone)]
pub struct MetaContext {
    object_factory: Arc<dyn ObjectFactory>,
    wrapper_factory: Arc<dyn ObjectWrapperFactory>,
    reflector_factory: Arc<dyn ReflectorFactory>,
    auto_grow_collections: bool,
}

impl MetaContext {
    /// Context over the given factories, without list auto-growth
    pub fn new(
        object_factory: Arc<dyn ObjectFactory>,
        wrapper_factory: Arc<dyn ObjectWrapperFactory>,
        reflector_factory: Arc<dyn ReflectorFactory>,
    ) -> Self {
        Self {
            object_factory,
            wrapper_factory,
            reflector_factory,
            auto_grow_collections: false,
        }
    }

    /// Let indexed writes past the end of a list grow it
    pub fn with_auto_grow_collections(mut self, enabled: bool) -> Self {
        self.auto_grow_collections = enabled;
        self
    }

    /// Factory for intermediate values
    pub fn object_factory(&self) -> &Arc<dyn ObjectFactory> {
        &self.object_factory
    }

    /// Factory for custom wrappers
    pub fn wrapper_factory(&self) -> &Arc<dyn ObjectWrapperFactory> {
        &self.wrapper_factory
    }

    /// Reflector source
    pub fn reflector_factory(&self) -> &Arc<dyn ReflectorFactory> {
        &self.reflector_factory
    }

    /// Whether lists grow on out-of-range writes
    pub fn auto_grow_collections(&self) -> bool {
        self.auto_grow_collections
    }
}

impl Default for MetaContext {
    fn default() -> Self {
        Self::new(
            Arc::new(DefaultObjectFactory::new()),
            Arc::new(DefaultObjectWrapperFactory),
            Arc::new(DefaultReflectorFactory::new()),
        )
    }
}

/// Path-based accessor over one value
pub struct MetaObject {
    original: Value,
    wrapper: Box<dyn ObjectWrapper>,
    ctx: MetaContext,
}

impl MetaObject {
    /// Meta object over `object` using the given factories
    pub fn for_object(
        object: Value,
        object_factory: Arc<dyn ObjectFactory>,
        wrapper_factory: Arc<dyn ObjectWrapperFactory>,
        reflector_factory: Arc<dyn ReflectorFactory>,
    ) -> Self {
        Self::with_context(
            object,
            MetaContext::new(object_factory, wrapper_factory, reflector_factory),
        )
    }

    /// Meta object over `object` sharing an existing context
    pub fn with_context(object: Value, ctx: MetaContext) -> Self {
        let wrapper: Box<dyn ObjectWrapper> = match ctx.wrapper_factory.wrapper_for(&ctx, &object) {
            Some(custom) => custom,
            None => match &object {
                Value::Null => Box::new(NullWrapper),
                Value::Object(o) => Box::new(BeanWrapper::new(o.clone(), ctx.clone())),
                Value::Map(m) => Box::new(MapWrapper::new(m.clone(), ctx.clone())),
                Value::List(_) | Value::Set(_) | Value::Array(_) => {
                    Box::new(CollectionWrapper::new(object.clone(), ctx.clone()))
                }
                scalar => Box::new(ScalarWrapper::new(scalar)),
            },
        };
        Self {
            original: object,
            wrapper,
            ctx,
        }
    }

    /// Wrapped value
    pub fn original_object(&self) -> &Value {
        &self.original
    }

    /// Wrapper chosen for the value
    pub fn object_wrapper(&self) -> &dyn ObjectWrapper {
        self.wrapper.as_ref()
    }

    /// Context shared with child meta objects
    pub fn context(&self) -> &MetaContext {
        &self.ctx
    }

    /// True when wrapping null
    pub fn is_null(&self) -> bool {
        self.original.is_null()
    }

    fn child(&self, value: Value) -> MetaObject {
        MetaObject::with_context(value, self.ctx.clone())
    }

    fn no_children(&self, path: &str) -> ReflectionError {
        ReflectionError::navigation(
            path,
            format!("{} has no properties below an index", self.original.type_name()),
        )
    }

    /// Read the value at `name`. A null intermediate makes the whole path
    /// read as null.
    pub fn get_value(&self, name: &str) -> ReflectionResult<Value> {
        let prop = PropertyTokenizer::new(name);
        let Some(children) = prop.children() else {
            return self.wrapper.get(&prop);
        };
        if self.wrapper.is_collection() {
            return Err(self.no_children(name));
        }
        let value = self.wrapper.get(&prop)?;
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.child(value).get_value(children)
    }

    /// Write `value` at `name`, creating missing intermediates.
    ///
    /// Writing null through a missing intermediate creates nothing.
    pub fn set_value(&self, name: &str, value: Value) -> ReflectionResult<()> {
        let prop = PropertyTokenizer::new(name);
        let Some(children) = prop.children() else {
            return self.wrapper.set(&prop, value);
        };
        if self.wrapper.is_collection() {
            return Err(self.no_children(name));
        }
        let current = self.wrapper.get(&prop)?;
        if !current.is_null() {
            return self.child(current).set_value(children, value);
        }
        if value.is_null() {
            return Ok(());
        }
        let created = self.wrapper.instantiate_property_value(&prop)?;
        self.child(created.clone()).set_value(children, value)?;
        self.wrapper.set(&prop, created)
    }

    /// Meta object over the value at `name`
    pub fn meta_object_for_property(&self, name: &str) -> ReflectionResult<MetaObject> {
        let value = self.get_value(name)?;
        Ok(self.child(value))
    }

    /// Canonical spelling of a (possibly nested) property name
    pub fn find_property(&self, name: &str, use_camel_case_mapping: bool) -> Option<String> {
        self.wrapper.find_property(name, use_camel_case_mapping)
    }

    /// Readable property names
    pub fn getter_names(&self) -> Vec<String> {
        self.wrapper.getter_names()
    }

    /// Writable property names
    pub fn setter_names(&self) -> Vec<String> {
        self.wrapper.setter_names()
    }

    /// Type accepted at `name`
    pub fn setter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        self.wrapper.setter_type(name)
    }

    /// Type read at `name`
    pub fn getter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        self.wrapper.getter_type(name)
    }

    /// Whether `name` can be written
    pub fn has_setter(&self, name: &str) -> bool {
        self.wrapper.has_setter(name)
    }

    /// Whether `name` can be read
    pub fn has_getter(&self, name: &str) -> bool {
        self.wrapper.has_getter(name)
    }

    /// True when wrapping a collection or array
    pub fn is_collection(&self) -> bool {
        self.wrapper.is_collection()
    }

    /// Append to the wrapped collection
    pub fn add(&self, element: Value) -> ReflectionResult<()> {
        self.wrapper.add(element)
    }

    /// Append several elements to the wrapped collection
    pub fn add_all(&self, elements: Vec<Value>) -> ReflectionResult<()> {
        self.wrapper.add_all(elements)
    }
}

impl std::fmt::Debug for MetaObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaObject")
            .field("original", &self.original)
            .field("auto_grow_collections", &self.ctx.auto_grow_collections)
            .finish()
    }
}
