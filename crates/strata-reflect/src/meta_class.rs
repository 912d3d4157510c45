//! Class-level property paths
//!
//! `MetaClass` answers questions about property paths without an instance:
//! which names exist, what types they have and how they are spelled. Nested
//! segments descend through the declared getter types.

use std::sync::Arc;

use crate::class::ClassRef;
use crate::error::{Accessor, ReflectionError, ReflectionResult};
use crate::invoker::Invoker;
use crate::property::PropertyTokenizer;
use crate::reflector::Reflector;
use crate::reflector_factory::ReflectorFactory;
use crate::types::TypeRef;
use crate::wrapper::element_of;

/// Property metadata of a class, navigable by path
#[derive(Clone)]
pub struct MetaClass {
    reflector: Arc<Reflector>,
    reflector_factory: Arc<dyn ReflectorFactory>,
}

impl MetaClass {
    /// Meta class for `class`
    pub fn for_class(class: &ClassRef, reflector_factory: Arc<dyn ReflectorFactory>) -> Self {
        let reflector = reflector_factory.find_for_class(class);
        Self {
            reflector,
            reflector_factory,
        }
    }

    /// Described class
    pub fn class(&self) -> &ClassRef {
        self.reflector.class()
    }

    /// Underlying reflector
    pub fn reflector(&self) -> &Arc<Reflector> {
        &self.reflector
    }

    /// Meta class of the declared getter type of `name`
    pub fn meta_class_for_property(&self, name: &str) -> ReflectionResult<MetaClass> {
        let prop = PropertyTokenizer::new(name);
        let ty = self.segment_type(&prop, Accessor::Getter)?;
        match ty.as_class() {
            Some(class) => Ok(MetaClass::for_class(class, self.reflector_factory.clone())),
            None => Err(ReflectionError::navigation(
                name,
                format!("'{}' is a {}, not a class", prop.name(), ty),
            )),
        }
    }

    /// Canonical spelling of a (possibly nested) property name.
    ///
    /// With `use_camel_case_mapping`, underscores are ignored so that
    /// `user_name` finds `userName`. Indices are dropped from the result.
    pub fn find_property(&self, name: &str, use_camel_case_mapping: bool) -> Option<String> {
        let name = if use_camel_case_mapping {
            name.replace('_', "")
        } else {
            name.to_string()
        };
        let mut found = String::new();
        self.build_property(&name, &mut found)?;
        Some(found)
    }

    fn build_property(&self, name: &str, out: &mut String) -> Option<()> {
        let prop = PropertyTokenizer::new(name);
        let property = self.reflector.find_property_name(prop.name())?;
        out.push_str(property);
        if let Some(children) = prop.children() {
            out.push('.');
            let child = self.meta_class_for_property(property).ok()?;
            child.build_property(children, out)?;
        }
        Some(())
    }

    /// Readable property names
    pub fn getter_names(&self) -> &[String] {
        self.reflector.readable_property_names()
    }

    /// Writable property names
    pub fn setter_names(&self) -> &[String] {
        self.reflector.writable_property_names()
    }

    /// Declared type read at a (possibly nested) path
    pub fn getter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        self.path_type(name, Accessor::Getter)
    }

    /// Declared type written at a (possibly nested) path
    pub fn setter_type(&self, name: &str) -> ReflectionResult<TypeRef> {
        self.path_type(name, Accessor::Setter)
    }

    /// Whether a (possibly nested) path can be read
    pub fn has_getter(&self, name: &str) -> bool {
        self.getter_type(name).is_ok()
    }

    /// Whether a (possibly nested) path can be written
    pub fn has_setter(&self, name: &str) -> bool {
        self.setter_type(name).is_ok()
    }

    /// Getter invoker of a direct property
    pub fn get_get_invoker(&self, name: &str) -> ReflectionResult<&Invoker> {
        self.reflector.get_get_invoker(name)
    }

    /// Setter invoker of a direct property
    pub fn get_set_invoker(&self, name: &str) -> ReflectionResult<&Invoker> {
        self.reflector.get_set_invoker(name)
    }

    /// Whether the class can be created without arguments
    pub fn has_default_constructor(&self) -> bool {
        self.reflector.has_default_constructor()
    }

    fn path_type(&self, name: &str, accessor: Accessor) -> ReflectionResult<TypeRef> {
        let prop = PropertyTokenizer::new(name);
        let Some(children) = prop.children() else {
            return self.segment_type(&prop, accessor);
        };
        if accessor == Accessor::Setter && !self.reflector.has_setter(prop.name()) {
            return Err(ReflectionError::no_setter(self.class().name(), prop.name()));
        }
        let ty = self.segment_type(&prop, Accessor::Getter)?;
        type_below(ty, children, accessor, &self.reflector_factory)
    }

    /// Type of one segment, narrowed to the element type when indexed
    fn segment_type(&self, prop: &PropertyTokenizer<'_>, accessor: Accessor) -> ReflectionResult<TypeRef> {
        let ty = match accessor {
            Accessor::Getter => self.reflector.getter_type(prop.name())?,
            Accessor::Setter => self.reflector.setter_type(prop.name())?,
        };
        Ok(indexed(ty, prop))
    }
}

impl std::fmt::Debug for MetaClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MetaClass({})", self.class().name())
    }
}

fn indexed(ty: &TypeRef, prop: &PropertyTokenizer<'_>) -> TypeRef {
    match prop.index() {
        Some(_) => match ty {
            TypeRef::Collection { .. } | TypeRef::Map { .. } | TypeRef::Array(_) => {
                element_of(ty).unwrap_or(TypeRef::Any)
            }
            other => other.clone(),
        },
        None => ty.clone(),
    }
}

/// Type at `path` below a value declared as `ty`
fn type_below(
    ty: TypeRef,
    path: &str,
    accessor: Accessor,
    reflector_factory: &Arc<dyn ReflectorFactory>,
) -> ReflectionResult<TypeRef> {
    match ty {
        TypeRef::Bean(class) => {
            MetaClass::for_class(&class, reflector_factory.clone()).path_type(path, accessor)
        }
        TypeRef::Map { value } => {
            let prop = PropertyTokenizer::new(path);
            let value = value.map_or(TypeRef::Any, |v| *v);
            let value = indexed(&value, &prop);
            match prop.children() {
                Some(children) => type_below(value, children, accessor, reflector_factory),
                None => Ok(value),
            }
        }
        other => Err(ReflectionError::navigation(
            path,
            format!("a value of type {} has no properties", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBuilder;
    use crate::reflector_factory::DefaultReflectorFactory;

    fn model() -> ClassRef {
        let address = ClassBuilder::new("Address")
            .property("city", TypeRef::Str)
            .property("zipCode", TypeRef::Str)
            .build();
        let line = ClassBuilder::new("OrderLine")
            .property("quantity", TypeRef::Int)
            .build();
        ClassBuilder::new("Customer")
            .property("name", TypeRef::Str)
            .property("homeAddress", TypeRef::bean(&address))
            .property("lines", TypeRef::list_of(TypeRef::bean(&line)))
            .property("attributes", TypeRef::map_of(TypeRef::Long))
            .method("getAge", vec![], TypeRef::Int, |_, _| Ok(crate::value::Value::Int(30)))
            .build()
    }

    fn meta() -> MetaClass {
        MetaClass::for_class(&model(), Arc::new(DefaultReflectorFactory::new()))
    }

    #[test]
    fn test_find_property_nested() {
        let meta = meta();
        assert_eq!(meta.find_property("NAME", false).as_deref(), Some("name"));
        assert_eq!(
            meta.find_property("homeaddress.ZIPCODE", false).as_deref(),
            Some("homeAddress.zipCode")
        );
        assert_eq!(meta.find_property("missing", false), None);
        assert_eq!(meta.find_property("homeAddress.missing", false), None);
    }

    #[test]
    fn test_find_property_camel_case() {
        let meta = meta();
        assert_eq!(meta.find_property("home_address", false), None);
        assert_eq!(
            meta.find_property("home_address.zip_code", true).as_deref(),
            Some("homeAddress.zipCode")
        );
    }

    #[test]
    fn test_nested_types() {
        let meta = meta();
        assert_eq!(meta.getter_type("homeAddress.city").unwrap(), TypeRef::Str);
        assert_eq!(meta.getter_type("lines[0].quantity").unwrap(), TypeRef::Int);
        assert_eq!(meta.getter_type("attributes.visits").unwrap(), TypeRef::Long);
        assert!(meta.getter_type("name.length").is_err());
        assert_eq!(meta.setter_type("lines").unwrap().to_string(), "List<OrderLine>");
        assert_eq!(meta.setter_type("lines[1]").unwrap().to_string(), "OrderLine");
    }

    #[test]
    fn test_has_getter_and_setter() {
        let meta = meta();
        assert!(meta.has_getter("age"));
        assert!(!meta.has_setter("age"));
        assert!(meta.has_getter("homeAddress.city"));
        assert!(meta.has_setter("homeAddress.city"));
        assert!(!meta.has_getter("homeAddress.country"));
        assert!(!meta.has_setter("age.value"));
    }

    #[test]
    fn test_meta_class_for_property() {
        let meta = meta();
        let address = meta.meta_class_for_property("homeAddress").unwrap();
        assert_eq!(address.class().name(), "Address");
        assert_eq!(address.getter_names(), ["city", "zipCode"]);
        assert!(meta.meta_class_for_property("name").is_err());
    }

    #[test]
    fn test_default_constructor() {
        assert!(meta().has_default_constructor());
    }
}
