//! Reflector construction, caching and object creation

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use strata_reflect::{
    ClassBuilder, ClassRef, CollectionKind, DefaultObjectFactory, DefaultObjectWrapperFactory,
    DefaultReflectorFactory, MetaClass, MetaContext, MetaObject, ObjectFactory, Reflector,
    ReflectionResult, ReflectorFactory, TypeRef, Value,
};

fn hierarchy() -> (ClassRef, ClassRef) {
    let entity = ClassBuilder::new("Entity")
        .property("id", TypeRef::Long)
        .final_field("version", TypeRef::Int)
        .build();
    let user = ClassBuilder::new("User")
        .extends(&entity)
        .property("userName", TypeRef::Str)
        .property("enabled", TypeRef::Bool)
        .field("nickname", TypeRef::Str)
        .build();
    (entity, user)
}

#[test]
fn test_inherited_properties() {
    let (_, user) = hierarchy();
    let reflector = Reflector::new(&user);

    assert_eq!(
        reflector.readable_property_names(),
        ["enabled", "id", "nickname", "userName", "version"]
    );
    assert_eq!(
        reflector.writable_property_names(),
        ["enabled", "id", "nickname", "userName"]
    );
    assert_eq!(reflector.getter_type("ID").unwrap(), &TypeRef::Long);
    assert_eq!(reflector.find_property_name("USERNAME"), Some("userName"));
}

#[test]
fn test_superclass_invokers_accept_subclass_instances() {
    let (entity, user) = hierarchy();
    let entity_reflector = Reflector::new(&entity);

    let instance = Value::object(&user);
    let target = instance.as_object().unwrap();
    entity_reflector
        .get_set_invoker("id")
        .unwrap()
        .invoke(target, &[Value::Long(5)])
        .unwrap();
    assert_eq!(target.read().get("id"), Some(&Value::Long(5)));
}

#[test]
fn test_invoker_rejects_foreign_instance() {
    let (_, user) = hierarchy();
    let other = ClassBuilder::new("Other").property("id", TypeRef::Long).build();
    let reflector = Reflector::new(&user);

    let foreign = Value::object(&other);
    let err = reflector
        .get_get_invoker("id")
        .unwrap()
        .invoke(foreign.as_object().unwrap(), &[])
        .unwrap_err();
    assert!(err.to_string().contains("not an instance"));
}

/// Counts reflector builds, delegating to the default factory
struct CountingFactory {
    inner: DefaultReflectorFactory,
    requests: AtomicUsize,
}

impl ReflectorFactory for CountingFactory {
    fn is_class_cache_enabled(&self) -> bool {
        self.inner.is_class_cache_enabled()
    }

    fn set_class_cache_enabled(&self, enabled: bool) {
        self.inner.set_class_cache_enabled(enabled)
    }

    fn find_for_class(&self, class: &ClassRef) -> Arc<Reflector> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.inner.find_for_class(class)
    }
}

#[test]
fn test_meta_objects_share_the_reflector_cache() {
    let (_, user) = hierarchy();
    let factory = Arc::new(CountingFactory {
        inner: DefaultReflectorFactory::new(),
        requests: AtomicUsize::new(0),
    });
    let ctx = MetaContext::new(
        Arc::new(DefaultObjectFactory::new()),
        Arc::new(DefaultObjectWrapperFactory),
        factory.clone(),
    );

    for i in 0..3 {
        let meta = MetaObject::with_context(Value::object(&user), ctx.clone());
        meta.set_value("userName", Value::from(format!("user{}", i))).unwrap();
    }
    assert_eq!(factory.requests.load(Ordering::SeqCst), 3);
    assert_eq!(factory.inner.cached_count(), 1);
}

#[test]
fn test_meta_class_over_hierarchy() {
    let (_, user) = hierarchy();
    let meta = MetaClass::for_class(&user, Arc::new(DefaultReflectorFactory::new()));
    assert!(meta.has_getter("version"));
    assert!(!meta.has_setter("version"));
    assert_eq!(meta.find_property("user_name", true).as_deref(), Some("userName"));
    assert_eq!(meta.find_property("user_name", false), None);
}

/// Object factory that pre-sizes lists from a configuration property
#[derive(Default)]
struct PresizedFactory {
    inner: DefaultObjectFactory,
    capacity: usize,
}

impl ObjectFactory for PresizedFactory {
    fn set_properties(&mut self, properties: &BTreeMap<String, String>) {
        if let Some(capacity) = properties.get("capacity").and_then(|c| c.parse().ok()) {
            self.capacity = capacity;
        }
    }

    fn create_with(&self, ty: &TypeRef, arg_types: &[TypeRef], args: &[Value]) -> ReflectionResult<Value> {
        let value = self.inner.create_with(ty, arg_types, args)?;
        if let Value::List(list) = &value {
            list.write().items.reserve(self.capacity);
        }
        Ok(value)
    }
}

#[test]
fn test_custom_object_factory_properties() {
    let mut factory = PresizedFactory::default();
    let mut properties = BTreeMap::new();
    properties.insert("capacity".to_string(), "32".to_string());
    factory.set_properties(&properties);

    let list = factory.create(&TypeRef::list()).unwrap();
    assert!(list.as_list().unwrap().read().items.capacity() >= 32);
    assert!(factory.is_collection(&TypeRef::collection(CollectionKind::Set)));
}
