//! Mapper registration and dispatch through bound instances

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use strata_binding::strata_reflect::{ClassBuilder, ReflectionError, TypeRef, Value};
use strata_binding::{
    BindingError, Configuration, Error, Mapper, MapperInterface, MapperMethod,
    MapperMethodFactory, MapperMethodHandler, MapperProxy, MapperRegistry, Session,
};

struct TestSession {
    configuration: Arc<Configuration>,
}

impl Session for TestSession {
    fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }
}

fn session() -> Arc<dyn Session> {
    Arc::new(TestSession {
        configuration: Arc::new(Configuration::new()),
    })
}

/// Builds handlers by method name and counts how many it built
#[derive(Default)]
struct RecordingFactory {
    created: AtomicUsize,
}

impl RecordingFactory {
    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl MapperMethodFactory for RecordingFactory {
    fn validate(
        &self,
        registry: &MapperRegistry,
        interface: &MapperInterface,
        method: &MapperMethod,
    ) -> anyhow::Result<()> {
        if method.name().starts_with("unsupported") {
            bail!("no statement for {}", method.name());
        }
        if method.name() == "parent" && !registry.has_mapper_named(interface.name()) {
            bail!("{} refers to an unknown mapper", method.name());
        }
        Ok(())
    }

    fn create(
        &self,
        _interface: &MapperInterface,
        method: &MapperMethod,
        _configuration: &Configuration,
    ) -> anyhow::Result<Arc<dyn MapperMethodHandler>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));

        let handler: Arc<dyn MapperMethodHandler> = match method.name() {
            "count" => Arc::new(|_: &dyn Session, _: &[Value]| -> anyhow::Result<Value> {
                Ok(Value::Long(42))
            }),
            "profile_name" => Arc::new(
                |session: &dyn Session, args: &[Value]| -> anyhow::Result<Value> {
                    let meta = session.configuration().new_meta_object(args[0].clone());
                    Ok(meta.get_value("profile.name")?)
                },
            ),
            "fail" => Arc::new(|_: &dyn Session, _: &[Value]| -> anyhow::Result<Value> {
                bail!("connection reset")
            }),
            "lookup_other" => Arc::new(|_: &dyn Session, _: &[Value]| -> anyhow::Result<Value> {
                Err(BindingError::NotRegistered {
                    mapper: "OrderMapper".to_string(),
                })
                .context("resolving nested mapper")
                .context("executing lookup_other")
            }),
            "bad_path" => Arc::new(
                |session: &dyn Session, _: &[Value]| -> anyhow::Result<Value> {
                    let meta = session.configuration().new_meta_object(Value::Int(3));
                    let value = meta
                        .get_value("digits")
                        .context("reading digits of an int")?;
                    Ok(value)
                },
            ),
            other => bail!("no handler for {}", other),
        };
        Ok(handler)
    }
}

#[derive(Debug)]
struct UserMapper(MapperProxy);

impl Mapper for UserMapper {
    fn interface() -> MapperInterface {
        MapperInterface::builder("UserMapper")
            .method("count", vec![], TypeRef::Long)
            .method("profile_name", vec![TypeRef::Any], TypeRef::Str)
            .method("fail", vec![], TypeRef::Void)
            .method("lookup_other", vec![], TypeRef::Any)
            .method("bad_path", vec![], TypeRef::Any)
            .default_method("count_twice", vec![], TypeRef::Long, |proxy, _| {
                let count = proxy.invoke("count", &[])?;
                Ok(Value::Long(count.as_i64().unwrap_or(0) * 2))
            })
            .build()
    }

    fn bind(proxy: MapperProxy) -> Self {
        UserMapper(proxy)
    }
}

impl UserMapper {
    fn count(&self) -> strata_binding::Result<i64> {
        let value = self.0.invoke("count", &[])?;
        Ok(value.as_i64().unwrap_or_default())
    }
}

#[derive(Debug)]
struct NamedMapper(MapperProxy);

impl Mapper for NamedMapper {
    fn interface() -> MapperInterface {
        MapperInterface::builder("NamedMapper")
            .method("to_string", vec![], TypeRef::Str)
            .method("equals", vec![TypeRef::Any], TypeRef::Bool)
            .method("hash_code", vec![], TypeRef::Long)
            .build()
    }

    fn bind(proxy: MapperProxy) -> Self {
        NamedMapper(proxy)
    }
}

#[derive(Debug)]
struct TreeMapper(MapperProxy);

impl Mapper for TreeMapper {
    fn interface() -> MapperInterface {
        MapperInterface::builder("TreeMapper")
            .method("parent", vec![TypeRef::Long], TypeRef::Any)
            .build()
    }

    fn bind(proxy: MapperProxy) -> Self {
        TreeMapper(proxy)
    }
}

#[derive(Debug)]
struct BrokenMapper(MapperProxy);

impl Mapper for BrokenMapper {
    fn interface() -> MapperInterface {
        MapperInterface::builder("BrokenMapper")
            .method("count", vec![], TypeRef::Long)
            .method("unsupported_merge", vec![TypeRef::Any], TypeRef::Void)
            .build()
    }

    fn bind(proxy: MapperProxy) -> Self {
        BrokenMapper(proxy)
    }
}

fn registry() -> (MapperRegistry, Arc<RecordingFactory>) {
    let factory = Arc::new(RecordingFactory::default());
    let registry = MapperRegistry::new(factory.clone());
    registry.add_mapper::<UserMapper>().unwrap();
    (registry, factory)
}

#[test]
fn test_handler_built_once_under_concurrent_first_calls() {
    let (registry, factory) = registry();
    let threads = 8;
    let barrier = Barrier::new(threads);

    let results: Vec<i64> = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let mapper: UserMapper = registry.get_mapper(session()).unwrap();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    mapper.count().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|&count| count == 42));
    assert_eq!(factory.created(), 1);
    let proxies = registry.proxy_factory::<UserMapper>().unwrap();
    assert_eq!(proxies.cached_method_count(), 1);
}

#[test]
fn test_object_methods_answered_locally() {
    let (registry, factory) = registry();
    let mapper: UserMapper = registry.get_mapper(session()).unwrap();
    let other: UserMapper = registry.get_mapper(session()).unwrap();

    assert_eq!(
        mapper.0.invoke("to_string", &[]).unwrap(),
        Value::from("MapperProxy(UserMapper)")
    );
    assert_eq!(
        mapper.0.invoke("hash_code", &[]).unwrap(),
        Value::Long(mapper.0.identity_hash())
    );
    assert_eq!(
        mapper.0.invoke("equals", &[Value::Null]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(mapper.0, mapper.0.clone());
    assert_ne!(mapper.0, other.0);
    assert_eq!(factory.created(), 0);
}

#[test]
fn test_redeclared_object_methods_stay_local() {
    let factory = Arc::new(RecordingFactory::default());
    let registry = MapperRegistry::new(factory.clone());
    registry.add_mapper::<NamedMapper>().unwrap();
    let mapper: NamedMapper = registry.get_mapper(session()).unwrap();

    assert_eq!(
        mapper.0.invoke("to_string", &[]).unwrap(),
        Value::from("MapperProxy(NamedMapper)")
    );
    assert_eq!(
        mapper.0.invoke("equals", &[Value::Null]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        mapper.0.invoke("hash_code", &[]).unwrap(),
        Value::Long(mapper.0.identity_hash())
    );

    let declared = mapper.0.interface().declared_methods()[0].clone();
    assert_eq!(
        mapper.0.invoke_method(&declared, &[]).unwrap(),
        Value::from("MapperProxy(NamedMapper)")
    );
    assert_eq!(factory.created(), 0);
}

#[test]
fn test_default_method_runs_against_instance() {
    let (registry, factory) = registry();
    let mapper: UserMapper = registry.get_mapper(session()).unwrap();

    assert_eq!(mapper.0.invoke("count_twice", &[]).unwrap(), Value::Long(84));
    // only `count` needed a handler
    assert_eq!(factory.created(), 1);
}

#[test]
fn test_handler_navigates_arguments_with_meta_object() {
    let profile = ClassBuilder::new("Profile")
        .property("name", TypeRef::Str)
        .build();
    let user = ClassBuilder::new("User")
        .property("profile", TypeRef::bean(&profile))
        .build();

    let session = session();
    let arg = Value::object(&user);
    session
        .configuration()
        .new_meta_object(arg.clone())
        .set_value("profile.name", Value::from("Ana"))
        .unwrap();

    let (registry, _) = registry();
    let mapper: UserMapper = registry.get_mapper(session).unwrap();
    assert_eq!(
        mapper.0.invoke("profile_name", &[arg]).unwrap(),
        Value::from("Ana")
    );
}

#[test]
fn test_handler_errors_are_unwrapped() {
    let (registry, _) = registry();
    let mapper: UserMapper = registry.get_mapper(session()).unwrap();

    let err = mapper.0.invoke("lookup_other", &[]).unwrap_err();
    match err {
        Error::Binding(BindingError::NotRegistered { mapper }) => assert_eq!(mapper, "OrderMapper"),
        other => panic!("unexpected error: {}", other),
    }

    let err = mapper.0.invoke("bad_path", &[]).unwrap_err();
    assert!(matches!(err, Error::Reflection(ReflectionError::NoSuchProperty { .. })));

    let err = mapper.0.invoke("fail", &[]).unwrap_err();
    let cause = err.as_execution().unwrap();
    assert_eq!(cause.to_string(), "connection reset");
}

#[test]
fn test_unknown_method() {
    let (registry, _) = registry();
    let mapper: UserMapper = registry.get_mapper(session()).unwrap();
    let err = mapper.0.invoke("count", &[Value::Int(1)]).unwrap_err();
    assert!(matches!(
        err,
        Error::Binding(BindingError::NoSuchMethod { arity: 1, .. })
    ));
}

#[test]
fn test_validation_sees_interface_being_registered() {
    let (registry, _) = registry();
    registry.add_mapper::<TreeMapper>().unwrap();
    assert_eq!(registry.mappers(), ["TreeMapper", "UserMapper"]);
}

#[test]
fn test_failed_validation_rolls_back() {
    let (registry, factory) = registry();
    let err = registry.add_mapper::<BrokenMapper>().unwrap_err();
    match err {
        BindingError::InvalidMapper { mapper, reason } => {
            assert_eq!(mapper, "BrokenMapper");
            assert!(reason.contains("no statement for unsupported_merge"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!registry.has_mapper::<BrokenMapper>());
    assert!(!registry.has_mapper_named("BrokenMapper"));
    assert_eq!(registry.mappers(), ["UserMapper"]);
    assert_eq!(factory.created(), 0);

    let err = registry.get_mapper::<BrokenMapper>(session()).unwrap_err();
    assert!(matches!(err, BindingError::NotRegistered { .. }));
}

#[test]
fn test_double_registration_keeps_first_binding() {
    let (registry, _) = registry();
    let before: UserMapper = registry.get_mapper(session()).unwrap();
    before.count().unwrap();

    assert!(matches!(
        registry.add_mapper::<UserMapper>(),
        Err(BindingError::AlreadyBound { .. })
    ));
    let after: UserMapper = registry.get_mapper(session()).unwrap();
    assert_eq!(after.count().unwrap(), 42);
    assert_eq!(
        registry.proxy_factory::<UserMapper>().unwrap().cached_method_count(),
        1
    );
}
