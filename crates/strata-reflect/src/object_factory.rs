//! Instance creation

use std::collections::BTreeMap;

use crate::error::{ReflectionError, ReflectionResult};
use crate::types::{join_types, CollectionKind, TypeRef};
use crate::value::{ListData, ListRef, MapData, MapRef, Object, ObjectRef, SetData, SetRef, Value};

/// Creates new values of a declared type
pub trait ObjectFactory: Send + Sync {
    /// Configure the factory from string properties
    fn set_properties(&mut self, _properties: &BTreeMap<String, String>) {}

    /// New value of `ty` using its no-argument constructor
    fn create(&self, ty: &TypeRef) -> ReflectionResult<Value> {
        self.create_with(ty, &[], &[])
    }

    /// New value of `ty` using the constructor with exactly `arg_types`
    fn create_with(&self, ty: &TypeRef, arg_types: &[TypeRef], args: &[Value]) -> ReflectionResult<Value>;

    /// True for every collection type (arrays are not collections)
    fn is_collection(&self, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Collection { .. })
    }
}

/// Object factory used unless another is configured
///
/// Abstract collection types resolve to concrete containers: `Iterable`,
/// `Collection` and `List` to a list, `Set` to an unordered set and
/// `SortedSet` to a sorted set. Bean constructors are used regardless of
/// visibility.
#[derive(Debug, Default, Clone)]
pub struct DefaultObjectFactory;

impl DefaultObjectFactory {
    /// Create the factory
    pub fn new() -> Self {
        Self
    }

    fn instantiate(&self, ty: &TypeRef, arg_types: &[TypeRef], args: &[Value]) -> Result<Value, String> {
        if arg_types.len() != args.len() {
            return Err(format!(
                "{} argument type(s) given for {} argument(s)",
                arg_types.len(),
                args.len()
            ));
        }
        match ty {
            TypeRef::Collection { kind, element } if arg_types.is_empty() => {
                let element_type = element.as_deref().cloned();
                Ok(match kind {
                    CollectionKind::Iterable | CollectionKind::Collection | CollectionKind::List => {
                        Value::List(ListRef::new(ListData {
                            items: Vec::new(),
                            element_type,
                        }))
                    }
                    CollectionKind::Set => Value::Set(SetRef::new(SetData::unordered(element_type))),
                    CollectionKind::SortedSet => Value::Set(SetRef::new(SetData::sorted(element_type))),
                })
            }
            TypeRef::Map { value } if arg_types.is_empty() => Ok(Value::Map(MapRef::new(MapData {
                entries: Default::default(),
                value_type: value.as_deref().cloned(),
            }))),
            TypeRef::Str => match (arg_types, args) {
                ([], []) => Ok(Value::Str(String::new())),
                ([TypeRef::Str], [Value::Str(s)]) => Ok(Value::Str(s.clone())),
                _ => Err("no matching constructor".to_string()),
            },
            TypeRef::Bean(class) => {
                if class.is_interface() || class.is_abstract() {
                    return Err(format!("'{}' is abstract or an interface", class.name()));
                }
                let ctor = class.find_constructor(arg_types).ok_or_else(|| {
                    format!(
                        "'{}' has no constructor with parameter types ({})",
                        class.name(),
                        join_types(arg_types)
                    )
                })?;
                let args = ctor
                    .params()
                    .iter()
                    .zip(args)
                    .map(|(param, arg)| {
                        param.coerce(arg.clone()).ok_or_else(|| {
                            format!("argument {} is not a {}", arg.type_name(), param)
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut object = Object::new(class.clone());
                ctor.call(&mut object, &args)?;
                Ok(Value::Object(ObjectRef::new(object)))
            }
            TypeRef::Collection { .. } | TypeRef::Map { .. } => {
                Err("containers only have a no-argument constructor".to_string())
            }
            other => Err(format!("'{}' cannot be instantiated", other)),
        }
    }
}

impl ObjectFactory for DefaultObjectFactory {
    fn create_with(&self, ty: &TypeRef, arg_types: &[TypeRef], args: &[Value]) -> ReflectionResult<Value> {
        self.instantiate(ty, arg_types, args)
            .map_err(|cause| ReflectionError::Instantiation {
                ty: ty.to_string(),
                arg_types: join_types(arg_types),
                args: args
                    .iter()
                    .map(|arg| format!("{:?}", arg))
                    .collect::<Vec<_>>()
                    .join(", "),
                cause: cause.into(),
            })
    }
}
