//! Mapper interface descriptors
//!
//! A mapper interface is described once, when it is registered: its name,
//! the methods it declares (abstract or with a default body) and the
//! interfaces it extends.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use strata_reflect::{TypeRef, Value};

use super::proxy::MapperProxy;

/// Body of a default method: runs against the bound instance itself
pub type DefaultMethodBody =
    Arc<dyn Fn(&MapperProxy, &[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Name under which the universal object contract is declared
pub const OBJECT_CONTRACT: &str = "Object";

static OBJECT_METHODS: Lazy<Vec<Arc<MapperMethod>>> = Lazy::new(|| {
    vec![
        Arc::new(MapperMethod::new(OBJECT_CONTRACT, "equals", vec![TypeRef::Any], TypeRef::Bool, None)),
        Arc::new(MapperMethod::new(OBJECT_CONTRACT, "hash_code", vec![], TypeRef::Long, None)),
        Arc::new(MapperMethod::new(OBJECT_CONTRACT, "to_string", vec![], TypeRef::Str, None)),
    ]
});

/// Method of the object contract every bound instance answers
pub fn object_method(name: &str, arity: usize) -> Option<&'static Arc<MapperMethod>> {
    OBJECT_METHODS
        .iter()
        .find(|m| m.name() == name && m.params().len() == arity)
}

/// Identity of a method within the method cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    declaring: String,
    name: String,
    params: Vec<TypeRef>,
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.declaring, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}

/// Method declared by a mapper interface
pub struct MapperMethod {
    declaring: String,
    name: String,
    params: Vec<TypeRef>,
    return_type: TypeRef,
    default_body: Option<DefaultMethodBody>,
}

impl MapperMethod {
    fn new(
        declaring: &str,
        name: &str,
        params: Vec<TypeRef>,
        return_type: TypeRef,
        default_body: Option<DefaultMethodBody>,
    ) -> Self {
        Self {
            declaring: declaring.to_string(),
            name: name.to_string(),
            params,
            return_type,
            default_body,
        }
    }

    /// Interface that declares the method
    pub fn declaring(&self) -> &str {
        &self.declaring
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Return type
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// Default body, when the interface provides one
    pub fn default_body(&self) -> Option<&DefaultMethodBody> {
        self.default_body.as_ref()
    }

    /// True for methods with a body on the interface
    pub fn is_default(&self) -> bool {
        self.default_body.is_some()
    }

    /// True for `equals`, `hash_code` and `to_string` of the object contract,
    /// including redeclarations of them on an interface
    pub fn is_object_method(&self) -> bool {
        self.declaring == OBJECT_CONTRACT || object_method(&self.name, self.params.len()).is_some()
    }

    /// Cache key
    pub fn key(&self) -> MethodKey {
        MethodKey {
            declaring: self.declaring.clone(),
            name: self.name.clone(),
            params: self.params.clone(),
        }
    }

    fn same_signature(&self, other: &MapperMethod) -> bool {
        self.name == other.name && self.params == other.params
    }

    fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(param, arg)| param.accepts(arg))
    }
}

impl fmt::Debug for MapperMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.return_type, self.key())?;
        if self.is_default() {
            f.write_str(" [default]")?;
        }
        Ok(())
    }
}

/// Descriptor of a mapper interface
pub struct MapperInterface {
    name: String,
    is_interface: bool,
    parents: Vec<Arc<MapperInterface>>,
    methods: Vec<Arc<MapperMethod>>,
}

impl MapperInterface {
    /// Start describing an interface
    pub fn builder(name: impl Into<String>) -> MapperInterfaceBuilder {
        MapperInterfaceBuilder {
            name: name.into(),
            is_interface: true,
            parents: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Interface name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// False when the descriptor was built for a concrete type
    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Directly extended interfaces
    pub fn parents(&self) -> &[Arc<MapperInterface>] {
        &self.parents
    }

    /// Methods declared directly on this interface
    pub fn declared_methods(&self) -> &[Arc<MapperMethod>] {
        &self.methods
    }

    /// Declared and inherited methods. A method redeclared here hides the
    /// inherited one with the same signature.
    pub fn methods(&self) -> Vec<Arc<MapperMethod>> {
        let mut all: Vec<Arc<MapperMethod>> = self.methods.clone();
        for parent in &self.parents {
            for method in parent.methods() {
                if !all.iter().any(|m| m.same_signature(&method)) {
                    all.push(method);
                }
            }
        }
        all
    }

    /// Check whether `name` is this interface or one of its ancestors
    pub fn extends(&self, name: &str) -> bool {
        self.name == name || self.parents.iter().any(|p| p.extends(name))
    }

    /// Method to run for a call of `name` with `args`.
    ///
    /// A unique method of that name and arity is chosen directly; among
    /// overloads of the same arity the first whose parameters accept the
    /// arguments wins.
    pub fn resolve_method(&self, name: &str, args: &[Value]) -> Option<Arc<MapperMethod>> {
        let candidates: Vec<Arc<MapperMethod>> = self
            .methods()
            .into_iter()
            .filter(|m| m.name() == name && m.params().len() == args.len())
            .collect();
        if candidates.len() == 1 {
            return candidates.into_iter().next();
        }
        candidates.into_iter().find(|m| m.accepts(args))
    }

    /// Pairs of declared methods sharing a signature
    pub(crate) fn duplicate_signatures(&self) -> Vec<String> {
        let mut duplicates = Vec::new();
        for (i, method) in self.methods.iter().enumerate() {
            if self.methods[..i].iter().any(|m| m.same_signature(method)) {
                duplicates.push(format!("{:?}", method));
            }
        }
        duplicates
    }
}

impl fmt::Debug for MapperInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperInterface")
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("methods", &self.methods)
            .finish()
    }
}

/// Builder for [`MapperInterface`]
pub struct MapperInterfaceBuilder {
    name: String,
    is_interface: bool,
    parents: Vec<Arc<MapperInterface>>,
    methods: Vec<Arc<MapperMethod>>,
}

impl MapperInterfaceBuilder {
    /// Describe a concrete type instead of an interface
    pub fn class_type(mut self) -> Self {
        self.is_interface = false;
        self
    }

    /// Inherit the methods of `parent`
    pub fn extends(mut self, parent: Arc<MapperInterface>) -> Self {
        self.parents.push(parent);
        self
    }

    /// Declare an abstract method, executed by a handler
    pub fn method(mut self, name: &str, params: Vec<TypeRef>, return_type: TypeRef) -> Self {
        let method = MapperMethod::new(&self.name, name, params, return_type, None);
        self.methods.push(Arc::new(method));
        self
    }

    /// Declare a method with a body that runs against the bound instance
    pub fn default_method<F>(
        mut self,
        name: &str,
        params: Vec<TypeRef>,
        return_type: TypeRef,
        body: F,
    ) -> Self
    where
        F: Fn(&MapperProxy, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let method = MapperMethod::new(&self.name, name, params, return_type, Some(Arc::new(body)));
        self.methods.push(Arc::new(method));
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> MapperInterface {
        MapperInterface {
            name: self.name,
            is_interface: self.is_interface,
            parents: self.parents,
            methods: self.methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Arc<MapperInterface> {
        Arc::new(
            MapperInterface::builder("BaseMapper")
                .method("count", vec![], TypeRef::Long)
                .method("find_by_id", vec![TypeRef::Long], TypeRef::Any)
                .build(),
        )
    }

    #[test]
    fn test_inherited_methods() {
        let mapper = MapperInterface::builder("UserMapper")
            .extends(base())
            .method("find_by_id", vec![TypeRef::Long], TypeRef::Any)
            .method("find_by_name", vec![TypeRef::Str], TypeRef::Any)
            .build();

        let methods = mapper.methods();
        assert_eq!(methods.len(), 3);
        let find = mapper.resolve_method("find_by_id", &[Value::Long(1)]).unwrap();
        assert_eq!(find.declaring(), "UserMapper");
        let count = mapper.resolve_method("count", &[]).unwrap();
        assert_eq!(count.declaring(), "BaseMapper");
        assert!(mapper.extends("BaseMapper"));
        assert!(!mapper.extends("OrderMapper"));
    }

    #[test]
    fn test_overload_resolution_by_argument_type() {
        let mapper = MapperInterface::builder("Lookup")
            .method("find", vec![TypeRef::Long], TypeRef::Any)
            .method("find", vec![TypeRef::Str], TypeRef::Any)
            .build();
        let by_name = mapper.resolve_method("find", &[Value::from("x")]).unwrap();
        assert_eq!(by_name.params(), [TypeRef::Str]);
        let by_id = mapper.resolve_method("find", &[Value::Int(1)]).unwrap();
        assert_eq!(by_id.params(), [TypeRef::Long]);
        assert!(mapper.resolve_method("find", &[Value::Bool(true)]).is_none());
        assert!(mapper.resolve_method("find", &[]).is_none());
    }

    #[test]
    fn test_duplicate_signatures() {
        let mapper = MapperInterface::builder("Dup")
            .method("get", vec![TypeRef::Long], TypeRef::Any)
            .method("get", vec![TypeRef::Long], TypeRef::Str)
            .build();
        assert_eq!(mapper.duplicate_signatures().len(), 1);
    }

    #[test]
    fn test_redeclared_object_methods() {
        let mapper = MapperInterface::builder("Named")
            .method("to_string", vec![], TypeRef::Str)
            .method("to_string", vec![TypeRef::Int], TypeRef::Str)
            .build();
        let methods = mapper.declared_methods();
        assert!(methods[0].is_object_method());
        assert!(!methods[1].is_object_method());
    }

    #[test]
    fn test_object_methods() {
        let equals = object_method("equals", 1).unwrap();
        assert!(equals.is_object_method());
        assert!(object_method("equals", 0).is_none());
        assert!(object_method("hash_code", 0).is_some());
        assert_eq!(
            object_method("to_string", 0).unwrap().key().to_string(),
            "Object.to_string()"
        );
    }
}
