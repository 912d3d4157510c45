//! Runtime class descriptors
//!
//! Domain classes are described explicitly with [`ClassBuilder`]: fields
//! occupy slots of an [`Object`], methods and constructors are closures over
//! the instance. Fields of a superclass occupy the leading slots, so a
//! subclass instance can be handed to any accessor of its ancestors.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::property::namer;
use crate::types::{join_types, TypeRef};
use crate::value::{Object, Value};

/// Shared handle to a class descriptor
pub type ClassRef = Arc<Class>;

/// Body of a method: receives the instance and the (already coerced) arguments
pub type MethodBody = Arc<dyn Fn(&mut Object, &[Value]) -> Result<Value, String> + Send + Sync>;

/// Body of a constructor: receives a default-initialized instance
pub type ConstructorBody = Arc<dyn Fn(&mut Object, &[Value]) -> Result<(), String> + Send + Sync>;

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Unique class identifier, used as cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Instance field
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Slot index in the instance
    pub slot: usize,
    /// Final fields can only be written by constructors
    pub is_final: bool,
}

/// Method declared on a class
pub struct MethodDef {
    name: String,
    params: Vec<TypeRef>,
    return_type: TypeRef,
    synthetic: bool,
    body: MethodBody,
}

impl MethodDef {
    /// Create a method
    pub fn new(
        name: impl Into<String>,
        params: Vec<TypeRef>,
        return_type: TypeRef,
        body: MethodBody,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            synthetic: false,
            body,
        }
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

    /// Compiler-generated bridge method
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Signature used to detect overrides: `name(T1, T2)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, join_types(&self.params))
    }

    /// Run the method body
    pub fn call(&self, target: &mut Object, args: &[Value]) -> Result<Value, String> {
        (self.body)(target, args)
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.return_type, self.signature())?;
        if self.synthetic {
            f.write_str(" [synthetic]")?;
        }
        Ok(())
    }
}

/// Constructor declared on a class
#[derive(Clone)]
pub struct ConstructorDef {
    params: Vec<TypeRef>,
    body: ConstructorBody,
}

impl ConstructorDef {
    /// Parameter types
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Run the constructor body
    pub fn call(&self, target: &mut Object, args: &[Value]) -> Result<(), String> {
        (self.body)(target, args)
    }
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<init>({})", join_types(&self.params))
    }
}

/// Runtime class descriptor
pub struct Class {
    id: ClassId,
    name: String,
    superclass: Option<ClassRef>,
    is_abstract: bool,
    is_interface: bool,
    fields: Vec<FieldDef>,
    methods: Vec<Arc<MethodDef>>,
    constructors: Vec<ConstructorDef>,
    slot_count: usize,
}

impl Class {
    /// Unique identifier
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct superclass
    pub fn superclass(&self) -> Option<&ClassRef> {
        self.superclass.as_ref()
    }

    /// Abstract classes cannot be instantiated
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Interfaces cannot be instantiated
    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Fields declared directly on this class
    pub fn declared_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Methods declared directly on this class
    pub fn declared_methods(&self) -> &[Arc<MethodDef>] {
        &self.methods
    }

    /// Constructors of this class
    pub fn constructors(&self) -> &[ConstructorDef] {
        &self.constructors
    }

    /// Number of instance slots, including inherited fields
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Iterate over this class and its ancestors, most derived first
    pub fn hierarchy(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |class| class.superclass.as_deref())
    }

    /// True if `self` is `other` or one of its subclasses
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.hierarchy().any(|class| class.id == other.id)
    }

    /// Find a field by name, searching superclasses too
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.hierarchy()
            .flat_map(|class| class.fields.iter())
            .find(|field| field.name == name)
    }

    /// Constructor with exactly these parameter types
    pub fn find_constructor(&self, params: &[TypeRef]) -> Option<&ConstructorDef> {
        self.constructors.iter().find(|ctor| ctor.params == params)
    }

    /// Default slot values: zero for primitives, null otherwise
    pub fn default_slots(&self) -> Vec<Value> {
        let mut slots = vec![Value::Null; self.slot_count];
        for field in self.hierarchy().flat_map(|class| class.fields.iter()) {
            slots[field.slot] = default_value(&field.ty);
        }
        slots
    }
}

fn default_value(ty: &TypeRef) -> Value {
    match ty {
        TypeRef::Bool => Value::Bool(false),
        TypeRef::Int => Value::Int(0),
        TypeRef::Long => Value::Long(0),
        TypeRef::Double => Value::Double(0.0),
        _ => Value::Null,
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({}#{})", self.name, self.id.0)
    }
}

/// Builder for [`Class`]
pub struct ClassBuilder {
    name: String,
    superclass: Option<ClassRef>,
    is_abstract: bool,
    is_interface: bool,
    fields: Vec<FieldDef>,
    methods: Vec<Arc<MethodDef>>,
    constructors: Vec<ConstructorDef>,
}

impl ClassBuilder {
    /// Start a new class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            is_abstract: false,
            is_interface: false,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Set the superclass. Must be called before any field is added.
    pub fn extends(mut self, superclass: &ClassRef) -> Self {
        debug_assert!(self.fields.is_empty(), "extends() must precede fields");
        self.superclass = Some(superclass.clone());
        self
    }

    /// Mark as abstract
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark as interface
    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    fn next_slot(&self) -> usize {
        let inherited = self.superclass.as_ref().map_or(0, |s| s.slot_count);
        inherited + self.fields.len()
    }

    fn push_field(mut self, name: &str, ty: TypeRef, is_final: bool) -> Self {
        let slot = self.next_slot();
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            slot,
            is_final,
        });
        self
    }

    fn slot_of(&self, field: &str) -> (usize, TypeRef) {
        if let Some(def) = self.fields.iter().find(|f| f.name == field) {
            return (def.slot, def.ty.clone());
        }
        match self.superclass.as_ref().and_then(|s| s.field(field)) {
            Some(def) => (def.slot, def.ty.clone()),
            None => panic!("class '{}' has no field '{}'", self.name, field),
        }
    }

    /// Add a plain field (no accessors)
    pub fn field(self, name: &str, ty: TypeRef) -> Self {
        self.push_field(name, ty, false)
    }

    /// Add a final field
    pub fn final_field(self, name: &str, ty: TypeRef) -> Self {
        self.push_field(name, ty, true)
    }

    /// Add a field with a conventional getter and setter
    pub fn property(self, name: &str, ty: TypeRef) -> Self {
        self.field(name, ty).getter_for(name).setter_for(name)
    }

    /// Add a conventional getter (`getX`, or `isX` for booleans) reading `field`
    ///
    /// # Panics
    ///
    /// Panics if neither this class nor a superclass declares `field`
    pub fn getter_for(self, field: &str) -> Self {
        let (slot, ty) = self.slot_of(field);
        let prefix = if ty == TypeRef::Bool { "is" } else { "get" };
        let name = format!("{}{}", prefix, namer::capitalize(field));
        self.method(&name, vec![], ty, move |obj, _| {
            obj.slot(slot)
                .cloned()
                .ok_or_else(|| format!("slot {} out of bounds", slot))
        })
    }

    /// Add a conventional setter (`setX`) writing `field`
    ///
    /// # Panics
    ///
    /// Panics if neither this class nor a superclass declares `field`
    pub fn setter_for(self, field: &str) -> Self {
        let (slot, ty) = self.slot_of(field);
        let name = format!("set{}", namer::capitalize(field));
        self.method(&name, vec![ty], TypeRef::Void, move |obj, args| {
            obj.set_slot(slot, args[0].clone())?;
            Ok(Value::Null)
        })
    }

    /// Add a method
    pub fn method<F>(mut self, name: &str, params: Vec<TypeRef>, return_type: TypeRef, body: F) -> Self
    where
        F: Fn(&mut Object, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.methods.push(Arc::new(MethodDef::new(
            name,
            params,
            return_type,
            Arc::new(body),
        )));
        self
    }

    /// Add a compiler-generated bridge method
    pub fn synthetic_method<F>(
        mut self,
        name: &str,
        params: Vec<TypeRef>,
        return_type: TypeRef,
        body: F,
    ) -> Self
    where
        F: Fn(&mut Object, &[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        let mut method = MethodDef::new(name, params, return_type, Arc::new(body));
        method.synthetic = true;
        self.methods.push(Arc::new(method));
        self
    }

    /// Add a constructor. The object factory invokes constructors
    /// regardless of visibility.
    pub fn constructor<F>(mut self, params: Vec<TypeRef>, body: F) -> Self
    where
        F: Fn(&mut Object, &[Value]) -> Result<(), String> + Send + Sync + 'static,
    {
        self.constructors.push(ConstructorDef {
            params,
            body: Arc::new(body),
        });
        self
    }

    /// Finish the class. Concrete classes without constructors get an
    /// implicit no-argument one.
    pub fn build(mut self) -> ClassRef {
        if self.constructors.is_empty() && !self.is_interface {
            self.constructors.push(ConstructorDef {
                params: Vec::new(),
                body: Arc::new(|_, _| Ok(())),
            });
        }
        let slot_count = self.next_slot();
        Arc::new(Class {
            id: ClassId::next(),
            name: self.name,
            superclass: self.superclass,
            is_abstract: self.is_abstract,
            is_interface: self.is_interface,
            fields: self.fields,
            methods: self.methods,
            constructors: self.constructors,
            slot_count,
        })
    }
}
