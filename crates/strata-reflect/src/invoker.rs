//! Uniform accessors over methods and fields

use std::fmt;
use std::sync::Arc;

use crate::class::{ClassRef, MethodDef};
use crate::error::{Accessor, ReflectionError, ReflectionResult};
use crate::types::TypeRef;
use crate::value::{ObjectRef, Value};

#[derive(Clone)]
enum InvokerKind {
    Method(Arc<MethodDef>),
    GetField { slot: usize },
    SetField { slot: usize },
}

/// A single get or set operation on one property of one class.
///
/// Arguments are checked and coerced before the target is locked, so a
/// value may be written into itself (`node.next = node`).
#[derive(Clone)]
pub struct Invoker {
    owner: ClassRef,
    property: String,
    accessor: Accessor,
    ty: TypeRef,
    kind: InvokerKind,
}

impl Invoker {
    pub(crate) fn getter_method(owner: &ClassRef, property: &str, method: Arc<MethodDef>) -> Self {
        Self {
            owner: owner.clone(),
            property: property.to_string(),
            accessor: Accessor::Getter,
            ty: method.return_type().clone(),
            kind: InvokerKind::Method(method),
        }
    }

    pub(crate) fn setter_method(owner: &ClassRef, property: &str, method: Arc<MethodDef>) -> Self {
        Self {
            owner: owner.clone(),
            property: property.to_string(),
            accessor: Accessor::Setter,
            ty: method.params()[0].clone(),
            kind: InvokerKind::Method(method),
        }
    }

    pub(crate) fn get_field(owner: &ClassRef, property: &str, slot: usize, ty: TypeRef) -> Self {
        Self {
            owner: owner.clone(),
            property: property.to_string(),
            accessor: Accessor::Getter,
            ty,
            kind: InvokerKind::GetField { slot },
        }
    }

    pub(crate) fn set_field(owner: &ClassRef, property: &str, slot: usize, ty: TypeRef) -> Self {
        Self {
            owner: owner.clone(),
            property: property.to_string(),
            accessor: Accessor::Setter,
            ty,
            kind: InvokerKind::SetField { slot },
        }
    }

    /// Property value type: getter return type or setter parameter type
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Property this invoker accesses
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Read or write direction
    pub fn accessor(&self) -> Accessor {
        self.accessor
    }

    /// True for field-backed invokers
    pub fn is_field(&self) -> bool {
        !matches!(self.kind, InvokerKind::Method(_))
    }

    /// Perform the access. Getters take no arguments, setters exactly one.
    pub fn invoke(&self, target: &ObjectRef, args: &[Value]) -> ReflectionResult<Value> {
        let params: &[TypeRef] = match &self.kind {
            InvokerKind::Method(method) => method.params(),
            InvokerKind::GetField { .. } => &[],
            InvokerKind::SetField { .. } => std::slice::from_ref(&self.ty),
        };
        if args.len() != params.len() {
            return Err(self.failure(format!(
                "expected {} argument(s), got {}",
                params.len(),
                args.len()
            )));
        }
        let args = params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(i, (param, arg))| {
                param.coerce(arg.clone()).ok_or_else(|| {
                    self.failure(format!(
                        "argument {} type mismatch: expected {}, got {}",
                        i,
                        param,
                        arg.type_name()
                    ))
                })
            })
            .collect::<ReflectionResult<Vec<_>>>()?;

        let mut object = target.write();
        if !object.class().is_subclass_of(&self.owner) {
            return Err(self.failure(format!(
                "object of class '{}' is not an instance of the declaring class",
                object.class().name()
            )));
        }
        match &self.kind {
            InvokerKind::Method(method) => method
                .call(&mut object, &args)
                .map_err(|reason| self.failure(reason)),
            InvokerKind::GetField { slot } => object
                .slot(*slot)
                .cloned()
                .ok_or_else(|| self.failure(format!("slot {} out of bounds", slot))),
            InvokerKind::SetField { slot } => {
                let value = args.into_iter().next().unwrap_or_default();
                object
                    .set_slot(*slot, value)
                    .map(|_| Value::Null)
                    .map_err(|reason| self.failure(reason))
            }
        }
    }

    fn failure(&self, reason: impl Into<String>) -> ReflectionError {
        ReflectionError::Access {
            class: self.owner.name().to_string(),
            property: self.property.clone(),
            accessor: self.accessor,
            reason: reason.into(),
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.kind {
            InvokerKind::Method(method) => method.signature(),
            InvokerKind::GetField { slot } | InvokerKind::SetField { slot } => format!("slot {}", slot),
        };
        write!(
            f,
            "Invoker({} {}.{}: {} via {})",
            self.accessor,
            self.owner.name(),
            self.property,
            self.ty,
            source
        )
    }
}
