//! Per-class property tables
//!
//! A [`Reflector`] is built once per class and never changes afterwards.
//! It maps every readable and writable property of the class to an
//! [`Invoker`], using accessor methods where the class declares them and
//! falling back to direct field access otherwise.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::class::{ClassRef, MethodDef};
use crate::error::{ReflectionError, ReflectionResult};
use crate::invoker::Invoker;
use crate::property::namer;
use crate::types::TypeRef;

/// Property tables of one class
pub struct Reflector {
    class: ClassRef,
    readable: Vec<String>,
    writable: Vec<String>,
    get_invokers: FxHashMap<String, Invoker>,
    set_invokers: FxHashMap<String, Invoker>,
    case_insensitive: FxHashMap<String, String>,
    has_default_constructor: bool,
}

impl Reflector {
    /// Build the property tables for `class`
    pub fn new(class: &ClassRef) -> Self {
        let methods = collect_methods(class);

        let mut getter_candidates: FxHashMap<String, Vec<Arc<MethodDef>>> = FxHashMap::default();
        let mut setter_candidates: FxHashMap<String, Vec<Arc<MethodDef>>> = FxHashMap::default();
        for method in &methods {
            let name = method.name();
            let candidates = if method.params().is_empty()
                && *method.return_type() != TypeRef::Void
                && namer::is_getter(name)
            {
                &mut getter_candidates
            } else if method.params().len() == 1 && namer::is_setter(name) {
                &mut setter_candidates
            } else {
                continue;
            };
            if let Some(property) = namer::method_to_property(name) {
                candidates.entry(property).or_default().push(method.clone());
            }
        }

        let mut ambiguous: Vec<String> = Vec::new();

        let mut get_invokers = FxHashMap::default();
        for (property, candidates) in getter_candidates {
            match resolve_getter(&candidates) {
                Some(method) => {
                    get_invokers.insert(
                        property.clone(),
                        Invoker::getter_method(class, &property, method),
                    );
                }
                None => {
                    log::warn!(
                        "Dropping ambiguous getter '{}' of '{}': {}",
                        property,
                        class.name(),
                        describe(&candidates)
                    );
                    ambiguous.push(property);
                }
            }
        }

        let mut set_invokers = FxHashMap::default();
        for (property, candidates) in setter_candidates {
            let getter_type = get_invokers.get(&property).map(Invoker::ty);
            match resolve_setter(&candidates, getter_type) {
                Some(method) => {
                    set_invokers.insert(
                        property.clone(),
                        Invoker::setter_method(class, &property, method),
                    );
                }
                None => {
                    log::warn!(
                        "Dropping ambiguous setter '{}' of '{}': {}",
                        property,
                        class.name(),
                        describe(&candidates)
                    );
                    ambiguous.push(property);
                }
            }
        }

        // Fields of subclasses shadow same-named fields further up.
        for field in class.hierarchy().flat_map(|c| c.declared_fields()) {
            if ambiguous.contains(&field.name) {
                continue;
            }
            if !get_invokers.contains_key(&field.name) {
                get_invokers.insert(
                    field.name.clone(),
                    Invoker::get_field(class, &field.name, field.slot, field.ty.clone()),
                );
            }
            if !field.is_final && !set_invokers.contains_key(&field.name) {
                set_invokers.insert(
                    field.name.clone(),
                    Invoker::set_field(class, &field.name, field.slot, field.ty.clone()),
                );
            }
        }

        let mut readable: Vec<String> = get_invokers.keys().cloned().collect();
        readable.sort();
        let mut writable: Vec<String> = set_invokers.keys().cloned().collect();
        writable.sort();

        let mut case_insensitive = FxHashMap::default();
        for name in readable.iter().chain(writable.iter()) {
            case_insensitive.insert(name.to_lowercase(), name.clone());
        }

        let has_default_constructor = !class.is_abstract()
            && !class.is_interface()
            && class.find_constructor(&[]).is_some();

        log::debug!(
            "Built reflector for '{}': {} readable, {} writable",
            class.name(),
            readable.len(),
            writable.len()
        );

        Self {
            class: class.clone(),
            readable,
            writable,
            get_invokers,
            set_invokers,
            case_insensitive,
            has_default_constructor,
        }
    }

    /// Reflected class
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Whether the class can be instantiated without arguments
    pub fn has_default_constructor(&self) -> bool {
        self.has_default_constructor
    }

    /// Readable property names, sorted
    pub fn readable_property_names(&self) -> &[String] {
        &self.readable
    }

    /// Writable property names, sorted
    pub fn writable_property_names(&self) -> &[String] {
        &self.writable
    }

    /// Canonical spelling of a property name, matched case-insensitively
    pub fn find_property_name(&self, name: &str) -> Option<&str> {
        self.case_insensitive
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    fn lookup<'s>(
        &'s self,
        invokers: &'s FxHashMap<String, Invoker>,
        name: &str,
    ) -> Option<&'s Invoker> {
        invokers.get(name).or_else(|| {
            self.find_property_name(name)
                .and_then(|canonical| invokers.get(canonical))
        })
    }

    /// Getter invoker for a property
    pub fn get_get_invoker(&self, name: &str) -> ReflectionResult<&Invoker> {
        self.lookup(&self.get_invokers, name)
            .ok_or_else(|| ReflectionError::no_getter(self.class.name(), name))
    }

    /// Setter invoker for a property
    pub fn get_set_invoker(&self, name: &str) -> ReflectionResult<&Invoker> {
        self.lookup(&self.set_invokers, name)
            .ok_or_else(|| ReflectionError::no_setter(self.class.name(), name))
    }

    /// Type returned by the getter
    pub fn getter_type(&self, name: &str) -> ReflectionResult<&TypeRef> {
        self.get_get_invoker(name).map(Invoker::ty)
    }

    /// Type accepted by the setter
    pub fn setter_type(&self, name: &str) -> ReflectionResult<&TypeRef> {
        self.get_set_invoker(name).map(Invoker::ty)
    }

    /// Check for a readable property
    pub fn has_getter(&self, name: &str) -> bool {
        self.lookup(&self.get_invokers, name).is_some()
    }

    /// Check for a writable property
    pub fn has_setter(&self, name: &str) -> bool {
        self.lookup(&self.set_invokers, name).is_some()
    }
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("class", &self.class.name())
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .finish()
    }
}

/// Methods visible on `class`, most derived declaration first. A bridge
/// method only survives when nothing else has its signature.
fn collect_methods(class: &ClassRef) -> Vec<Arc<MethodDef>> {
    let mut by_signature: FxHashMap<String, Arc<MethodDef>> = FxHashMap::default();
    let mut order = Vec::new();
    let all: Vec<&Arc<MethodDef>> = class
        .hierarchy()
        .flat_map(|c| c.declared_methods())
        .collect();

    for method in all.iter().filter(|m| !m.is_synthetic()) {
        let signature = method.signature();
        if !by_signature.contains_key(&signature) {
            order.push(signature.clone());
            by_signature.insert(signature, Arc::clone(method));
        }
    }
    for method in all.iter().filter(|m| m.is_synthetic()) {
        let signature = method.signature();
        if !by_signature.contains_key(&signature) {
            order.push(signature.clone());
            by_signature.insert(signature, Arc::clone(method));
        }
    }

    order
        .into_iter()
        .filter_map(|signature| by_signature.remove(&signature))
        .collect()
}

fn resolve_getter(candidates: &[Arc<MethodDef>]) -> Option<Arc<MethodDef>> {
    let mut winner = candidates.first()?.clone();
    for candidate in &candidates[1..] {
        let winner_type = winner.return_type();
        let candidate_type = candidate.return_type();
        if winner_type == candidate_type {
            if *candidate_type != TypeRef::Bool {
                return None;
            }
            if candidate.name().starts_with("is") {
                winner = candidate.clone();
            }
        } else if winner_type.is_assignable_from(candidate_type) {
            winner = candidate.clone();
        } else if !candidate_type.is_assignable_from(winner_type) {
            return None;
        }
    }
    Some(winner)
}

fn resolve_setter(
    candidates: &[Arc<MethodDef>],
    getter_type: Option<&TypeRef>,
) -> Option<Arc<MethodDef>> {
    if let Some(getter_type) = getter_type {
        if let Some(exact) = candidates.iter().find(|m| &m.params()[0] == getter_type) {
            return Some(exact.clone());
        }
    }
    let mut winner = candidates.first()?.clone();
    for candidate in &candidates[1..] {
        let winner_type = &winner.params()[0];
        let candidate_type = &candidate.params()[0];
        if winner_type.is_assignable_from(candidate_type) {
            winner = candidate.clone();
        } else if !candidate_type.is_assignable_from(winner_type) {
            return None;
        }
    }
    Some(winner)
}

fn describe(candidates: &[Arc<MethodDef>]) -> String {
    candidates
        .iter()
        .map(|m| format!("{:?}", m))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBuilder;
    use crate::value::{Object, ObjectRef, Value};

    fn person() -> ClassRef {
        ClassBuilder::new("Person")
            .property("name", TypeRef::Str)
            .property("age", TypeRef::Int)
            .property("active", TypeRef::Bool)
            .build()
    }

    #[test]
    fn test_property_names() {
        let reflector = Reflector::new(&person());
        assert_eq!(reflector.readable_property_names(), ["active", "age", "name"]);
        assert_eq!(reflector.writable_property_names(), ["active", "age", "name"]);
        assert_eq!(reflector.getter_type("active").unwrap(), &TypeRef::Bool);
        assert!(reflector.has_default_constructor());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let reflector = Reflector::new(&person());
        assert_eq!(reflector.find_property_name("NAME"), Some("name"));
        assert!(reflector.has_getter("Age"));
        assert_eq!(reflector.setter_type("aGe").unwrap(), &TypeRef::Int);
        assert_eq!(reflector.find_property_name("missing"), None);
    }

    #[test]
    fn test_missing_property_errors() {
        let reflector = Reflector::new(&person());
        let err = reflector.get_get_invoker("missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is no getter for property named 'missing' in 'Person'"
        );
        assert!(reflector.get_set_invoker("missing").unwrap_err().is_no_such_property());
    }

    #[test]
    fn test_subclass_method_shadows_superclass() {
        let base = ClassBuilder::new("Base")
            .field("code", TypeRef::Str)
            .method("getCode", vec![], TypeRef::Str, |_, _| Ok(Value::from("base")))
            .build();
        let derived = ClassBuilder::new("Derived")
            .extends(&base)
            .method("getCode", vec![], TypeRef::Str, |_, _| Ok(Value::from("derived")))
            .build();

        let reflector = Reflector::new(&derived);
        let target = ObjectRef::new(Object::new(derived.clone()));
        let value = reflector.get_get_invoker("code").unwrap().invoke(&target, &[]).unwrap();
        assert_eq!(value, Value::from("derived"));
    }

    #[test]
    fn test_covariant_getter_keeps_specific_type() {
        let animal = ClassBuilder::new("Animal").build();
        let dog = ClassBuilder::new("Dog").extends(&animal).build();
        let owner = ClassBuilder::new("Owner")
            .method("getPet", vec![], TypeRef::bean(&animal), |_, _| Ok(Value::Null))
            .method("getPet", vec![], TypeRef::bean(&dog), |_, _| Ok(Value::Null))
            .build();
        // Both share the signature `getPet()`, so the first declaration wins.
        let reflector = Reflector::new(&owner);
        assert_eq!(reflector.getter_type("pet").unwrap(), &TypeRef::bean(&animal));

        let base = ClassBuilder::new("Shelter")
            .method("getPet", vec![], TypeRef::bean(&animal), |_, _| Ok(Value::Null))
            .build();
        let kennel = ClassBuilder::new("Kennel")
            .extends(&base)
            .method("getPet", vec![], TypeRef::bean(&dog), |_, _| Ok(Value::Null))
            .build();
        let reflector = Reflector::new(&kennel);
        assert_eq!(reflector.getter_type("pet").unwrap(), &TypeRef::bean(&dog));
    }

    #[test]
    fn test_boolean_prefers_is_form() {
        let class = ClassBuilder::new("Flag")
            .field("on", TypeRef::Bool)
            .method("getOn", vec![], TypeRef::Bool, |_, _| Ok(Value::Bool(false)))
            .method("isOn", vec![], TypeRef::Bool, |_, _| Ok(Value::Bool(true)))
            .build();
        let reflector = Reflector::new(&class);
        let target = ObjectRef::new(Object::new(class.clone()));
        let value = reflector.get_get_invoker("on").unwrap().invoke(&target, &[]).unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_ambiguous_getter_is_dropped() {
        let class = ClassBuilder::new("Odd")
            .field("id", TypeRef::Long)
            .method("getId", vec![], TypeRef::Str, |_, _| Ok(Value::Null))
            .method("isId", vec![], TypeRef::Bool, |_, _| Ok(Value::Null))
            .build();
        let reflector = Reflector::new(&class);
        assert!(!reflector.has_getter("id"));
        // The field does not stand in for an ambiguous accessor.
        assert!(!reflector.has_setter("id"));
    }

    #[test]
    fn test_setter_conflict_prefers_getter_type() {
        let class = ClassBuilder::new("Amount")
            .field("value", TypeRef::Long)
            .getter_for("value")
            .method("setValue", vec![TypeRef::Str], TypeRef::Void, |_, _| Ok(Value::Null))
            .setter_for("value")
            .build();
        let reflector = Reflector::new(&class);
        assert_eq!(reflector.setter_type("value").unwrap(), &TypeRef::Long);
    }

    #[test]
    fn test_setter_conflict_picks_specific_type() {
        let class = ClassBuilder::new("Holder")
            .method("setItems", vec![TypeRef::collection(crate::types::CollectionKind::Collection)], TypeRef::Void, |_, _| Ok(Value::Null))
            .method("setItems", vec![TypeRef::list()], TypeRef::Void, |_, _| Ok(Value::Null))
            .build();
        let reflector = Reflector::new(&class);
        assert_eq!(reflector.setter_type("items").unwrap(), &TypeRef::list());

        let unrelated = ClassBuilder::new("Unrelated")
            .method("setX", vec![TypeRef::Str], TypeRef::Void, |_, _| Ok(Value::Null))
            .method("setX", vec![TypeRef::Int], TypeRef::Void, |_, _| Ok(Value::Null))
            .build();
        assert!(!Reflector::new(&unrelated).has_setter("x"));
    }

    #[test]
    fn test_field_fallback() {
        let class = ClassBuilder::new("Plain")
            .field("count", TypeRef::Int)
            .final_field("id", TypeRef::Long)
            .build();
        let reflector = Reflector::new(&class);
        assert!(reflector.has_getter("count"));
        assert!(reflector.has_setter("count"));
        assert!(reflector.has_getter("id"));
        assert!(!reflector.has_setter("id"));
        assert!(reflector.get_get_invoker("count").unwrap().is_field());
    }

    #[test]
    fn test_getter_only_property() {
        let class = ClassBuilder::new("Clock")
            .method("getNow", vec![], TypeRef::Long, |_, _| Ok(Value::Long(42)))
            .build();
        let reflector = Reflector::new(&class);
        assert!(reflector.has_getter("now"));
        assert!(!reflector.has_setter("now"));
        assert!(reflector.setter_type("now").is_err());
    }

    #[test]
    fn test_synthetic_methods_are_skipped_when_shadowed() {
        let class = ClassBuilder::new("Bridged")
            .synthetic_method("getValue", vec![], TypeRef::Any, |_, _| Ok(Value::Null))
            .method("getValue", vec![], TypeRef::Any, |_, _| Ok(Value::Int(1)))
            .build();
        let reflector = Reflector::new(&class);
        let target = ObjectRef::new(Object::new(class.clone()));
        let value = reflector.get_get_invoker("value").unwrap().invoke(&target, &[]).unwrap();
        assert_eq!(value, Value::Int(1));
    }

    #[test]
    fn test_acronym_property_name() {
        let class = ClassBuilder::new("Link")
            .method("getURL", vec![], TypeRef::Str, |_, _| Ok(Value::Null))
            .build();
        let reflector = Reflector::new(&class);
        assert_eq!(reflector.readable_property_names(), ["URL"]);
        assert_eq!(reflector.find_property_name("url"), Some("URL"));
    }

    #[test]
    fn test_abstract_class_has_no_default_constructor() {
        let class = ClassBuilder::new("Shape").abstract_class().build();
        assert!(!Reflector::new(&class).has_default_constructor());
    }
}
