//! Type aliases
//!
//! Configuration refers to types by short, case-insensitive names. Common
//! aliases are built in; domain classes are registered under their own
//! name or an explicit alias.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use strata_reflect::{ClassRef, CollectionKind, TypeRef};

use crate::error::{BindingError, BindingResult};

static BUILTIN_ALIASES: Lazy<Vec<(&'static str, TypeRef)>> = Lazy::new(|| {
    vec![
        ("string", TypeRef::Str),
        ("int", TypeRef::Int),
        ("integer", TypeRef::Int),
        ("long", TypeRef::Long),
        ("double", TypeRef::Double),
        ("boolean", TypeRef::Bool),
        ("object", TypeRef::Any),
        ("map", TypeRef::map()),
        ("hashmap", TypeRef::map()),
        ("list", TypeRef::list()),
        ("arraylist", TypeRef::list()),
        ("collection", TypeRef::collection(CollectionKind::Collection)),
        ("iterable", TypeRef::collection(CollectionKind::Iterable)),
        ("set", TypeRef::collection(CollectionKind::Set)),
        ("hashset", TypeRef::collection(CollectionKind::Set)),
        ("sortedset", TypeRef::collection(CollectionKind::SortedSet)),
        ("treeset", TypeRef::collection(CollectionKind::SortedSet)),
    ]
});

/// Case-insensitive alias table
#[derive(Debug, Clone)]
pub struct TypeAliasRegistry {
    aliases: FxHashMap<String, TypeRef>,
}

impl TypeAliasRegistry {
    /// Registry holding the built-in aliases
    pub fn new() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(alias, ty)| (alias.to_string(), ty.clone()))
            .collect();
        Self { aliases }
    }

    /// Register `class` under its own name
    pub fn register_class(&mut self, class: &ClassRef) {
        self.register(class.name(), TypeRef::bean(class));
    }

    /// Register `ty` under `alias`, replacing an earlier registration
    pub fn register(&mut self, alias: &str, ty: TypeRef) {
        let key = alias.to_lowercase();
        if let Some(previous) = self.aliases.get(&key) {
            if *previous != ty {
                log::debug!("Type alias '{}' rebound from {} to {}", alias, previous, ty);
            }
        }
        self.aliases.insert(key, ty);
    }

    /// Type registered under `alias`. Array types are written `alias[]`.
    pub fn resolve(&self, alias: &str) -> BindingResult<TypeRef> {
        let trimmed = alias.trim();
        if let Some(component) = trimmed.strip_suffix("[]") {
            return Ok(TypeRef::array_of(self.resolve(component)?));
        }
        self.aliases
            .get(&trimmed.to_lowercase())
            .cloned()
            .ok_or_else(|| BindingError::UnknownTypeAlias(alias.to_string()))
    }

    /// Registered aliases, sorted
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.aliases.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }
}

impl Default for TypeAliasRegistry {
    fn default() -> Self {
        Self::new()
    }
}
