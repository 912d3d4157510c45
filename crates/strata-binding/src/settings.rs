//! Runtime settings (strata.toml)

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BindingResult;

/// Settings that shape reflection and property navigation
///
/// ```toml
/// reflector_cache_enabled = true
/// auto_grow_collections = true
/// map_underscore_to_camel_case = true
///
/// [object_factory_properties]
/// capacity = "16"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Cache one reflector per class
    pub reflector_cache_enabled: bool,

    /// Grow lists on indexed writes past their end
    pub auto_grow_collections: bool,

    /// Ignore underscores when resolving property names (`user_name` -> `userName`)
    pub map_underscore_to_camel_case: bool,

    /// Properties handed to the object factory
    pub object_factory_properties: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reflector_cache_enabled: true,
            auto_grow_collections: false,
            map_underscore_to_camel_case: false,
            object_factory_properties: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> BindingResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> BindingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> BindingResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
