//! Runtime configuration
//!
//! A `Configuration` ties the settings to the factories used for property
//! navigation. It is shared by sessions and handed to method factories when
//! handlers are built.

use std::sync::Arc;

use strata_reflect::{
    DefaultObjectFactory, DefaultObjectWrapperFactory, DefaultReflectorFactory, MetaContext,
    MetaObject, ObjectFactory, ObjectWrapperFactory, ReflectorFactory, TypeRef, Value,
};

use crate::error::BindingResult;
use crate::settings::Settings;
use crate::type_alias::TypeAliasRegistry;

/// Settings plus the factories derived from them
pub struct Configuration {
    settings: Settings,
    type_aliases: TypeAliasRegistry,
    object_factory: Arc<dyn ObjectFactory>,
    wrapper_factory: Arc<dyn ObjectWrapperFactory>,
    reflector_factory: Arc<dyn ReflectorFactory>,
}

impl Configuration {
    /// Configuration with default settings
    pub fn new() -> Self {
        Self::from_settings(Settings::default())
    }

    /// Configuration wired from `settings`
    pub fn from_settings(settings: Settings) -> Self {
        let mut object_factory = DefaultObjectFactory::new();
        object_factory.set_properties(&settings.object_factory_properties);

        let reflector_factory = DefaultReflectorFactory::new();
        reflector_factory.set_class_cache_enabled(settings.reflector_cache_enabled);

        log::debug!(
            "Configuration: reflector cache {}, auto-grow {}, camel-case mapping {}",
            settings.reflector_cache_enabled,
            settings.auto_grow_collections,
            settings.map_underscore_to_camel_case
        );

        Self {
            settings,
            type_aliases: TypeAliasRegistry::new(),
            object_factory: Arc::new(object_factory),
            wrapper_factory: Arc::new(DefaultObjectWrapperFactory),
            reflector_factory: Arc::new(reflector_factory),
        }
    }

    /// Parse settings from TOML and wire a configuration
    pub fn from_toml_str(content: &str) -> BindingResult<Self> {
        Ok(Self::from_settings(Settings::from_toml_str(content)?))
    }

    /// Replace the object factory; it is configured from the settings first
    pub fn with_object_factory<F: ObjectFactory + 'static>(mut self, mut factory: F) -> Self {
        factory.set_properties(&self.settings.object_factory_properties);
        self.object_factory = Arc::new(factory);
        self
    }

    /// Replace the wrapper factory
    pub fn with_wrapper_factory(mut self, factory: Arc<dyn ObjectWrapperFactory>) -> Self {
        self.wrapper_factory = factory;
        self
    }

    /// Replace the reflector factory
    pub fn with_reflector_factory(mut self, factory: Arc<dyn ReflectorFactory>) -> Self {
        factory.set_class_cache_enabled(self.settings.reflector_cache_enabled);
        self.reflector_factory = factory;
        self
    }

    /// Active settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Alias table
    pub fn type_aliases(&self) -> &TypeAliasRegistry {
        &self.type_aliases
    }

    /// Alias table, for registration
    pub fn type_aliases_mut(&mut self) -> &mut TypeAliasRegistry {
        &mut self.type_aliases
    }

    /// Resolve a type alias
    pub fn resolve_type(&self, alias: &str) -> BindingResult<TypeRef> {
        self.type_aliases.resolve(alias)
    }

    /// Object factory
    pub fn object_factory(&self) -> &Arc<dyn ObjectFactory> {
        &self.object_factory
    }

    /// Wrapper factory
    pub fn wrapper_factory(&self) -> &Arc<dyn ObjectWrapperFactory> {
        &self.wrapper_factory
    }

    /// Reflector factory
    pub fn reflector_factory(&self) -> &Arc<dyn ReflectorFactory> {
        &self.reflector_factory
    }

    /// Whether property names are matched ignoring underscores
    pub fn is_map_underscore_to_camel_case(&self) -> bool {
        self.settings.map_underscore_to_camel_case
    }

    /// Navigation context for meta objects created by this configuration
    pub fn meta_context(&self) -> MetaContext {
        MetaContext::new(
            self.object_factory.clone(),
            self.wrapper_factory.clone(),
            self.reflector_factory.clone(),
        )
        .with_auto_grow_collections(self.settings.auto_grow_collections)
    }

    /// Meta object over `object`
    pub fn new_meta_object(&self, object: Value) -> MetaObject {
        MetaObject::with_context(object, self.meta_context())
    }

    /// Canonical property name on `meta`, honoring the camel-case setting
    pub fn find_property(&self, meta: &MetaObject, name: &str) -> Option<String> {
        meta.find_property(name, self.settings.map_underscore_to_camel_case)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
