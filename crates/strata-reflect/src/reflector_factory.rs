//! Reflector cache

use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHasher;

use crate::class::{ClassId, ClassRef};
use crate::reflector::Reflector;

/// Source of [`Reflector`]s
pub trait ReflectorFactory: Send + Sync {
    /// Whether reflectors are cached per class
    fn is_class_cache_enabled(&self) -> bool;

    /// Enable or disable caching of newly requested reflectors
    fn set_class_cache_enabled(&self, enabled: bool);

    /// Reflector for `class`
    fn find_for_class(&self, class: &ClassRef) -> Arc<Reflector>;
}

/// Reflector factory with a concurrent per-class cache
///
/// Concurrent first requests for one class converge on a single stored
/// reflector.
pub struct DefaultReflectorFactory {
    cache_enabled: AtomicBool,
    reflectors: DashMap<ClassId, Arc<Reflector>, BuildHasherDefault<FxHasher>>,
}

impl DefaultReflectorFactory {
    /// Create a factory with caching enabled
    pub fn new() -> Self {
        Self {
            cache_enabled: AtomicBool::new(true),
            reflectors: DashMap::default(),
        }
    }

    /// Number of cached reflectors
    pub fn cached_count(&self) -> usize {
        self.reflectors.len()
    }

    /// Drop every cached reflector
    pub fn clear(&self) {
        self.reflectors.clear();
    }
}

impl Default for DefaultReflectorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflectorFactory for DefaultReflectorFactory {
    fn is_class_cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::Acquire)
    }

    fn set_class_cache_enabled(&self, enabled: bool) {
        self.cache_enabled.store(enabled, Ordering::Release);
    }

    fn find_for_class(&self, class: &ClassRef) -> Arc<Reflector> {
        if !self.is_class_cache_enabled() {
            return Arc::new(Reflector::new(class));
        }
        if let Some(reflector) = self.reflectors.get(&class.id()) {
            return reflector.clone();
        }
        self.reflectors
            .entry(class.id())
            .or_insert_with(|| Arc::new(Reflector::new(class)))
            .clone()
    }
}
