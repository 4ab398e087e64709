use std::{cell::RefCell, rc::Rc};

use crate::{
    foundation::error::{WavyteError, WavyteResult},
    gpu::{
        gl::{GlCaps, GlFunctions, GlInterface},
        resource_cache::{Resource, ResourceCache, ResourceCacheOpts, ResourceCacheStats},
        resource_key::RecycleKey,
    },
};

/// Options for a [`Context`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContextOpts {
    /// Resource cache budgets.
    pub resource_cache: ResourceCacheOpts,
}

impl ContextOpts {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> WavyteResult<Self> {
        serde_json::from_str(json).map_err(|e| WavyteError::serde(e.to_string()))
    }
}

/// A GL interface plus the resource cache bound to it.
///
/// Single-threaded by construction: the context, and every resource it hands out, must stay on
/// the thread that owns the underlying GL context. Dropping the context releases every resource
/// it still tracks, so it must be dropped while the GL context is current.
pub struct Context {
    gl: GlInterface,
    cache: RefCell<ResourceCache>,
}

impl Context {
    /// Bind a new context to `functions`.
    pub fn new(functions: Rc<dyn GlFunctions>, caps: GlCaps, opts: ContextOpts) -> Self {
        Self {
            gl: GlInterface { functions, caps },
            cache: RefCell::new(ResourceCache::new(opts.resource_cache)),
        }
    }

    /// The GL interface of this context.
    pub fn gl(&self) -> &GlInterface {
        &self.gl
    }

    /// Register `resource` with the cache, then trim idle resources over budget.
    pub fn wrap<T: Resource>(&self, resource: T) -> WavyteResult<Rc<T>> {
        let mut cache = self.cache.borrow_mut();
        let wrapped = cache.wrap(resource, None)?;
        cache.purge_to_budget(&self.gl);
        Ok(wrapped)
    }

    /// Register `resource` so later [`Context::find_unique`] calls with `key` return it.
    pub fn wrap_unique<T: Resource>(&self, resource: T, key: RecycleKey) -> WavyteResult<Rc<T>> {
        let mut cache = self.cache.borrow_mut();
        let wrapped = cache.wrap(resource, Some(key))?;
        cache.purge_to_budget(&self.gl);
        Ok(wrapped)
    }

    /// An idle resource registered under `key`, if any.
    pub fn get_recycled<T: Resource>(&self, key: &RecycleKey) -> Option<Rc<T>> {
        self.cache.borrow_mut().get_recycled(key)
    }

    /// The shared resource registered under unique `key`, if any.
    pub fn find_unique<T: Resource>(&self, key: &RecycleKey) -> Option<Rc<T>> {
        self.cache.borrow_mut().find_unique(key)
    }

    /// Stop sharing the resource registered under unique `key`.
    pub fn remove_unique_key(&self, key: &RecycleKey) {
        self.cache.borrow_mut().remove_unique_key(key);
    }

    /// Release every idle resource. Returns the number released.
    pub fn purge_unreferenced(&self) -> usize {
        self.cache.borrow_mut().purge_unreferenced(&self.gl)
    }

    /// Cache counters.
    pub fn stats(&self) -> ResourceCacheStats {
        self.cache.borrow().stats()
    }

    /// Release every tracked resource, including ones still referenced.
    pub fn release_all(&self) {
        self.cache.borrow_mut().release_all(&self.gl);
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.cache.get_mut().release_all(&self.gl);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("gl", &self.gl)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/context.rs"]
mod tests;
