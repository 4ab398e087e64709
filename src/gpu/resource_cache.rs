use std::{any::Any, collections::HashMap, rc::Rc};

use crate::{
    foundation::error::{WavyteError, WavyteResult},
    gpu::{gl::GlInterface, resource_key::RecycleKey},
};

/// A GPU object whose lifetime is governed by a [`ResourceCache`].
///
/// Handles live in `Cell`s so the cache can release them through a shared reference.
pub trait Resource: Any {
    /// Approximate GPU memory held, in bytes.
    fn memory_usage(&self) -> usize {
        0
    }

    /// Classify this resource for reuse. Leaving `key` empty opts out of recycling.
    fn compute_recycle_key(&self, _key: &mut RecycleKey) {}

    /// Free the underlying GL objects. Must be idempotent.
    fn on_release(&self, gl: &GlInterface);
}

/// Budget configuration for a [`ResourceCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ResourceCacheOpts {
    /// Upper bound for bytes held by unreferenced resources before they are purged.
    pub max_bytes: usize,
    /// Maximum number of idle resources retained per recycle key.
    pub max_recyclable_per_key: usize,
}

impl Default for ResourceCacheOpts {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024,
            max_recyclable_per_key: 16,
        }
    }
}

/// Counters exposed for diagnostics and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResourceCacheStats {
    /// Live resources (referenced or idle).
    pub resources: usize,
    /// Sum of `memory_usage` over live resources.
    pub total_bytes: usize,
    /// Resources registered through `wrap`.
    pub allocations: u64,
    /// Successful `get_recycled` lookups.
    pub recycled_hits: u64,
    /// Resources released by purges.
    pub purged: u64,
}

/// Generation-checked slot reference. A stale handle never resolves to a newer occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ResourceHandle {
    index: u32,
    generation: u32,
}

struct Entry {
    resource: Rc<dyn Resource>,
    recycle_key: RecycleKey,
    unique_key: Option<RecycleKey>,
    bytes: usize,
    last_used: u64,
}

impl Entry {
    // The cache itself holds one strong reference.
    fn is_idle(&self) -> bool {
        Rc::strong_count(&self.resource) == 1
    }
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Context-owned registry of GPU resources.
///
/// Every wrapped resource stays registered until it is purged or the cache is torn down. A
/// resource nobody else references is idle: it can be handed out again by
/// [`ResourceCache::get_recycled`] or released by a purge.
pub struct ResourceCache {
    opts: ResourceCacheOpts,
    stats: ResourceCacheStats,
    tick: u64,

    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    recyclable: HashMap<RecycleKey, Vec<ResourceHandle>>,
    unique: HashMap<RecycleKey, ResourceHandle>,
}

impl ResourceCache {
    /// Create an empty cache.
    pub fn new(opts: ResourceCacheOpts) -> Self {
        Self {
            opts,
            stats: ResourceCacheStats::default(),
            tick: 0,
            slots: Vec::new(),
            free_slots: Vec::new(),
            recyclable: HashMap::new(),
            unique: HashMap::new(),
        }
    }

    /// Current counters.
    pub fn stats(&self) -> ResourceCacheStats {
        self.stats.clone()
    }

    fn entry(&self, handle: ResourceHandle) -> Option<&Entry> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, handle: ResourceHandle) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }

    /// Register `resource`, optionally under a unique key, and return the shared handle.
    pub(crate) fn wrap<T: Resource>(
        &mut self,
        resource: T,
        unique_key: Option<RecycleKey>,
    ) -> WavyteResult<Rc<T>> {
        let typed = Rc::new(resource);
        let mut recycle_key = RecycleKey::new();
        typed.compute_recycle_key(&mut recycle_key);
        let bytes = typed.memory_usage();
        let last_used = self.next_tick();

        let entry = Entry {
            resource: typed.clone(),
            recycle_key: recycle_key.clone(),
            unique_key: unique_key.clone(),
            bytes,
            last_used,
        };

        let handle = match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                ResourceHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .map_err(|_| WavyteError::resource("resource slot index overflow"))?;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                ResourceHandle {
                    index,
                    generation: 0,
                }
            }
        };

        if !recycle_key.is_empty() {
            self.recyclable.entry(recycle_key).or_default().push(handle);
        }
        if let Some(key) = unique_key
            && let Some(previous) = self.unique.insert(key, handle)
            && let Some(old) = self.entry_mut(previous)
        {
            old.unique_key = None;
        }

        self.stats.resources = self.stats.resources.saturating_add(1);
        self.stats.total_bytes = self.stats.total_bytes.saturating_add(bytes);
        self.stats.allocations = self.stats.allocations.saturating_add(1);
        Ok(typed)
    }

    /// Return an idle resource registered under `key`, if any.
    pub(crate) fn get_recycled<T: Resource>(&mut self, key: &RecycleKey) -> Option<Rc<T>> {
        let handle = self
            .recyclable
            .get(key)?
            .iter()
            .copied()
            .find(|&h| self.entry(h).is_some_and(|e| e.is_idle()))?;
        let tick = self.next_tick();
        let entry = self.entry_mut(handle)?;
        let any: Rc<dyn Any> = entry.resource.clone();
        let typed = any.downcast::<T>().ok()?;
        entry.last_used = tick;
        self.stats.recycled_hits = self.stats.recycled_hits.saturating_add(1);
        tracing::debug!(key = ?key.words(), "recycled gpu resource");
        Some(typed)
    }

    /// Return the resource registered under unique `key`, referenced or not.
    pub(crate) fn find_unique<T: Resource>(&mut self, key: &RecycleKey) -> Option<Rc<T>> {
        let handle = *self.unique.get(key)?;
        let tick = self.next_tick();
        let entry = self.entry_mut(handle)?;
        let any: Rc<dyn Any> = entry.resource.clone();
        let typed = any.downcast::<T>().ok()?;
        entry.last_used = tick;
        Some(typed)
    }

    /// Detach unique `key`. The resource stays registered and becomes purgeable once idle.
    pub(crate) fn remove_unique_key(&mut self, key: &RecycleKey) {
        if let Some(handle) = self.unique.remove(key)
            && let Some(entry) = self.entry_mut(handle)
        {
            entry.unique_key = None;
        }
    }

    fn release(&mut self, gl: &GlInterface, handle: ResourceHandle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if slot.generation != handle.generation {
            return;
        }
        let Some(entry) = slot.entry.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.index);

        if !entry.recycle_key.is_empty()
            && let Some(handles) = self.recyclable.get_mut(&entry.recycle_key)
        {
            handles.retain(|&h| h != handle);
            if handles.is_empty() {
                self.recyclable.remove(&entry.recycle_key);
            }
        }
        if let Some(key) = &entry.unique_key
            && self.unique.get(key) == Some(&handle)
        {
            self.unique.remove(key);
        }

        entry.resource.on_release(gl);
        self.stats.resources = self.stats.resources.saturating_sub(1);
        self.stats.total_bytes = self.stats.total_bytes.saturating_sub(entry.bytes);
    }

    fn idle_handles(&self) -> Vec<(ResourceHandle, u64)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let entry = slot.entry.as_ref()?;
                entry.is_idle().then_some((
                    ResourceHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    entry.last_used,
                ))
            })
            .collect()
    }

    /// Release every idle resource. Returns the number released.
    pub(crate) fn purge_unreferenced(&mut self, gl: &GlInterface) -> usize {
        let idle = self.idle_handles();
        for &(handle, _) in &idle {
            self.release(gl, handle);
        }
        self.stats.purged = self.stats.purged.saturating_add(idle.len() as u64);
        if !idle.is_empty() {
            tracing::debug!(released = idle.len(), "purged idle gpu resources");
        }
        idle.len()
    }

    /// Enforce the per-key and byte budgets by releasing least recently used idle resources.
    pub(crate) fn purge_to_budget(&mut self, gl: &GlInterface) {
        let mut idle = self.idle_handles();
        idle.sort_by_key(|&(_, last_used)| last_used);

        let mut victims = Vec::new();
        let mut idle_per_key: HashMap<&RecycleKey, usize> = HashMap::new();
        for &(handle, _) in idle.iter().rev() {
            let Some(entry) = self.entry(handle) else {
                continue;
            };
            if entry.recycle_key.is_empty() {
                continue;
            }
            let count = idle_per_key.entry(&entry.recycle_key).or_default();
            *count += 1;
            if *count > self.opts.max_recyclable_per_key {
                victims.push(handle);
            }
        }

        let mut released = 0u64;
        for handle in victims {
            self.release(gl, handle);
            released += 1;
        }
        for (handle, _) in idle {
            if self.stats.total_bytes <= self.opts.max_bytes {
                break;
            }
            if self.entry(handle).is_some() {
                self.release(gl, handle);
                released += 1;
            }
        }
        self.stats.purged = self.stats.purged.saturating_add(released);
    }

    /// Release every resource, referenced or not. Outstanding handles keep zeroed GL names.
    pub(crate) fn release_all(&mut self, gl: &GlInterface) {
        let live: Vec<ResourceHandle> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.entry.is_some())
            .map(|(index, slot)| ResourceHandle {
                index: index as u32,
                generation: slot.generation,
            })
            .collect();
        for handle in live {
            self.release(gl, handle);
        }
        self.recyclable.clear();
        self.unique.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/resource_cache.rs"]
mod tests;
