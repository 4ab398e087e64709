use std::cell::Cell;

use super::*;
use crate::gpu::{gl::GlCaps, recording_gl::RecordingGl};

struct Dummy {
    name: Cell<u32>,
    bytes: usize,
    key: Option<u32>,
    releases: Rc<Cell<u32>>,
}

impl Dummy {
    fn new(name: u32, bytes: usize, key: Option<u32>, releases: &Rc<Cell<u32>>) -> Self {
        Self {
            name: Cell::new(name),
            bytes,
            key,
            releases: releases.clone(),
        }
    }
}

impl Resource for Dummy {
    fn memory_usage(&self) -> usize {
        self.bytes
    }

    fn compute_recycle_key(&self, key: &mut RecycleKey) {
        if let Some(k) = self.key {
            key.write_u32(k);
        }
    }

    fn on_release(&self, _gl: &GlInterface) {
        if self.name.get() > 0 {
            self.releases.set(self.releases.get() + 1);
            self.name.set(0);
        }
    }
}

fn gl() -> GlInterface {
    GlInterface {
        functions: RecordingGl::new(),
        caps: GlCaps::default(),
    }
}

fn key(v: u32) -> RecycleKey {
    let mut k = RecycleKey::new();
    k.write_u32(v);
    k
}

#[test]
fn idle_resource_is_recycled_but_referenced_one_is_not() {
    let releases = Rc::new(Cell::new(0));
    let mut cache = ResourceCache::new(ResourceCacheOpts::default());
    let a = cache
        .wrap(Dummy::new(1, 0, Some(7), &releases), None)
        .unwrap();

    assert!(cache.get_recycled::<Dummy>(&key(7)).is_none());

    drop(a);
    let again = cache.get_recycled::<Dummy>(&key(7)).unwrap();
    assert_eq!(again.name.get(), 1);
    assert_eq!(cache.stats().recycled_hits, 1);

    // Handed out again, so no longer idle.
    assert!(cache.get_recycled::<Dummy>(&key(7)).is_none());
}

#[test]
fn empty_key_opts_out_of_recycling() {
    let releases = Rc::new(Cell::new(0));
    let mut cache = ResourceCache::new(ResourceCacheOpts::default());
    drop(cache.wrap(Dummy::new(1, 0, None, &releases), None).unwrap());
    assert!(cache.get_recycled::<Dummy>(&RecycleKey::new()).is_none());
}

#[test]
fn purge_unreferenced_releases_only_idle_resources_once() {
    let releases = Rc::new(Cell::new(0));
    let gl = gl();
    let mut cache = ResourceCache::new(ResourceCacheOpts::default());
    let kept = cache
        .wrap(Dummy::new(1, 10, Some(1), &releases), None)
        .unwrap();
    drop(
        cache
            .wrap(Dummy::new(2, 20, Some(1), &releases), None)
            .unwrap(),
    );

    assert_eq!(cache.purge_unreferenced(&gl), 1);
    assert_eq!(releases.get(), 1);
    assert_eq!(kept.name.get(), 1);
    assert_eq!(cache.stats().resources, 1);
    assert_eq!(cache.stats().total_bytes, 10);

    assert_eq!(cache.purge_unreferenced(&gl), 0);
    assert_eq!(releases.get(), 1);
}

#[test]
fn stale_unique_key_never_resolves_to_a_slot_reuser() {
    let releases = Rc::new(Cell::new(0));
    let gl = gl();
    let mut cache = ResourceCache::new(ResourceCacheOpts::default());
    drop(
        cache
            .wrap(Dummy::new(1, 0, None, &releases), Some(key(99)))
            .unwrap(),
    );
    cache.purge_unreferenced(&gl);

    let _reuser = cache
        .wrap(Dummy::new(2, 0, None, &releases), None)
        .unwrap();
    assert!(cache.find_unique::<Dummy>(&key(99)).is_none());
}

#[test]
fn unique_lookup_shares_referenced_instances() {
    let releases = Rc::new(Cell::new(0));
    let mut cache = ResourceCache::new(ResourceCacheOpts::default());
    let a = cache
        .wrap(Dummy::new(5, 0, None, &releases), Some(key(3)))
        .unwrap();
    let b = cache.find_unique::<Dummy>(&key(3)).unwrap();
    assert!(Rc::ptr_eq(&a, &b));

    cache.remove_unique_key(&key(3));
    assert!(cache.find_unique::<Dummy>(&key(3)).is_none());
}

#[test]
fn per_key_cap_keeps_most_recent_idle_resources() {
    let releases = Rc::new(Cell::new(0));
    let gl = gl();
    let mut cache = ResourceCache::new(ResourceCacheOpts {
        max_bytes: usize::MAX,
        max_recyclable_per_key: 1,
    });
    for name in 1..=3 {
        drop(
            cache
                .wrap(Dummy::new(name, 0, Some(4), &releases), None)
                .unwrap(),
        );
    }
    cache.purge_to_budget(&gl);
    assert_eq!(releases.get(), 2);
    let survivor = cache.get_recycled::<Dummy>(&key(4)).unwrap();
    assert_eq!(survivor.name.get(), 3);
}

#[test]
fn byte_budget_evicts_least_recently_used_first() {
    let releases = Rc::new(Cell::new(0));
    let gl = gl();
    let mut cache = ResourceCache::new(ResourceCacheOpts {
        max_bytes: 100,
        max_recyclable_per_key: 16,
    });
    drop(
        cache
            .wrap(Dummy::new(1, 80, Some(1), &releases), None)
            .unwrap(),
    );
    drop(
        cache
            .wrap(Dummy::new(2, 80, Some(2), &releases), None)
            .unwrap(),
    );
    cache.purge_to_budget(&gl);

    assert_eq!(releases.get(), 1);
    assert_eq!(cache.stats().total_bytes, 80);
    assert!(cache.get_recycled::<Dummy>(&key(1)).is_none());
    assert!(cache.get_recycled::<Dummy>(&key(2)).is_some());
}

#[test]
fn release_all_reaches_referenced_resources() {
    let releases = Rc::new(Cell::new(0));
    let gl = gl();
    let mut cache = ResourceCache::new(ResourceCacheOpts::default());
    let held = cache
        .wrap(Dummy::new(1, 0, None, &releases), None)
        .unwrap();
    cache.release_all(&gl);
    assert_eq!(held.name.get(), 0);
    assert_eq!(releases.get(), 1);
    assert_eq!(cache.stats().resources, 0);
}
