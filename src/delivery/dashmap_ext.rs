use dashmap::DashMap;
use std::hash::Hash;

/// Extension helpers for `DashMap` that hand out owned values.
///
/// `DashMap::get()` and `DashMap::entry()` return guards holding a shard
/// lock. Client slots are locked again after lookup, so the shard guard
/// must be gone first; these helpers clone the value and drop the guard.
pub(crate) trait DashMapExt<K, V> {
    /// Clone the value for `key`.
    fn get_cloned(&self, key: &K) -> Option<V>;

    /// Clone the value for `key`, inserting `make()` first if absent.
    fn get_or_insert_cloned(&self, key: K, make: impl FnOnce() -> V) -> V;

    /// Clone every key.
    fn keys_cloned(&self) -> Vec<K>;
}

impl<K, V> DashMapExt<K, V> for DashMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get_cloned(&self, key: &K) -> Option<V> {
        self.get(key).map(|r| r.value().clone())
    }

    fn get_or_insert_cloned(&self, key: K, make: impl FnOnce() -> V) -> V {
        self.entry(key).or_insert_with(make).value().clone()
    }

    fn keys_cloned(&self) -> Vec<K> {
        self.iter().map(|e| e.key().clone()).collect()
    }
}
