//! Catalog of known packs.

use super::{PackHash, PackId, ResourcePack};
use crate::error::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable-after-load catalog of packs, indexed by case-folded name and id.
///
/// A reload builds a fresh registry and swaps it in whole; there is no
/// removal. Pack sources can still be updated in place through
/// [`update_source`](Self::update_source).
#[derive(Debug, Default)]
pub struct PackRegistry {
    by_name: HashMap<String, Arc<ResourcePack>>,
    by_id: HashMap<PackId, Arc<ResourcePack>>,
    /// Registration order, for stable listings.
    order: Vec<PackId>,
}

impl PackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pack. Names are unique ignoring case; ids are unique.
    pub fn register(&mut self, pack: ResourcePack) -> Result<Arc<ResourcePack>, RegistryError> {
        let key = pack.name().to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(RegistryError::DuplicateName(pack.name().to_string()));
        }
        if self.by_id.contains_key(&pack.id()) {
            return Err(RegistryError::DuplicateId(pack.id()));
        }

        let pack = Arc::new(pack);
        self.order.push(pack.id());
        self.by_id.insert(pack.id(), pack.clone());
        self.by_name.insert(key, pack.clone());
        Ok(pack)
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<ResourcePack>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    pub fn lookup_by_id(&self, id: &PackId) -> Option<Arc<ResourcePack>> {
        self.by_id.get(id).cloned()
    }

    /// Mirror a new url/hash into a registered pack.
    ///
    /// Returns `false` when no pack has that name.
    pub fn update_source(&self, name: &str, url: &str, hash: Option<PackHash>) -> bool {
        match self.by_name.get(&name.to_lowercase()) {
            Some(pack) => {
                pack.set_source(url, hash);
                true
            }
            None => false,
        }
    }

    /// All packs in registration order.
    pub fn packs(&self) -> impl Iterator<Item = &Arc<ResourcePack>> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
