//! The pack catalog: registry plus assignment store, built from config.
//!
//! A catalog is never mutated after it is built (pack sources aside).
//! Reload builds a new one and swaps it into the [`CatalogCell`]; readers
//! holding the old `Arc` finish against a consistent snapshot.

use crate::assignment::{Assignment, AssignmentStore, Resolution, resolve};
use crate::config::{AssignmentBlock, Config, ConfigWarning, validate};
use crate::error::RegistryError;
use crate::pack::{PackHash, PackRegistry, ResourcePack};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry and assignment rules loaded together.
#[derive(Debug, Default)]
pub struct Catalog {
    pub registry: PackRegistry,
    pub store: AssignmentStore,
    /// Pack sent to clear a client that cannot remove packs.
    pub empty: Option<Arc<ResourcePack>>,
}

impl Catalog {
    pub fn new(registry: PackRegistry, store: AssignmentStore) -> Self {
        Self {
            registry,
            store,
            empty: None,
        }
    }

    /// Build a catalog from configuration.
    ///
    /// Configuration problems are returned as warnings and the affected slot
    /// is left empty. Only an id collision between two packs fails the build.
    pub fn from_config(config: &Config) -> Result<(Self, Vec<ConfigWarning>), RegistryError> {
        let warnings = validate(config);
        let mut registry = PackRegistry::new();

        for (name, block) in &config.packs {
            if block.url.trim().is_empty() {
                continue;
            }
            let hash = block
                .hash
                .as_deref()
                .filter(|h| !h.is_empty())
                .and_then(|h| PackHash::from_hex(h).ok());
            let pack = match block.uuid {
                Some(id) => ResourcePack::with_id(id, name.as_str(), block.url.trim(), hash),
                None => ResourcePack::new(name.as_str(), block.url.trim(), hash),
            }
            .with_format(block.format);

            match registry.register(pack) {
                Ok(pack) => debug!(pack = %pack.name(), id = %pack.id(), "Registered pack"),
                // Already reported by validation.
                Err(RegistryError::DuplicateName(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let mut store = AssignmentStore::new(build_assignment(&registry, &config.global));
        for (server, block) in &config.servers {
            store.insert(server.clone(), build_assignment(&registry, block));
        }

        let empty = config
            .empty
            .as_deref()
            .and_then(|name| registry.lookup_by_name(name));

        Ok((
            Self {
                registry,
                store,
                empty,
            },
            warnings,
        ))
    }

    /// Resolve packs for a server against this catalog.
    pub fn resolve(&self, server: Option<&str>, backend_override: bool) -> Resolution {
        resolve(&self.store, server, backend_override)
    }
}

/// Secondary packs are looked up by their own names.
fn build_assignment(registry: &PackRegistry, block: &AssignmentBlock) -> Assignment {
    Assignment {
        primary: block.pack_name().and_then(|name| registry.lookup_by_name(name)),
        secondary: block
            .secondary
            .iter()
            .filter_map(|name| registry.lookup_by_name(name))
            .collect(),
        send_delay: block.send_delay,
    }
}

/// Swap cell holding the current catalog.
#[derive(Debug, Default)]
pub struct CatalogCell {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogCell {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Snapshot of the current catalog.
    pub fn load(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    /// Install a new catalog, returning the previous one.
    pub fn swap(&self, catalog: Catalog) -> Arc<Catalog> {
        std::mem::replace(&mut *self.current.write(), Arc::new(catalog))
    }
}

/// Log every configuration warning at `warn`.
pub fn report_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        warn!(%warning, "Configuration problem");
    }
}
