//! The pack engine - shared state for one proxied network.
//!
//! The hosting process builds one engine at startup and hands it to the
//! [`EventCoordinator`](crate::coordinator::EventCoordinator). The engine
//! owns the swappable catalog, the delivery tracker and the reloadable
//! settings; it never talks to clients itself.

use crate::catalog::{Catalog, CatalogCell};
use crate::config::{Config, ConfigWarning, MessagesConfig};
use crate::delivery::DeliveryTracker;
use crate::error::RegistryError;
use parking_lot::RwLock;
use std::sync::Arc;

/// Settings that follow the configuration across reloads.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub messages: MessagesConfig,
    /// Disconnect on failed downloads as well as refusals.
    pub kick_on_failure: bool,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            messages: config.messages.clone(),
            kick_on_failure: config.engine.kick_on_failure,
        }
    }
}

/// Catalog, tracker and settings of one network.
#[derive(Default)]
pub struct PackEngine {
    catalog: CatalogCell,
    tracker: DeliveryTracker,
    settings: RwLock<Arc<EngineSettings>>,
}

impl PackEngine {
    pub fn new(catalog: Catalog, settings: EngineSettings) -> Self {
        Self {
            catalog: CatalogCell::new(catalog),
            tracker: DeliveryTracker::new(),
            settings: RwLock::new(Arc::new(settings)),
        }
    }

    /// Build an engine from configuration, returning its warnings.
    pub fn from_config(config: &Config) -> Result<(Self, Vec<ConfigWarning>), RegistryError> {
        let (catalog, warnings) = Catalog::from_config(config)?;
        Ok((Self::new(catalog, EngineSettings::from_config(config)), warnings))
    }

    /// Snapshot of the current catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.load()
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    pub fn settings(&self) -> Arc<EngineSettings> {
        self.settings.read().clone()
    }

    /// Atomically install a new catalog and settings.
    pub fn install(&self, catalog: Catalog, settings: EngineSettings) -> Arc<Catalog> {
        let previous = self.catalog.swap(catalog);
        *self.settings.write() = Arc::new(settings);
        previous
    }
}
