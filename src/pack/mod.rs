//! Resource packs and the pack registry.
//!
//! A [`ResourcePack`] has a stable id and name for its whole life. Its
//! download source (url + hash) may be swapped in place when an external
//! system publishes a new build; the next delivery picks it up.

mod hash;
mod registry;

pub use hash::{HASH_LEN, HashError, PackHash};
pub use registry::PackRegistry;

use parking_lot::RwLock;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Stable pack identifier.
pub type PackId = Uuid;

/// Where a client downloads a pack from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSource {
    pub url: String,
    pub hash: Option<PackHash>,
}

/// A known resource pack.
///
/// Equality and hashing use the id only.
pub struct ResourcePack {
    id: PackId,
    name: String,
    format: Option<i32>,
    source: RwLock<Arc<PackSource>>,
}

impl ResourcePack {
    /// Create a pack whose id is derived from its (case-folded) name.
    pub fn new(name: impl Into<String>, url: impl Into<String>, hash: Option<PackHash>) -> Self {
        let name = name.into();
        Self::with_id(derive_id(&name), name, url, hash)
    }

    /// Create a pack with an explicit id.
    pub fn with_id(
        id: PackId,
        name: impl Into<String>,
        url: impl Into<String>,
        hash: Option<PackHash>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            format: None,
            source: RwLock::new(Arc::new(PackSource {
                url: url.into(),
                hash,
            })),
        }
    }

    pub fn with_format(mut self, format: Option<i32>) -> Self {
        self.format = format;
        self
    }

    pub fn id(&self) -> PackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Option<i32> {
        self.format
    }

    /// Snapshot of the current download source.
    pub fn source(&self) -> Arc<PackSource> {
        self.source.read().clone()
    }

    pub fn url(&self) -> String {
        self.source.read().url.clone()
    }

    pub fn hash(&self) -> Option<PackHash> {
        self.source.read().hash
    }

    /// Replace the download source. Readers see either the old or the new
    /// source, never a mix.
    pub fn set_source(&self, url: impl Into<String>, hash: Option<PackHash>) {
        *self.source.write() = Arc::new(PackSource {
            url: url.into(),
            hash,
        });
    }
}

/// Name-derived id used when the configuration gives none.
pub fn derive_id(name: &str) -> PackId {
    let key = format!("packrouter:pack:{}", name.to_lowercase());
    Uuid::new_v3(&Uuid::NAMESPACE_URL, key.as_bytes())
}

impl PartialEq for ResourcePack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResourcePack {}

impl Hash for ResourcePack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ResourcePack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.source();
        f.debug_struct("ResourcePack")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &source.url)
            .field("hash", &source.hash)
            .field("format", &self.format)
            .finish()
    }
}
