//! The client-facing platform the engine drives.
//!
//! Everything version- or vendor-specific sits behind [`ProxyPlatform`]:
//! packet encoding, the native list of applied packs, disconnects. The
//! platform's capabilities are probed once when the coordinator is built;
//! per-client protocol support comes from [`PackSupport::for_protocol`].

mod scheduler;
mod support;

pub use scheduler::{Scheduler, TokioScheduler};
pub use support::{MIN_PACK_PROTOCOL, MIN_STACKING_PROTOCOL, PackSupport, PlatformCapabilities};

use crate::delivery::ClientId;
use crate::error::PlatformError;
use crate::pack::{PackHash, PackId, ResourcePack};
use async_trait::async_trait;

/// A pack the platform reports as applied on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPack {
    pub id: PackId,
    pub url: String,
}

/// Everything the platform needs to send one pack.
///
/// Taken from the pack's source at send time, so a mirrored url/hash update
/// reaches the next delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackDelivery {
    pub id: PackId,
    pub name: String,
    pub url: String,
    pub hash: Option<PackHash>,
    pub format: Option<i32>,
}

impl PackDelivery {
    pub fn of(pack: &ResourcePack) -> Self {
        let source = pack.source();
        Self {
            id: pack.id(),
            name: pack.name().to_string(),
            url: source.url.clone(),
            hash: source.hash,
            format: pack.format(),
        }
    }
}

/// Capability interface to the proxy and its connected clients.
#[async_trait]
pub trait ProxyPlatform: Send + Sync + 'static {
    /// Probed once when the coordinator is built.
    fn capabilities(&self) -> PlatformCapabilities;

    /// Backend server the client is on, if any.
    fn current_server_of(&self, client: ClientId) -> Option<String>;

    fn is_authenticated(&self, client: ClientId) -> bool;

    /// Protocol version of a connected client; `None` once it is gone.
    fn protocol_of(&self, client: ClientId) -> Option<u32>;

    /// Packs the client platform natively reports as applied.
    fn applied_packs(&self, _client: ClientId) -> Vec<AppliedPack> {
        Vec::new()
    }

    fn connected_clients(&self) -> Vec<ClientId>;

    /// Hand a pack to the network layer. The outcome arrives later as
    /// status reports.
    async fn send_pack(&self, client: ClientId, pack: &PackDelivery) -> Result<(), PlatformError>;

    /// Remove one pack, or every pack when `pack` is `None`.
    async fn remove_pack(&self, _client: ClientId, _pack: Option<PackId>) -> Result<(), PlatformError> {
        Err(PlatformError::UnsupportedByPlatform("remove_pack"))
    }

    async fn disconnect(&self, client: ClientId, reason: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_snapshot_follows_current_source() {
        let pack = ResourcePack::new("lobby", "https://old", None).with_format(Some(15));
        let first = PackDelivery::of(&pack);

        pack.set_source("https://new", None);
        let second = PackDelivery::of(&pack);

        assert_eq!(first.url, "https://old");
        assert_eq!(second.url, "https://new");
        assert_eq!(second.id, pack.id());
        assert_eq!(second.format, Some(15));
    }
}
