//! The shared delivery path.
//!
//! Every transition that sends packs goes through here: gate the client,
//! resolve, skip what it already holds, join or open handles, then hand each
//! pack to the platform with no tracker lock held.

use super::EventCoordinator;
use crate::delivery::{ClientId, DeliveryHandle, SessionTicket};
use crate::error::{DeliveryError, PlatformError};
use crate::pack::ResourcePack;
use crate::platform::{PackDelivery, PackSupport};
use crate::telemetry::spans;
use std::sync::Arc;
use tracing::{Instrument, debug, error, trace, warn};

impl EventCoordinator {
    /// Resolve and deliver for the client's current server.
    ///
    /// `None` means the client is not eligible right now (gone, not
    /// authenticated, too old, or overridden by its backend).
    pub(super) async fn deliver(
        &self,
        ticket: &SessionTicket,
    ) -> Result<Option<Vec<DeliveryHandle>>, DeliveryError> {
        let client = ticket.client;
        if ticket.is_cancelled() {
            trace!(client = %client, "Session ended before delivery");
            return Ok(None);
        }
        if self.engine.tracker().has_backend_override(client) {
            debug!(client = %client, "Backend pack active, not sending");
            return Ok(None);
        }
        if !self.platform.is_authenticated(client) {
            debug!(client = %client, "Client not authenticated, not sending");
            return Ok(None);
        }
        let Some(support) = self.support_of(client) else {
            return Ok(None);
        };

        let server = self.platform.current_server_of(client);
        let resolution = self.engine.catalog().resolve(server.as_deref(), false);
        let packs = match resolution.for_client(support.can_stack()) {
            Ok(packs) => packs,
            Err(e) => {
                warn!(
                    client = %client,
                    error = %e,
                    code = e.error_code(),
                    "Client cannot stack packs, sending primary only"
                );
                resolution.primary_only()
            }
        };

        if packs.is_empty() {
            trace!(client = %client, server = ?server, "Nothing assigned");
        }
        self.send_packs(ticket, packs).await.map(Some)
    }

    /// What the client can receive, capped by the platform.
    ///
    /// `None` when the client is gone or too old for resource packs.
    pub(super) fn support_of(&self, client: ClientId) -> Option<PackSupport> {
        let protocol = self.platform.protocol_of(client)?;
        let support = PackSupport::for_protocol(protocol).limit(self.caps);
        if !support.can_receive() {
            let e = PlatformError::ProtocolTooOld { protocol };
            warn!(client = %client, error = %e, code = e.error_code(), "Not sending resource packs");
            return None;
        }
        Some(support)
    }

    /// Open (or join) a delivery for each pack the client does not hold yet.
    pub(super) async fn send_packs(
        &self,
        ticket: &SessionTicket,
        packs: &[Arc<ResourcePack>],
    ) -> Result<Vec<DeliveryHandle>, DeliveryError> {
        let client = ticket.client;
        let tracker = self.engine.tracker();
        let applied = self.platform.applied_packs(client);
        let mut handles = Vec::with_capacity(packs.len());

        for pack in packs {
            if tracker.is_confirmed(client, pack, &applied) {
                debug!(client = %client, pack = %pack.name(), "Client already has pack");
                continue;
            }
            if let Some(handle) = tracker.pending_handle(client, pack.id()) {
                trace!(client = %client, pack = %pack.name(), "Joining pending delivery");
                handles.push(handle);
                continue;
            }

            let handle = match tracker.begin_delivery_for(ticket, pack.id()) {
                Ok(handle) => handle,
                Err(DeliveryError::ClientGone(_)) => {
                    debug!(client = %client, "Client left during delivery");
                    return Ok(Vec::new());
                }
                Err(DeliveryError::AlreadyConfirmed { .. }) => {
                    debug!(client = %client, pack = %pack.name(), "Confirmed before delivery opened");
                    continue;
                }
                Err(e) => match tracker.pending_handle(client, pack.id()) {
                    // Lost a race with a concurrent transition; share its handle.
                    Some(handle) => {
                        handles.push(handle);
                        continue;
                    }
                    None => {
                        error!(
                            client = %client,
                            pack = %pack.name(),
                            error = %e,
                            code = e.error_code(),
                            "Delivery bookkeeping violated"
                        );
                        return Err(e);
                    }
                },
            };

            let name = pack.name().to_string();
            handle.on_complete(move |outcome| {
                debug!(client = %client, pack = %name, confirmed = outcome.is_confirmed(), "Delivery resolved");
            });

            let delivery = PackDelivery::of(pack);
            let sent = self
                .platform
                .send_pack(client, &delivery)
                .instrument(spans::delivery(&client, pack.name()))
                .await;
            if let Err(e) = sent {
                warn!(
                    client = %client,
                    pack = %pack.name(),
                    error = %e,
                    code = e.error_code(),
                    "Failed to send pack"
                );
                tracker.resolve(client, pack.id(), false);
            }
            handles.push(handle);
        }

        Ok(handles)
    }
}
