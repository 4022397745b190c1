//! Event coordinator - drives resolution and delivery from client events.
//!
//! Per client: `AwaitingAuth -> ConfigPhase <-> OnServer -> Disconnected`.
//! The coordinator reacts to the platform's lifecycle events, asks the
//! catalog what a client should hold, and opens deliveries through the
//! tracker. It never touches client state except through tracker
//! operations.
//!
//! Sends go to the platform with no lock held; only tracker transitions
//! are locked, and those per client.

mod admin;
mod deliver;
mod status;

pub use admin::ReloadReport;
pub use status::PackStatus;

use crate::delivery::{
    ClientId, ClientSummary, DeliveryHandle, DeliveryOutcome, DeliveryTracker, settle_all,
};
use crate::engine::PackEngine;
use crate::error::DeliveryError;
use crate::pack::PackId;
use crate::platform::{PlatformCapabilities, ProxyPlatform, Scheduler};
use crate::telemetry::spans;
use std::sync::Arc;
use tracing::{Instrument, debug, info, warn};

/// What a server switch did for a client.
#[derive(Debug)]
pub enum SwitchOutcome {
    /// Delivery was scheduled after this many ticks.
    Scheduled { ticks: u64 },
    /// Delivery ran now; these handles were opened or joined.
    Delivered(Vec<DeliveryHandle>),
    /// The configuration phase already delivered for this transition.
    AppliedInConfigPhase,
}

impl SwitchOutcome {
    /// Handles opened or joined by an immediate delivery.
    pub fn handles(&self) -> &[DeliveryHandle] {
        match self {
            Self::Delivered(handles) => handles,
            _ => &[],
        }
    }
}

/// Reacts to client lifecycle events for one network.
///
/// Cheap to clone; clones share the engine, platform and scheduler.
#[derive(Clone)]
pub struct EventCoordinator {
    engine: Arc<PackEngine>,
    platform: Arc<dyn ProxyPlatform>,
    scheduler: Arc<dyn Scheduler>,
    caps: PlatformCapabilities,
}

impl EventCoordinator {
    /// Build a coordinator. Platform capabilities are probed here, once.
    pub fn new(
        engine: Arc<PackEngine>,
        platform: Arc<dyn ProxyPlatform>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let caps = platform.capabilities();
        info!(
            stacking = caps.stacking,
            removal = caps.removal,
            "Pack coordinator ready"
        );
        Self {
            engine,
            platform,
            scheduler,
            caps,
        }
    }

    pub fn engine(&self) -> &Arc<PackEngine> {
        &self.engine
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.caps
    }

    /// A client entered the configuration phase.
    ///
    /// With no send delay, packs are delivered now and the returned future
    /// completes once every delivery has resolved, or as soon as the client
    /// disconnects. The handshake should await it but may continue on any
    /// outcome. With a send delay nothing is sent here; the following
    /// switch delivers.
    pub async fn on_client_enter_config_phase(
        &self,
        client: ClientId,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let span = spans::client(&client, "config_phase");
        async move {
            let tracker = self.engine.tracker();
            tracker.set_backend_override(client, false);
            let Some(ticket) = self.while_connected(client, |t| t.open(client)) else {
                return Ok(DeliveryOutcome::Failed);
            };

            let catalog = self.engine.catalog();
            let server = self.platform.current_server_of(client);
            let resolution = catalog.resolve(server.as_deref(), false);
            if resolution.send_delay > 0 {
                debug!(ticks = resolution.send_delay, "Send delay set, deferring to switch");
                return Ok(DeliveryOutcome::Confirmed);
            }

            let Some(handles) = self.deliver(&ticket).await? else {
                return Ok(DeliveryOutcome::Confirmed);
            };

            let outcome = tokio::select! {
                outcome = settle_all(handles) => outcome,
                _ = ticket.cancelled() => DeliveryOutcome::Failed,
            };
            tracker.mark_config_phase(client);

            if outcome.is_confirmed() {
                debug!("Allowing configuration phase to continue");
            } else {
                debug!("Allowing configuration phase to continue although not every pack applied");
            }
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// A client finished switching to a (new) backend server.
    pub async fn on_client_server_switch(&self, client: ClientId) -> Result<SwitchOutcome, DeliveryError> {
        let span = spans::client(&client, "server_switch");
        async move {
            let tracker = self.engine.tracker();
            tracker.set_backend_override(client, false);
            let Some(ticket) = self.while_connected(client, |t| t.open(client)) else {
                return Ok(SwitchOutcome::Delivered(Vec::new()));
            };
            let applied_in_config_phase = tracker.take_config_phase(client);

            let server = self.platform.current_server_of(client);
            let ticks = self
                .engine
                .catalog()
                .resolve(server.as_deref(), false)
                .send_delay;

            if ticks > 0 {
                let this = self.clone();
                let fire = ticket.clone();
                self.scheduler.schedule(
                    ticks,
                    ticket.token(),
                    Box::pin(async move {
                        // Server context is taken at fire time.
                        if let Err(e) = this.deliver(&fire).await {
                            warn!(client = %fire.client, error = %e, "Delayed delivery failed");
                        }
                    }),
                );
                debug!(ticks, "Scheduled delivery");
                return Ok(SwitchOutcome::Scheduled { ticks });
            }

            if applied_in_config_phase {
                debug!("Packs already delivered in configuration phase");
                return Ok(SwitchOutcome::AppliedInConfigPhase);
            }

            let handles = self.deliver(&ticket).await?.unwrap_or_default();
            Ok(SwitchOutcome::Delivered(handles))
        }
        .instrument(span)
        .await
    }

    /// A client reported a pack status.
    pub async fn on_pack_status(&self, client: ClientId, pack: PackId, status: PackStatus) {
        let tracker = self.engine.tracker();
        if status.is_intermediate() {
            tracker.record_provisional(client, pack);
            debug!(client = %client, pack = %pack, %status, "Provisional pack status");
            return;
        }

        let resolved = tracker.resolve(client, pack, status.is_success());
        debug!(client = %client, pack = %pack, %status, resolved, "Pack status");

        let settings = self.engine.settings();
        let reason = if status.is_refusal() {
            Some(&settings.messages.declined)
        } else if status.is_failure() && settings.kick_on_failure {
            Some(&settings.messages.failed)
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(client = %client, pack = %pack, %status, "Disconnecting client over pack status");
            self.platform.disconnect(client, reason).await;
        }
    }

    /// A client disconnected. Fails pending deliveries and drops its state.
    pub fn on_client_disconnect(&self, client: ClientId) {
        let failed = self.engine.tracker().purge_client(client);
        if failed > 0 {
            debug!(client = %client, failed, "Disconnected with deliveries pending");
        }
    }

    /// The client's backend server pushed its own pack.
    pub fn on_backend_override_pushed(&self, client: ClientId) {
        if self
            .while_connected(client, |t| t.set_backend_override(client, true))
            .is_some()
        {
            debug!(client = %client, "Backend pushed its own pack");
        }
    }

    pub fn client_summary(&self, client: ClientId) -> Option<ClientSummary> {
        self.engine.tracker().summary(client)
    }

    /// Run a state-creating tracker operation, then drop that state again if
    /// the platform no longer knows the client.
    ///
    /// The platform forgets a client before its disconnect event arrives, so
    /// checking after the operation also covers a purge that races with it.
    fn while_connected<T>(
        &self,
        client: ClientId,
        op: impl FnOnce(&DeliveryTracker) -> T,
    ) -> Option<T> {
        let tracker = self.engine.tracker();
        let value = op(tracker);
        if self.platform.protocol_of(client).is_some() {
            return Some(value);
        }
        tracker.purge_client(client);
        debug!(client = %client, "Event for a disconnected client ignored");
        None
    }
}
