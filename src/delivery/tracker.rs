//! Per-client delivery state.
//!
//! # Thread Safety
//!
//! The client table is a `DashMap`; each entry is an
//! `Arc<Mutex<ClientPackState>>`. Lock order is DashMap shard lock, then the
//! client mutex, and the shard guard is always dropped before the client
//! mutex is taken. No lock is held while a handle's callbacks run or while
//! anything awaits.

use super::ClientId;
use super::dashmap_ext::DashMapExt;
use super::handle::{Completer, DeliveryHandle, DeliveryOutcome};
use crate::error::DeliveryError;
use crate::pack::{PackId, ResourcePack};
use crate::platform::AppliedPack;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Mutable delivery record of one client session.
struct ClientPackState {
    session: u64,
    cancel: CancellationToken,
    /// Packs with a successful status this session.
    confirmed: HashSet<PackId>,
    /// Packs the client accepted or downloaded but has not finished applying.
    provisional: HashSet<PackId>,
    pending: HashMap<PackId, PendingDelivery>,
    /// A backend server pushed its own pack; the router stays out.
    backend_override: bool,
    /// Packs were already delivered during the configuration phase.
    entered_config_phase: bool,
    /// Set once the slot has been removed from the table.
    purged: bool,
}

impl ClientPackState {
    fn new(session: u64) -> Self {
        Self {
            session,
            cancel: CancellationToken::new(),
            confirmed: HashSet::new(),
            provisional: HashSet::new(),
            pending: HashMap::new(),
            backend_override: false,
            entered_config_phase: false,
            purged: false,
        }
    }

    fn open_handle(&mut self, client: ClientId, pack: PackId) -> Result<DeliveryHandle, DeliveryError> {
        if self.purged {
            return Err(DeliveryError::ClientGone(client));
        }
        if self.confirmed.contains(&pack) || self.provisional.contains(&pack) {
            return Err(DeliveryError::AlreadyConfirmed { client, pack });
        }
        if self.pending.contains_key(&pack) {
            return Err(DeliveryError::AlreadyPending { client, pack });
        }
        let (handle, completer) = DeliveryHandle::pending(client, pack);
        self.pending.insert(
            pack,
            PendingDelivery {
                handle: handle.clone(),
                completer,
            },
        );
        Ok(handle)
    }
}

type ClientSlot = Arc<Mutex<ClientPackState>>;

struct PendingDelivery {
    handle: DeliveryHandle,
    completer: Completer,
}

/// Binds later work to the session that scheduled it.
///
/// A ticket outlives its session harmlessly: once the client is purged,
/// [`DeliveryTracker::begin_delivery_for`] refuses it and its token is
/// cancelled.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    pub client: ClientId,
    session: u64,
    cancel: CancellationToken,
}

impl SessionTicket {
    /// Cancelled when the client disconnects.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Snapshot of a client's delivery state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSummary {
    pub confirmed: HashSet<PackId>,
    pub provisional: HashSet<PackId>,
    pub pending: HashSet<PackId>,
    pub backend_override: bool,
    pub entered_config_phase: bool,
}

/// Tracks pending and confirmed deliveries for every connected client.
#[derive(Default)]
pub struct DeliveryTracker {
    clients: DashMap<ClientId, ClientSlot>,
    next_session: AtomicU64,
}

impl DeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, client: ClientId) -> Option<ClientSlot> {
        self.clients.get_cloned(&client)
    }

    fn slot_or_create(&self, client: ClientId) -> ClientSlot {
        self.clients.get_or_insert_cloned(client, || {
            let session = self.next_session.fetch_add(1, Ordering::Relaxed);
            trace!(client = %client, session, "Opened client delivery state");
            Arc::new(Mutex::new(ClientPackState::new(session)))
        })
    }

    /// Ticket for the client's current session, creating state if needed.
    pub fn open(&self, client: ClientId) -> SessionTicket {
        let slot = self.slot_or_create(client);
        let state = slot.lock();
        SessionTicket {
            client,
            session: state.session,
            cancel: state.cancel.clone(),
        }
    }

    /// Whether the client already holds `pack`.
    ///
    /// Checks the tracker's own confirmed and provisional sets, then the
    /// packs the platform reports as applied (matched on id and url).
    pub fn is_confirmed(&self, client: ClientId, pack: &ResourcePack, applied: &[AppliedPack]) -> bool {
        let tracked = self.slot(client).is_some_and(|slot| {
            let state = slot.lock();
            state.confirmed.contains(&pack.id()) || state.provisional.contains(&pack.id())
        });
        if tracked {
            return true;
        }
        if applied.is_empty() {
            return false;
        }
        let url = pack.url();
        applied.iter().any(|a| a.id == pack.id() && a.url == url)
    }

    /// Open a pending delivery, creating client state if needed.
    ///
    /// Fails with `AlreadyPending` while another handle for the same pair is
    /// live, and with `AlreadyConfirmed` once the client holds the pack.
    pub fn begin_delivery(&self, client: ClientId, pack: PackId) -> Result<DeliveryHandle, DeliveryError> {
        let slot = self.slot_or_create(client);
        let mut state = slot.lock();
        state.open_handle(client, pack)
    }

    /// Open a pending delivery within the session a ticket was issued for.
    ///
    /// Never creates state: a ticket from a purged session yields
    /// `ClientGone`.
    pub fn begin_delivery_for(&self, ticket: &SessionTicket, pack: PackId) -> Result<DeliveryHandle, DeliveryError> {
        let slot = self
            .slot(ticket.client)
            .ok_or(DeliveryError::ClientGone(ticket.client))?;
        let mut state = slot.lock();
        if state.session != ticket.session {
            return Err(DeliveryError::ClientGone(ticket.client));
        }
        state.open_handle(ticket.client, pack)
    }

    /// Resolve the pending handle for (client, pack).
    ///
    /// A success is recorded as confirmed even without a pending handle. A
    /// failure drops any provisional evidence. Returns whether a pending
    /// handle was resolved; reports for unknown clients are ignored.
    pub fn resolve(&self, client: ClientId, pack: PackId, success: bool) -> bool {
        let Some(slot) = self.slot(client) else {
            debug!(client = %client, pack = %pack, "Status for unknown client ignored");
            return false;
        };
        let completer = {
            let mut state = slot.lock();
            if state.purged {
                return false;
            }
            if success {
                state.confirmed.insert(pack);
            } else {
                state.provisional.remove(&pack);
            }
            state.pending.remove(&pack).map(|p| p.completer)
        };

        match completer {
            Some(completer) => {
                let outcome = if success {
                    DeliveryOutcome::Confirmed
                } else {
                    DeliveryOutcome::Failed
                };
                completer.complete(outcome);
                true
            }
            None => {
                trace!(client = %client, pack = %pack, "No pending delivery for status");
                false
            }
        }
    }

    /// Record an intermediate (accepted/downloaded) status as evidence.
    pub fn record_provisional(&self, client: ClientId, pack: PackId) {
        if let Some(slot) = self.slot(client) {
            let mut state = slot.lock();
            if !state.purged {
                state.provisional.insert(pack);
            }
        }
    }

    /// Forget which packs the client holds (after a pack removal).
    pub fn clear_applied(&self, client: ClientId) {
        if let Some(slot) = self.slot(client) {
            let mut state = slot.lock();
            state.confirmed.clear();
            state.provisional.clear();
        }
    }

    pub fn set_backend_override(&self, client: ClientId, active: bool) {
        if !active && self.slot(client).is_none() {
            return;
        }
        self.slot_or_create(client).lock().backend_override = active;
    }

    pub fn has_backend_override(&self, client: ClientId) -> bool {
        self.slot(client).is_some_and(|slot| slot.lock().backend_override)
    }

    /// Note that the configuration phase delivered packs for this client.
    pub fn mark_config_phase(&self, client: ClientId) {
        if let Some(slot) = self.slot(client) {
            slot.lock().entered_config_phase = true;
        }
    }

    /// Clear the configuration-phase flag, returning its previous value.
    pub fn take_config_phase(&self, client: ClientId) -> bool {
        self.slot(client)
            .is_some_and(|slot| std::mem::take(&mut slot.lock().entered_config_phase))
    }

    /// Packs with a live pending handle.
    pub fn pending_packs(&self, client: ClientId) -> Vec<PackId> {
        self.slot(client)
            .map(|slot| slot.lock().pending.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The live handle for (client, pack), if one is pending.
    pub fn pending_handle(&self, client: ClientId, pack: PackId) -> Option<DeliveryHandle> {
        let slot = self.slot(client)?;
        let state = slot.lock();
        state.pending.get(&pack).map(|p| p.handle.clone())
    }

    pub fn summary(&self, client: ClientId) -> Option<ClientSummary> {
        let slot = self.slot(client)?;
        let state = slot.lock();
        Some(ClientSummary {
            confirmed: state.confirmed.clone(),
            provisional: state.provisional.clone(),
            pending: state.pending.keys().copied().collect(),
            backend_override: state.backend_override,
            entered_config_phase: state.entered_config_phase,
        })
    }

    pub fn contains(&self, client: ClientId) -> bool {
        self.clients.contains_key(&client)
    }

    pub fn clients(&self) -> Vec<ClientId> {
        self.clients.keys_cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Drop all state for a client, failing its pending handles.
    ///
    /// Idempotent. Returns how many handles were failed.
    pub fn purge_client(&self, client: ClientId) -> usize {
        let Some((_, slot)) = self.clients.remove(&client) else {
            return 0;
        };
        let pending: Vec<Completer> = {
            let mut state = slot.lock();
            state.purged = true;
            state.cancel.cancel();
            state.confirmed.clear();
            state.provisional.clear();
            state.pending.drain().map(|(_, p)| p.completer).collect()
        };

        let failed = pending.len();
        for completer in pending {
            completer.complete(DeliveryOutcome::Failed);
        }
        debug!(client = %client, failed, "Purged client delivery state");
        failed
    }

    /// Purge every client. Used at shutdown.
    pub fn purge_all(&self) -> usize {
        self.clients()
            .into_iter()
            .map(|client| self.purge_client(client))
            .sum()
    }
}
