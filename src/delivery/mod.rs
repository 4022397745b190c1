//! Delivery tracking.
//!
//! The [`DeliveryTracker`] owns all per-client delivery state. Each client
//! gets its own lock; the table of clients is a sharded `DashMap`, so work
//! for different clients never contends on a global lock.
//!
//! # Invariants
//!
//! - At most one pending [`DeliveryHandle`] exists per (client, pack).
//! - Every pack with an observed successful status is in the confirmed set.
//! - After a client is purged no state remains for it, and every handle that
//!   was pending at that moment has resolved `Failed` exactly once.

mod dashmap_ext;
mod handle;
mod tracker;

pub use handle::{DeliveryHandle, DeliveryOutcome, combine_all, settle_all};
pub use tracker::{ClientSummary, DeliveryTracker, SessionTicket};

/// Identifier of one client connection session.
pub type ClientId = uuid::Uuid;
