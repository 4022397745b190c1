//! packrouter - resource pack assignment and delivery tracking for proxied
//! game networks.
//!
//! The engine decides which packs a client should hold on each backend
//! server, sends what is missing, and tracks every send until the client
//! reports back. Wire encoding and transport stay behind
//! [`ProxyPlatform`](platform::ProxyPlatform).

pub mod assignment;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod pack;
pub mod platform;
pub mod telemetry;

pub use catalog::{Catalog, CatalogCell};
pub use config::Config;
pub use coordinator::{EventCoordinator, PackStatus, ReloadReport, SwitchOutcome};
pub use delivery::{ClientId, DeliveryHandle, DeliveryOutcome, DeliveryTracker};
pub use engine::{EngineSettings, PackEngine};
pub use pack::{PackHash, PackId, PackRegistry, ResourcePack};
pub use platform::{ProxyPlatform, Scheduler, TokioScheduler};
