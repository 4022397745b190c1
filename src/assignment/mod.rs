//! Pack assignments and their resolution.
//!
//! Every server may carry an [`Assignment`]; the network carries exactly one
//! global assignment that acts as the fallback. [`resolve`] turns a client's
//! current server into the ordered pack set it should hold.

mod resolver;
mod store;

pub use resolver::{Resolution, resolve};
pub use store::AssignmentStore;

use crate::pack::ResourcePack;
use std::sync::Arc;

/// Packs assigned to one server, or to the whole network.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The pack the client should end up displaying.
    pub primary: Option<Arc<ResourcePack>>,
    /// Additional packs layered after the primary on clients that stack.
    pub secondary: Vec<Arc<ResourcePack>>,
    /// Ticks to wait after a switch before sending. Negative inherits from
    /// the global assignment; zero sends immediately.
    pub send_delay: i64,
}

impl Default for Assignment {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: Vec::new(),
            send_delay: -1,
        }
    }
}

impl Assignment {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_empty()
    }
}
