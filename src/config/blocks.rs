//! Pack and assignment block configuration.

use super::defaults::default_send_delay;
use serde::Deserialize;
use uuid::Uuid;

/// A `[packs.<name>]` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackBlock {
    /// Download URL sent to clients.
    #[serde(default)]
    pub url: String,
    /// SHA-1 of the pack archive as 40 hex characters.
    pub hash: Option<String>,
    /// Stable id. Derived from the pack name when absent.
    pub uuid: Option<Uuid>,
    /// Pack format version.
    pub format: Option<i32>,
}

/// The `[global]` block or a `[servers.<name>]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentBlock {
    /// Name of the primary pack.
    pub pack: Option<String>,
    /// Names of additional packs, applied after the primary.
    #[serde(default)]
    pub secondary: Vec<String>,
    /// Ticks to wait after a server switch before sending (-1 inherits).
    #[serde(default = "default_send_delay")]
    pub send_delay: i64,
}

impl Default for AssignmentBlock {
    fn default() -> Self {
        Self {
            pack: None,
            secondary: Vec::new(),
            send_delay: default_send_delay(),
        }
    }
}

impl AssignmentBlock {
    /// The primary pack name, treating an empty string as unset.
    pub fn pack_name(&self) -> Option<&str> {
        self.pack.as_deref().filter(|name| !name.is_empty())
    }
}
