//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Engine Defaults
// =============================================================================

/// One game tick.
pub fn default_tick_millis() -> u64 {
    50
}

// =============================================================================
// Assignment Defaults
// =============================================================================

/// Negative delay means "inherit from the global assignment".
pub fn default_send_delay() -> i64 {
    -1
}

// =============================================================================
// Message Defaults
// =============================================================================

pub fn default_declined_message() -> String {
    "You declined the resource pack!".to_string()
}

pub fn default_failed_message() -> String {
    "Failed to load the resource pack.".to_string()
}
