//! Unified error handling for packrouter.
//!
//! Each layer owns one error enum. Delivery-level failures stay local to a
//! single (client, pack) pair; only configuration and reload errors surface
//! as operation-level failures.

use crate::delivery::ClientId;
use crate::pack::PackId;
use thiserror::Error;

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors raised while populating a [`PackRegistry`](crate::pack::PackRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a pack named '{0}' is already registered")]
    DuplicateName(String),

    #[error("a pack with id {0} is already registered")]
    DuplicateId(PackId),
}

impl RegistryError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateName(_) => "duplicate_name",
            Self::DuplicateId(_) => "duplicate_id",
        }
    }
}

// ============================================================================
// Delivery Errors (tracker operations)
// ============================================================================

/// Delivery tracker contract violations.
///
/// `AlreadyPending` means the caller tried to open a second live handle for
/// the same (client, pack) pair. Correct coordinator usage never does this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("delivery of pack {pack} to client {client} is already pending")]
    AlreadyPending { client: ClientId, pack: PackId },

    #[error("client {client} already holds pack {pack}")]
    AlreadyConfirmed { client: ClientId, pack: PackId },

    #[error("client {0} disconnected")]
    ClientGone(ClientId),

    #[error("no pack named '{0}'")]
    UnknownPack(String),
}

impl DeliveryError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyPending { .. } => "already_pending",
            Self::AlreadyConfirmed { .. } => "already_confirmed",
            Self::ClientGone(_) => "client_gone",
            Self::UnknownPack(_) => "unknown_pack",
        }
    }
}

// ============================================================================
// Platform Errors (capability interface)
// ============================================================================

/// Errors reported by, or about, the client-facing platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The client can only hold one pack; `skipped` secondaries were not sent.
    #[error("client cannot stack packs, {skipped} secondary pack(s) skipped")]
    UnsupportedStacking { skipped: usize },

    #[error("operation not supported by this platform: {0}")]
    UnsupportedByPlatform(&'static str),

    #[error("client protocol {protocol} is too old to receive resource packs")]
    ProtocolTooOld { protocol: u32 },

    #[error("transport error: {0}")]
    Transport(String),
}

impl PlatformError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedStacking { .. } => "unsupported_stacking",
            Self::UnsupportedByPlatform(_) => "unsupported_by_platform",
            Self::ProtocolTooOld { .. } => "protocol_too_old",
            Self::Transport(_) => "transport",
        }
    }
}

// ============================================================================
// Reload Errors
// ============================================================================

/// Errors surfaced to the caller of `reload()`.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ReloadError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
        }
    }
}
