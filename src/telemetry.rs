//! Tracing setup and span helpers.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `debug` when the
/// engine's debug flag is set and `info` when it is not.
pub fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .try_init();
}

/// Standardized span constructors for delivery observability.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Span covering one lifecycle event for a client.
    pub fn client(client: &uuid::Uuid, event: &'static str) -> Span {
        info_span!("client", client = %client, event = event)
    }

    /// Span covering the send of one pack to one client.
    pub fn delivery(client: &uuid::Uuid, pack: &str) -> Span {
        debug_span!("delivery", client = %client, pack = %pack)
    }

    /// Span covering a catalog reload.
    pub fn reload(source: &str) -> Span {
        info_span!("reload", source = %source)
    }
}
