//! packrouter - configuration check tool.
//!
//! Loads a pack configuration, reports its problems and prints what every
//! client would receive on each configured server.

use packrouter::assignment::Resolution;
use packrouter::catalog::report_warnings;
use packrouter::config::Config;
use packrouter::engine::PackEngine;
use packrouter::telemetry::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "packrouter.toml".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            error!(path = %config_path, error = %e, code = e.error_code(), "Failed to load config");
            return Err(e.into());
        }
    };
    init_tracing(config.engine.debug);

    let (engine, warnings) = PackEngine::from_config(&config).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to build pack catalog");
        e
    })?;
    report_warnings(&warnings);

    let catalog = engine.catalog();
    info!(
        path = %config_path,
        packs = catalog.registry.len(),
        servers = catalog.store.servers().len(),
        warnings = warnings.len(),
        "Loaded pack configuration"
    );

    for pack in catalog.registry.packs() {
        let hash = pack
            .hash()
            .map(|h| h.to_hex())
            .unwrap_or_else(|| "-".to_string());
        println!("pack {:<16} {} {} {}", pack.name(), pack.id(), hash, pack.url());
    }
    if let Some(empty) = &catalog.empty {
        println!("empty {}", empty.name());
    }

    print_resolution("(global)", &catalog.resolve(None, false));
    for server in catalog.store.servers() {
        print_resolution(server, &catalog.resolve(Some(server), false));
    }

    Ok(())
}

fn print_resolution(label: &str, resolution: &Resolution) {
    let mut names: Vec<String> = Vec::new();
    if let Some(primary) = resolution.primary() {
        names.push(format!("{}*", primary.name()));
    }
    names.extend(resolution.secondaries().iter().map(|p| p.name().to_string()));

    let packs = if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    };
    println!("{label:<16} delay={:<4} {packs}", resolution.send_delay);
}
