//! Operator operations: reload, resend, explicit application and clearing.

use super::EventCoordinator;
use crate::catalog::{Catalog, report_warnings};
use crate::config::{Config, ConfigWarning};
use crate::delivery::{ClientId, DeliveryHandle};
use crate::engine::EngineSettings;
use crate::error::{DeliveryError, PlatformError, ReloadError};
use crate::pack::{HashError, PackHash};
use crate::platform::PackDelivery;
use crate::telemetry::spans;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Summary of a successful reload.
#[derive(Debug)]
pub struct ReloadReport {
    pub packs: usize,
    pub servers: usize,
    pub warnings: Vec<ConfigWarning>,
}

impl EventCoordinator {
    /// Swap in a catalog built from `config`.
    ///
    /// Connected clients keep what they have; call
    /// [`resend_all`](Self::resend_all) to push the new assignments. On
    /// error the previous catalog stays installed.
    pub fn reload(&self, config: &Config) -> Result<ReloadReport, ReloadError> {
        let _guard = spans::reload("config").entered();
        self.install(config)
    }

    /// Load the file at `path` and reload from it.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<ReloadReport, ReloadError> {
        let path = path.as_ref();
        let _guard = spans::reload(&path.display().to_string()).entered();
        let config = Config::load(path).inspect_err(|e| {
            error!(error = %e, "Failed to load configuration, keeping current catalog");
        })?;
        self.install(&config)
    }

    fn install(&self, config: &Config) -> Result<ReloadReport, ReloadError> {
        let (catalog, warnings) = Catalog::from_config(config).inspect_err(|e| {
            error!(error = %e, code = e.error_code(), "Reload rejected, keeping current catalog");
        })?;
        report_warnings(&warnings);

        let report = ReloadReport {
            packs: catalog.registry.len(),
            servers: catalog.store.servers().len(),
            warnings,
        };
        self.engine.install(catalog, EngineSettings::from_config(config));
        info!(
            packs = report.packs,
            servers = report.servers,
            warnings = report.warnings.len(),
            "Pack catalog reloaded"
        );
        Ok(report)
    }

    /// Re-run the switch transition for every connected client.
    ///
    /// Returns how many clients were processed without error.
    pub async fn resend_all(&self) -> usize {
        let clients = self.platform.connected_clients();
        let total = clients.len();
        let mut done = 0;
        for client in clients {
            match self.on_client_server_switch(client).await {
                Ok(_) => done += 1,
                Err(e) => warn!(client = %client, error = %e, "Resend failed"),
            }
        }
        info!(clients = total, done, "Resent packs to connected clients");
        done
    }

    /// Send one named pack to a client, outside its assignments.
    ///
    /// `Ok(None)` when the client already holds the pack or cannot receive
    /// packs at all.
    pub async fn apply_pack(
        &self,
        client: ClientId,
        name: &str,
    ) -> Result<Option<DeliveryHandle>, DeliveryError> {
        let pack = self
            .engine
            .catalog()
            .registry
            .lookup_by_name(name)
            .ok_or_else(|| DeliveryError::UnknownPack(name.to_string()))?;
        if self.support_of(client).is_none() {
            return Ok(None);
        }

        let Some(ticket) = self.while_connected(client, |t| t.open(client)) else {
            return Ok(None);
        };
        let handles = self.send_packs(&ticket, std::slice::from_ref(&pack)).await?;
        Ok(handles.into_iter().next())
    }

    /// Remove every pack from a client.
    ///
    /// Falls back to sending the configured empty pack when the client or
    /// platform cannot remove packs. Tracked confirmations are forgotten
    /// either way, so the next transition delivers again.
    pub async fn clear_packs(&self, client: ClientId) -> Result<(), PlatformError> {
        let stacking = self.support_of(client).is_some_and(|s| s.can_stack());
        let removed = if stacking && self.caps.removal {
            self.platform.remove_pack(client, None).await
        } else {
            Err(PlatformError::UnsupportedByPlatform("remove_pack"))
        };

        match removed {
            Ok(()) => debug!(client = %client, "Removed all packs"),
            Err(PlatformError::UnsupportedByPlatform(op)) => {
                let Some(empty) = self.engine.catalog().empty.clone() else {
                    warn!(client = %client, "Cannot remove packs and no empty pack configured");
                    return Err(PlatformError::UnsupportedByPlatform(op));
                };
                self.platform.send_pack(client, &PackDelivery::of(&empty)).await?;
                debug!(client = %client, pack = %empty.name(), "Sent empty pack");
            }
            Err(e) => return Err(e),
        }

        self.engine.tracker().clear_applied(client);
        Ok(())
    }

    /// Point a registered pack at a new url and hash.
    ///
    /// Returns `Ok(false)` when no pack has that name.
    pub fn update_pack_source(
        &self,
        name: &str,
        url: &str,
        hash: Option<&str>,
    ) -> Result<bool, HashError> {
        let hash = hash.map(str::parse::<PackHash>).transpose()?;
        let updated = self.engine.catalog().registry.update_source(name, url, hash);
        if updated {
            info!(pack = %name, url = %url, "Pack source updated");
        } else {
            debug!(pack = %name, "Source update for unknown pack ignored");
        }
        Ok(updated)
    }

    /// Fail every pending delivery and cancel every scheduled one.
    pub fn shutdown(&self) -> usize {
        let failed = self.engine.tracker().purge_all();
        info!(failed, "Pack coordinator shut down");
        failed
    }
}
