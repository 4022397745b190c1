//! Configuration fixtures and a wired-up test network.

#![allow(dead_code)]

use super::MockPlatform;
use packrouter::config::Config;
use packrouter::coordinator::{EventCoordinator, PackStatus};
use packrouter::delivery::ClientId;
use packrouter::engine::PackEngine;
use packrouter::pack::PackId;
use packrouter::platform::TokioScheduler;
use std::sync::Arc;

/// Lobby carries its own primary, every server shares the `ui` overlay, and
/// the arena delays delivery by 20 ticks.
pub const LOBBY_CONFIG: &str = r#"
empty = "blank"

[messages]
declined = "Resource pack required"
failed = "Resource pack failed to load"

[packs.lobby]
url = "https://packs.example.net/lobby.zip"
hash = "0123456789abcdef0123456789abcdef01234567"

[packs.ui]
url = "https://packs.example.net/ui.zip"

[packs.arena]
url = "https://packs.example.net/arena.zip"

[packs.blank]
url = "https://packs.example.net/blank.zip"

[global]
secondary = ["ui"]

[servers.lobby]
pack = "lobby"

[servers.arena]
pack = "arena"
send_delay = 20
"#;

/// A coordinator over a recording platform.
pub struct TestNetwork {
    pub coordinator: EventCoordinator,
    pub platform: Arc<MockPlatform>,
}

impl TestNetwork {
    pub fn new(config: &str) -> Self {
        Self::with_platform(config, MockPlatform::new())
    }

    pub fn with_platform(config: &str, platform: MockPlatform) -> Self {
        let config = Config::parse(config).expect("fixture config parses");
        let (engine, warnings) = PackEngine::from_config(&config).expect("fixture catalog builds");
        assert!(warnings.is_empty(), "fixture has warnings: {warnings:?}");

        let platform = Arc::new(platform);
        let scheduler = Arc::new(TokioScheduler::new(config.engine.tick()));
        let coordinator = EventCoordinator::new(Arc::new(engine), platform.clone(), scheduler);
        Self {
            coordinator,
            platform,
        }
    }

    pub fn lobby() -> Self {
        Self::new(LOBBY_CONFIG)
    }

    pub fn pack_id(&self, name: &str) -> PackId {
        self.coordinator
            .engine()
            .catalog()
            .registry
            .lookup_by_name(name)
            .map(|p| p.id())
            .expect("fixture pack exists")
    }

    pub async fn report(&self, client: ClientId, name: &str, status: PackStatus) {
        self.coordinator
            .on_pack_status(client, self.pack_id(name), status)
            .await;
    }
}
