//! Recording platform.
//!
//! Every client is connected on creation with a modern protocol and as
//! authenticated. Sends, removals and disconnects are recorded for
//! assertions; nothing ever reports a status on its own.

#![allow(dead_code)]

use async_trait::async_trait;
use packrouter::delivery::ClientId;
use packrouter::error::PlatformError;
use packrouter::pack::PackId;
use packrouter::platform::{
    AppliedPack, MIN_STACKING_PROTOCOL, PackDelivery, PlatformCapabilities, ProxyPlatform,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct MockClient {
    server: Option<String>,
    protocol: u32,
    authenticated: bool,
    applied: Vec<AppliedPack>,
}

pub struct MockPlatform {
    caps: PlatformCapabilities,
    clients: Mutex<HashMap<ClientId, MockClient>>,
    sends: Mutex<Vec<(ClientId, PackDelivery)>>,
    removals: Mutex<Vec<(ClientId, Option<PackId>)>>,
    disconnects: Mutex<Vec<(ClientId, String)>>,
    fail_sends: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::with_capabilities(PlatformCapabilities::default())
    }

    pub fn with_capabilities(caps: PlatformCapabilities) -> Self {
        Self {
            caps,
            clients: Mutex::new(HashMap::new()),
            sends: Mutex::new(Vec::new()),
            removals: Mutex::new(Vec::new()),
            disconnects: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Connect a modern, authenticated client on `server`.
    pub fn connect(&self, server: Option<&str>) -> ClientId {
        self.connect_with(server, MIN_STACKING_PROTOCOL)
    }

    pub fn connect_with(&self, server: Option<&str>, protocol: u32) -> ClientId {
        let client = Uuid::new_v4();
        self.clients.lock().insert(
            client,
            MockClient {
                server: server.map(str::to_string),
                protocol,
                authenticated: true,
                applied: Vec::new(),
            },
        );
        client
    }

    /// Forget a client, as the proxy does once it is gone.
    pub fn drop_client(&self, client: ClientId) {
        self.clients.lock().remove(&client);
    }

    pub fn set_server(&self, client: ClientId, server: Option<&str>) {
        if let Some(c) = self.clients.lock().get_mut(&client) {
            c.server = server.map(str::to_string);
        }
    }

    pub fn set_authenticated(&self, client: ClientId, authenticated: bool) {
        if let Some(c) = self.clients.lock().get_mut(&client) {
            c.authenticated = authenticated;
        }
    }

    pub fn set_applied(&self, client: ClientId, applied: Vec<AppliedPack>) {
        if let Some(c) = self.clients.lock().get_mut(&client) {
            c.applied = applied;
        }
    }

    /// Make every following send fail at the transport.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sends(&self) -> Vec<(ClientId, PackDelivery)> {
        self.sends.lock().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sends.lock().len()
    }

    /// Names of the packs sent to `client`, in send order.
    pub fn sent_to(&self, client: ClientId) -> Vec<String> {
        self.sends
            .lock()
            .iter()
            .filter(|(c, _)| *c == client)
            .map(|(_, pack)| pack.name.clone())
            .collect()
    }

    pub fn removals(&self) -> Vec<(ClientId, Option<PackId>)> {
        self.removals.lock().clone()
    }

    pub fn disconnects(&self) -> Vec<(ClientId, String)> {
        self.disconnects.lock().clone()
    }

    /// Yield until at least `n` sends were recorded.
    pub async fn wait_for_sends(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.send_count() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timed out waiting for sends");
    }
}

#[async_trait]
impl ProxyPlatform for MockPlatform {
    fn capabilities(&self) -> PlatformCapabilities {
        self.caps
    }

    fn current_server_of(&self, client: ClientId) -> Option<String> {
        self.clients.lock().get(&client).and_then(|c| c.server.clone())
    }

    fn is_authenticated(&self, client: ClientId) -> bool {
        self.clients
            .lock()
            .get(&client)
            .is_some_and(|c| c.authenticated)
    }

    fn protocol_of(&self, client: ClientId) -> Option<u32> {
        self.clients.lock().get(&client).map(|c| c.protocol)
    }

    fn applied_packs(&self, client: ClientId) -> Vec<AppliedPack> {
        self.clients
            .lock()
            .get(&client)
            .map(|c| c.applied.clone())
            .unwrap_or_default()
    }

    fn connected_clients(&self) -> Vec<ClientId> {
        self.clients.lock().keys().copied().collect()
    }

    async fn send_pack(&self, client: ClientId, pack: &PackDelivery) -> Result<(), PlatformError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(PlatformError::Transport("connection reset".into()));
        }
        self.sends.lock().push((client, pack.clone()));
        Ok(())
    }

    async fn remove_pack(&self, client: ClientId, pack: Option<PackId>) -> Result<(), PlatformError> {
        if !self.caps.removal {
            return Err(PlatformError::UnsupportedByPlatform("remove_pack"));
        }
        self.removals.lock().push((client, pack));
        Ok(())
    }

    async fn disconnect(&self, client: ClientId, reason: &str) {
        self.disconnects.lock().push((client, reason.to_string()));
    }
}
