//! Client registry
//!
//! Thread-safe mapping of connection identity to authenticated username
//! and delivery handle. Enforces a single live session per username.

use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::RegistryError;

/// Handle for delivering messages to a connected client.
///
/// `tx` feeds the connection's writer task. Sending enqueues and never
/// blocks, so callers may deliver while another session holds a
/// registry lock elsewhere; a stalled peer only backs up its own queue.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub username: String,
    pub tx: UnboundedSender<String>,
}

/// Registry of authenticated clients, keyed by connection identity.
pub struct ClientRegistry {
    clients: Mutex<HashMap<SocketAddr, ClientHandle>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a newly authenticated client.
    ///
    /// The duplicate-username check and the insert run under one lock
    /// acquisition, so two concurrent logins with the same username can
    /// never both succeed.
    pub async fn register(
        &self,
        addr: SocketAddr,
        username: &str,
        tx: UnboundedSender<String>,
    ) -> Result<(), RegistryError> {
        let mut clients = self.clients.lock().await;

        if clients.values().any(|client| client.username == username) {
            return Err(RegistryError::AlreadyLoggedIn(username.to_string()));
        }

        clients.insert(
            addr,
            ClientHandle {
                username: username.to_string(),
                tx,
            },
        );
        Ok(())
    }

    /// Removes a client entry; no-op when the identity is unknown.
    pub async fn unregister(&self, addr: SocketAddr) -> Option<ClientHandle> {
        self.clients.lock().await.remove(&addr)
    }

    /// Finds the connection currently authenticated under `username`.
    pub async fn lookup_by_username(&self, username: &str) -> Option<(SocketAddr, ClientHandle)> {
        self.clients
            .lock()
            .await
            .iter()
            .find(|(_, client)| client.username == username)
            .map(|(addr, client)| (*addr, client.clone()))
    }

    /// Point-in-time copy of all registered clients for fan-out.
    ///
    /// Entries may be unregistered concurrently after this returns; a
    /// failed send to a departed client is expected and tolerated.
    pub async fn snapshot(&self) -> Vec<(SocketAddr, ClientHandle)> {
        self.clients
            .lock()
            .await
            .iter()
            .map(|(addr, client)| (*addr, client.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
