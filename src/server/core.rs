//! Server control loop
//!
//! Binds the listening socket, accepts connections, and spawns one
//! session handler per client with no cap on concurrent sessions. A
//! watcher on the operator console stops the server on the literal
//! command `exit`, an abrupt halt with no drain of client sessions.

use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::auth::CredentialStore;
use crate::client::{ClientRegistry, handle_client};
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::group::GroupRegistry;
use crate::router::MessageRouter;

/// Shared handles every session needs.
#[derive(Clone)]
pub struct SharedState {
    pub credentials: Arc<CredentialStore>,
    pub clients: Arc<ClientRegistry>,
    pub groups: Arc<GroupRegistry>,
    pub router: Arc<MessageRouter>,
    pub config: Arc<ServerConfig>,
}

pub struct Server {
    listener: TcpListener,
    state: SharedState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    /// Binds the listener and loads the credential store.
    ///
    /// Bind failure is fatal. A missing or unreadable credential file
    /// is not: the server runs and every login is rejected.
    pub async fn new(config: ServerConfig) -> Result<Self, ChatServerError> {
        let socket_addr = config.socket_addr();

        let listener = match TcpListener::bind(&socket_addr).await {
            Ok(listener) => {
                info!("Server bound to {}", socket_addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket_addr, e);
                return Err(e.into());
            }
        };

        let credentials = Arc::new(CredentialStore::load(Path::new(&config.credentials_file)));
        if credentials.is_empty() {
            warn!("Credential store is empty; every login will be rejected");
        }

        let clients = Arc::new(ClientRegistry::new());
        let groups = Arc::new(GroupRegistry::new());
        let router = Arc::new(MessageRouter::new(Arc::clone(&clients), Arc::clone(&groups)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            listener,
            state: SharedState {
                credentials,
                clients,
                groups,
                router,
                config: Arc::new(config),
            },
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Address the listener actually bound; differs from the configured
    /// one when port 0 was requested.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the console watcher signals shutdown.
    pub async fn start(&self) {
        info!(
            "Chat server listening on {} (type \"exit\" on this console to stop)",
            self.state.config.socket_addr()
        );

        spawn_console_watcher(self.shutdown_tx.clone());

        let mut shutdown = self.shutdown_rx.clone();
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Server shutting down...");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("New connection from {}", addr);
                        let state = self.state.clone();
                        let shutdown = self.shutdown_rx.clone();

                        // Spawn a task per client so the accept loop never blocks.
                        tokio::spawn(async move {
                            handle_client(stream, addr, state, shutdown).await;
                        });
                    }
                    Err(e) => {
                        // One failed accept does not take the server down.
                        error!("Error accepting connection: {}", e);
                    }
                }
            }
        }
    }
}

/// Watches the operator console for the literal command `exit` and
/// flips the shutdown signal. Sessions observe the signal through their
/// own receivers; clients get no notice or drain.
fn spawn_console_watcher(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim() == "exit" {
                info!("Shutdown requested from server console");
                let _ = shutdown_tx.send(true);
                return;
            }
        }
    });
}
