//! Session handler
//!
//! Drives one connection through its lifecycle: the authentication
//! exchange, registration, the command loop, and teardown. All writes
//! to the peer after authentication go through a per-connection queue
//! drained by a dedicated writer task, so fan-out from other sessions
//! never touches this socket directly.

use log::{debug, info, warn};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

use crate::client::Session;
use crate::protocol::responses;
use crate::protocol::{CommandStatus, handle_command, parse_command};
use crate::server::SharedState;

/// Handles one client connection from accept to teardown.
pub async fn handle_client(
    stream: TcpStream,
    addr: SocketAddr,
    state: SharedState,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut session = Session::new(addr);
    let mut reader = BufReader::new(stream);

    // --- Authentication phase ---
    session.begin_authentication();

    let username = match read_credential(&mut reader, responses::USERNAME_PROMPT).await {
        Ok(Some(username)) => username,
        Ok(None) => {
            info!("{} closed the connection during authentication", addr);
            session.close();
            return;
        }
        Err(e) => {
            warn!("Failed to read username from {}: {}", addr, e);
            session.close();
            return;
        }
    };

    let password = match read_credential(&mut reader, responses::PASSWORD_PROMPT).await {
        Ok(Some(password)) => password,
        Ok(None) => {
            info!("{} closed the connection during authentication", addr);
            session.close();
            return;
        }
        Err(e) => {
            warn!("Failed to read password from {}: {}", addr, e);
            session.close();
            return;
        }
    };

    if !state.credentials.validate(&username, &password) {
        info!("Authentication failed for {} as \"{}\"", addr, username);
        let _ = reader
            .get_mut()
            .write_all(responses::AUTH_FAILED.as_bytes())
            .await;
        session.close();
        return;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state.clients.register(addr, &username, tx.clone()).await {
        info!("Rejected login from {}: {}", addr, e);
        let _ = reader
            .get_mut()
            .write_all(responses::already_connected(&username).as_bytes())
            .await;
        session.close();
        return;
    }

    session.authenticate(username.clone());
    info!(
        "{} connected as \"{}\" ({} client(s) online)",
        addr,
        username,
        state.clients.len().await
    );

    let (read_half, write_half) = reader.into_inner().into_split();
    let writer = tokio::spawn(write_loop(write_half, rx));

    state.router.announce_join(addr, &username).await;
    let _ = tx.send(responses::WELCOME.to_string());

    // --- Command loop ---
    command_loop(&session, BufReader::new(read_half), &tx, &state, &mut shutdown).await;

    // --- Teardown: deregister first so the leave announcement skips us ---
    session.close();
    state.clients.unregister(addr).await;
    state.router.announce_leave(addr, &username).await;

    // Group memberships stay in place after disconnect. Delivery skips
    // the stale entries because the client registry no longer knows
    // this identity.

    drop(tx);
    let _ = writer.await;
    info!("\"{}\" ({}) disconnected", username, addr);
}

/// Reads commands line by line until the peer disconnects, asks to
/// exit, or the server shuts down. Each command completes, including
/// its fan-out, before the next line is read.
async fn command_loop(
    session: &Session,
    mut reader: BufReader<OwnedReadHalf>,
    tx: &UnboundedSender<String>,
    state: &SharedState,
    shutdown: &mut watch::Receiver<bool>,
) {
    let addr = session.addr();
    let mut line = String::new();

    loop {
        line.clear();
        tokio::select! {
            _ = shutdown.changed() => {
                info!("Session {} stopping for server shutdown", addr);
                break;
            }
            result = reader.read_line(&mut line) => match result {
                Ok(0) => {
                    info!("Connection closed by client {}", addr);
                    break;
                }
                Ok(_) => {
                    if line.len() > state.config.max_command_length {
                        let _ = tx.send(responses::MESSAGE_TOO_LONG.to_string());
                        continue;
                    }

                    let command = parse_command(&line);
                    let result =
                        handle_command(session, &command, &state.router, &state.groups).await;

                    match result.status {
                        CommandStatus::CloseConnection => {
                            if let Some(msg) = result.message {
                                let _ = tx.send(msg);
                            }
                            info!("Client {} requested to exit", addr);
                            break;
                        }
                        CommandStatus::Success => {
                            if let Some(msg) = result.message {
                                let _ = tx.send(msg);
                            }
                        }
                        CommandStatus::Failure(reason) => {
                            debug!("Command from {} failed: {}", addr, reason);
                            if let Some(msg) = result.message {
                                let _ = tx.send(msg);
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to read from {}: {}", addr, e);
                    break;
                }
            }
        }
    }
}

/// Prompts for and reads one line, trimmed of its terminator. `None`
/// means the peer closed the connection before answering.
async fn read_credential(
    reader: &mut BufReader<TcpStream>,
    prompt: &str,
) -> std::io::Result<Option<String>> {
    reader.get_mut().write_all(prompt.as_bytes()).await?;
    reader.get_mut().flush().await?;

    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Drains queued messages onto the socket, in order. Exits once every
/// sender is gone and the queue is empty, then closes the connection.
async fn write_loop(mut write_half: OwnedWriteHalf, mut rx: UnboundedReceiver<String>) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = write_half.write_all(message.as_bytes()).await {
            debug!("Write failed, dropping remaining queued messages: {}", e);
            break;
        }
    }
    let _ = write_half.shutdown().await;
}
