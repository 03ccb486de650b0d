//! Message routing
//!
//! Delivers direct, broadcast, and group messages across sessions using
//! the client and group registries. Delivery enqueues onto each
//! recipient's writer channel, so no registry lock is ever held across
//! a socket write and a stalled peer cannot block anyone else.

use log::debug;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::client::{ClientHandle, ClientRegistry};
use crate::error::{GroupError, RouteError};
use crate::group::GroupRegistry;
use crate::protocol::responses;

/// Routes messages between registered sessions.
pub struct MessageRouter {
    clients: Arc<ClientRegistry>,
    groups: Arc<GroupRegistry>,
}

impl MessageRouter {
    pub fn new(clients: Arc<ClientRegistry>, groups: Arc<GroupRegistry>) -> Self {
        Self { clients, groups }
    }

    /// Sends a direct message to the session authenticated as
    /// `to_username`. The sender gets no acknowledgment on success.
    pub async fn direct(
        &self,
        from: SocketAddr,
        from_user: &str,
        to_username: &str,
        body: &str,
    ) -> Result<(), RouteError> {
        let (addr, handle) = self
            .clients
            .lookup_by_username(to_username)
            .await
            .ok_or_else(|| RouteError::UserNotFound(to_username.to_string()))?;

        if addr == from {
            return Err(RouteError::SelfMessage);
        }

        deliver(addr, &handle, responses::direct_message(from_user, body));
        Ok(())
    }

    /// Fans a message out to every registered session except the sender.
    pub async fn broadcast(&self, from: SocketAddr, from_user: &str, body: &str) {
        self.fan_out(from, &responses::broadcast_message(from_user, body))
            .await;
    }

    /// Sends to every member of `group` except the sender.
    ///
    /// Membership is checked against the registry immediately before
    /// fan-out, never cached from an earlier command.
    pub async fn group_send(
        &self,
        from: SocketAddr,
        group: &str,
        body: &str,
    ) -> Result<(), GroupError> {
        let members = self
            .groups
            .members(group)
            .await
            .ok_or_else(|| GroupError::NoSuchGroup(group.to_string()))?;

        if !members.contains(&from) {
            return Err(GroupError::NotMember(group.to_string()));
        }

        let message = responses::group_message(group, body);
        for (addr, handle) in self.clients.snapshot().await {
            if addr != from && members.contains(&addr) {
                deliver(addr, &handle, message.clone());
            }
        }
        Ok(())
    }

    /// Tells every other session that `username` arrived.
    pub async fn announce_join(&self, from: SocketAddr, username: &str) {
        self.fan_out(from, &responses::join_announcement(username))
            .await;
    }

    /// Tells every remaining session that `username` left.
    pub async fn announce_leave(&self, from: SocketAddr, username: &str) {
        self.fan_out(from, &responses::leave_announcement(username))
            .await;
    }

    async fn fan_out(&self, from: SocketAddr, message: &str) {
        for (addr, handle) in self.clients.snapshot().await {
            if addr != from {
                deliver(addr, &handle, message.to_string());
            }
        }
    }
}

/// A send only fails when the recipient's session is already tearing
/// down; the message is dropped and the fan-out continues.
fn deliver(addr: SocketAddr, handle: &ClientHandle, message: String) {
    if handle.tx.send(message).is_err() {
        debug!("Dropping message for {}: session already gone", addr);
    }
}
