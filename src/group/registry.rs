//! Group registry
//!
//! Thread-safe mapping of group name to member connection identities.
//! Groups are created explicitly and live until the process exits; an
//! empty membership set does not remove the group.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use tokio::sync::Mutex;

use crate::error::GroupError;

/// Registry of named groups and their members.
pub struct GroupRegistry {
    groups: Mutex<HashMap<String, HashSet<SocketAddr>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a group with `creator` as its first member.
    pub async fn create(&self, name: &str, creator: SocketAddr) -> Result<(), GroupError> {
        let mut groups = self.groups.lock().await;

        if groups.contains_key(name) {
            return Err(GroupError::AlreadyExists(name.to_string()));
        }

        groups.insert(name.to_string(), HashSet::from([creator]));
        Ok(())
    }

    pub async fn join(&self, name: &str, addr: SocketAddr) -> Result<(), GroupError> {
        let mut groups = self.groups.lock().await;

        match groups.get_mut(name) {
            None => Err(GroupError::NoSuchGroup(name.to_string())),
            Some(members) => {
                if members.insert(addr) {
                    Ok(())
                } else {
                    Err(GroupError::AlreadyMember(name.to_string()))
                }
            }
        }
    }

    /// Removes `addr` from the group. The group itself stays, even when
    /// its last member leaves.
    pub async fn leave(&self, name: &str, addr: SocketAddr) -> Result<(), GroupError> {
        let mut groups = self.groups.lock().await;

        match groups.get_mut(name) {
            None => Err(GroupError::NoSuchGroup(name.to_string())),
            Some(members) => {
                if members.remove(&addr) {
                    Ok(())
                } else {
                    Err(GroupError::NotMember(name.to_string()))
                }
            }
        }
    }

    /// Membership query. Strictly read-only: an absent group answers
    /// `false` and is never created as a side effect.
    pub async fn is_member(&self, name: &str, addr: SocketAddr) -> bool {
        self.groups
            .lock()
            .await
            .get(name)
            .is_some_and(|members| members.contains(&addr))
    }

    /// Snapshot of a group's membership for fan-out; `None` when the
    /// group does not exist.
    pub async fn members(&self, name: &str) -> Option<HashSet<SocketAddr>> {
        self.groups.lock().await.get(name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.groups.lock().await.len()
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}
