//! Peer registry
//!
//! Maps usernames to live connections. Each connection is represented by a
//! [`PeerHandle`]: a unique [`PeerId`] plus the sending half of the
//! connection's outbound queue. The queue is unbounded, so sends never wait
//! and can safely happen while the registry lock is held.

use parking_lot::{RwLock, RwLockWriteGuard};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::protocol::ServerMessage;

/// Unique identity of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(Uuid);

impl PeerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sending side of a connection
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: PeerId,
    tx: mpsc::UnboundedSender<String>,
}

impl PeerHandle {
    /// Create a handle and the receiver the connection task drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: PeerId::new(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    /// The connection is open while its task still drains the queue
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a text frame. Returns `false` if the connection is gone.
    pub fn send(&self, text: String) -> bool {
        self.tx.send(text).is_ok()
    }
}

/// Result of a forward attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    UnknownRecipient,
    RecipientClosed,
}

/// Username to connection table shared by all connection tasks
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<String, PeerHandle>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `username` to `peer` and broadcast the new user list.
    ///
    /// An existing entry for the same name is replaced without notifying its
    /// connection. Returns the identity of the replaced connection, if any.
    pub fn register(&self, username: &str, peer: &PeerHandle) -> Option<PeerId> {
        let mut peers = self.peers.write();
        let replaced = peers
            .insert(username.to_string(), peer.clone())
            .map(|old| old.id)
            .filter(|old| *old != peer.id);

        if let Some(old) = replaced {
            info!(
                "Username '{}' moved from connection {} to {}",
                username, old, peer.id
            );
        }

        let peers = RwLockWriteGuard::downgrade(peers);
        broadcast_user_list(&peers);
        replaced
    }

    /// Remove every entry still pointing at connection `id`.
    ///
    /// Entries that a newer connection has taken over are left alone.
    /// Broadcasts the user list when anything was removed and returns the
    /// removed usernames.
    pub fn remove(&self, id: PeerId) -> Vec<String> {
        let mut peers = self.peers.write();
        let mut removed = Vec::new();
        peers.retain(|name, handle| {
            if handle.id == id {
                removed.push(name.clone());
                false
            } else {
                true
            }
        });

        if !removed.is_empty() {
            let peers = RwLockWriteGuard::downgrade(peers);
            broadcast_user_list(&peers);
        }
        removed
    }

    /// Deliver an already serialized frame to `to`
    pub fn forward(&self, to: &str, text: String) -> Delivery {
        let peers = self.peers.read();
        let Some(target) = peers.get(to) else {
            return Delivery::UnknownRecipient;
        };
        if !target.is_open() {
            return Delivery::RecipientClosed;
        }
        if target.send(text) {
            Delivery::Delivered
        } else {
            Delivery::RecipientClosed
        }
    }

    /// Connection currently registered under `username`
    pub fn lookup(&self, username: &str) -> Option<PeerId> {
        self.peers.read().get(username).map(PeerHandle::id)
    }

    /// Sorted snapshot of registered usernames
    pub fn usernames(&self) -> Vec<String> {
        sorted_names(&self.peers.read())
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

fn sorted_names(peers: &HashMap<String, PeerHandle>) -> Vec<String> {
    let mut users: Vec<String> = peers.keys().cloned().collect();
    users.sort();
    users
}

/// Send one `user_list` snapshot to every open registered connection.
///
/// Runs under the registry lock so the snapshot and the recipients agree.
/// Closed connections are skipped, not removed.
fn broadcast_user_list(peers: &HashMap<String, PeerHandle>) {
    let msg = ServerMessage::UserList {
        users: sorted_names(peers),
    };
    let json = match msg.to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize user list: {}", e);
            return;
        }
    };

    let mut sent = 0usize;
    for (name, handle) in peers.iter() {
        if !handle.is_open() {
            trace!("Skipping closed connection for '{}'", name);
            continue;
        }
        if handle.send(json.clone()) {
            sent += 1;
        }
    }
    debug!("Broadcast user list ({} users) to {} peers", peers.len(), sent);
}
