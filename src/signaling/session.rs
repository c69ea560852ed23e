//! Per-connection signaling state machine
//!
//! ```text
//! Connected --register--> Registered(username) --close--> Closed
//!     |                                                     ^
//!     +--------------------------close----------------------+
//! ```
//!
//! The session is transport agnostic: the WebSocket task feeds it inbound
//! text and drains the receiver returned by [`PeerSession::open`].

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::protocol::{parse_client_message, ClientMessage, ProtocolError, RelayKind};
use super::registry::{Delivery, PeerHandle, PeerId, PeerRegistry};

/// Lifecycle state of one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Registered(String),
    Closed,
}

/// What happened to one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Registered,
    Forwarded(RelayKind),
    Dropped(DropReason),
    Ignored,
}

/// Why an inbound frame produced no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    UnknownRecipient,
    RecipientClosed,
    SessionClosed,
}

pub struct PeerSession {
    registry: Arc<PeerRegistry>,
    handle: PeerHandle,
    state: SessionState,
}

impl PeerSession {
    /// Start a session for a freshly connected transport.
    ///
    /// The receiver yields every frame the relay wants written to this
    /// connection. Dropping it marks the connection as not open.
    pub fn open(registry: Arc<PeerRegistry>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (handle, rx) = PeerHandle::channel();
        let session = Self {
            registry,
            handle,
            state: SessionState::Connected,
        };
        (session, rx)
    }

    pub fn id(&self) -> PeerId {
        self.handle.id()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn username(&self) -> Option<&str> {
        match &self.state {
            SessionState::Registered(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Handle one inbound text frame
    pub fn handle_text(&mut self, text: &str) -> Dispatch {
        if self.state == SessionState::Closed {
            return Dispatch::Dropped(DropReason::SessionClosed);
        }

        let msg = match parse_client_message(text) {
            Ok(msg) => msg,
            Err(e) => {
                log_malformed(self.id(), &e);
                return Dispatch::Dropped(DropReason::Malformed);
            }
        };

        match msg {
            ClientMessage::Register { username } => {
                info!("Connection {} registered as '{}'", self.id(), username);
                self.registry.register(&username, &self.handle);
                self.state = SessionState::Registered(username);
                Dispatch::Registered
            }
            ClientMessage::Relay(relay) => {
                let kind = relay.kind();
                let to = relay.to().to_string();
                let text = match relay.into_forwarded(self.username()) {
                    Ok(text) => text,
                    Err(e) => {
                        debug!("Failed to re-encode {} from {}: {}", kind, self.id(), e);
                        return Dispatch::Dropped(DropReason::Malformed);
                    }
                };

                match self.registry.forward(&to, text) {
                    Delivery::Delivered => {
                        debug!("Forwarded {} from {:?} to '{}'", kind, self.username(), to);
                        Dispatch::Forwarded(kind)
                    }
                    Delivery::UnknownRecipient => {
                        debug!("Dropped {} to unknown recipient '{}'", kind, to);
                        Dispatch::Dropped(DropReason::UnknownRecipient)
                    }
                    Delivery::RecipientClosed => {
                        debug!("Dropped {} to closed recipient '{}'", kind, to);
                        Dispatch::Dropped(DropReason::RecipientClosed)
                    }
                }
            }
            ClientMessage::Unknown(kind) => {
                debug!("Ignoring message of type {:?} from {}", kind, self.id());
                Dispatch::Ignored
            }
        }
    }

    /// Handle a binary frame; only UTF-8 JSON is meaningful
    pub fn handle_binary(&mut self, data: &[u8]) -> Dispatch {
        match std::str::from_utf8(data) {
            Ok(text) => self.handle_text(text),
            Err(_) => {
                debug!("Dropped non UTF-8 binary frame from {}", self.id());
                Dispatch::Dropped(DropReason::Malformed)
            }
        }
    }

    /// Transport closed: drop this connection's registry entries.
    ///
    /// Idempotent. Entries taken over by newer connections are untouched.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        let removed = self.registry.remove(self.id());
        if removed.is_empty() {
            info!("Connection {} closed", self.id());
        } else {
            info!("Connection {} closed, unregistered {:?}", self.id(), removed);
        }
        self.state = SessionState::Closed;
    }
}

impl Drop for PeerSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn log_malformed(id: PeerId, err: &ProtocolError) {
    debug!("Dropped malformed message from {}: {}", id, err);
}
