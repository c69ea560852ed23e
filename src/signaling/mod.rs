//! WebRTC signaling relay
//!
//! Browsers connect over WebSocket, claim a username with `register`, and
//! exchange `offer`/`answer`/`candidate` messages addressed by username.
//! Every membership change pushes a `user_list` to all registered peers.
//!
//! There is no authentication: any connection may claim, overwrite or
//! address any username.

pub mod protocol;
pub mod registry;
pub mod session;

pub use protocol::{ClientMessage, ProtocolError, RelayKind, RelayMessage, ServerMessage};
pub use registry::{Delivery, PeerHandle, PeerId, PeerRegistry};
pub use session::{Dispatch, DropReason, PeerSession, SessionState};
