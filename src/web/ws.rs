//! WebSocket transport for the signaling relay
//!
//! Each upgraded connection runs one task that multiplexes two sources
//! with `select!`: inbound frames from the browser, fed into a
//! [`PeerSession`], and outbound frames queued by the registry for this
//! peer.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{info, trace, warn};

use crate::signaling::{PeerRegistry, PeerSession};

/// Upgrade the request and hand the socket to the relay
pub fn upgrade(ws: WebSocketUpgrade, registry: Arc<PeerRegistry>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Drive one signaling connection until either side closes
async fn handle_socket(socket: WebSocket, registry: Arc<PeerRegistry>) {
    let (mut sender, mut receiver) = socket.split();
    let (mut session, mut outbound) = PeerSession::open(registry);

    info!("Signaling client connected: {}", session.id());

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let outcome = session.handle_text(&text);
                        trace!("Connection {}: {:?}", session.id(), outcome);
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let outcome = session.handle_binary(&data);
                        trace!("Connection {}: {:?}", session.id(), outcome);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket receive error on {}: {}", session.id(), e);
                        break;
                    }
                    // Ping/pong are answered by the transport
                    Some(Ok(_)) => {}
                }
            }

            frame = outbound.recv() => {
                // The session holds a sender, so the queue never ends first
                let Some(frame) = frame else { break };
                if let Err(e) = sender.send(Message::Text(frame)).await {
                    warn!("Failed to send to {}, disconnecting: {}", session.id(), e);
                    break;
                }
            }
        }
    }

    // Stop accepting frames before the registry cleanup so the peer
    // no longer counts as open
    drop(outbound);
    session.close();
    info!("Signaling client disconnected: {}", session.id());
}
