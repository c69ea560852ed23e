//! rtc-signal-relay - minimal WebRTC signaling relay
//!
//! Serves the browser client's static assets and relays session
//! negotiation messages between peers over WebSocket on the same port.

pub mod config;
pub mod error;
pub mod signaling;
pub mod state;
pub mod web;

pub use error::{AppError, Result};
