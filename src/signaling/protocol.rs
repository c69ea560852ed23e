//! Signaling wire protocol
//!
//! Every frame is a single JSON object with a `type` discriminator.
//! Relay messages (`offer`, `answer`, `candidate`) are forwarded verbatim,
//! so they are kept as raw JSON objects rather than decoded into structs;
//! only `type` and `to` are inspected.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while decoding an inbound frame
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("`{kind}` message is missing string field `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

/// Signaling message kinds that are relayed between peers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    Offer,
    Answer,
    Candidate,
}

impl RelayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayKind::Offer => "offer",
            RelayKind::Answer => "answer",
            RelayKind::Candidate => "candidate",
        }
    }

    fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "offer" => Some(RelayKind::Offer),
            "answer" => Some(RelayKind::Answer),
            "candidate" => Some(RelayKind::Candidate),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-to-server message
#[derive(Debug)]
pub enum ClientMessage {
    /// Claim a username for this connection
    Register { username: String },
    /// Addressed message to forward to another peer
    Relay(RelayMessage),
    /// Missing or unrecognised `type`
    Unknown(Option<String>),
}

/// An addressed `offer`/`answer`/`candidate` message
#[derive(Debug, Clone)]
pub struct RelayMessage {
    kind: RelayKind,
    to: String,
    body: Map<String, Value>,
}

impl RelayMessage {
    pub fn kind(&self) -> RelayKind {
        self.kind
    }

    /// Destination username
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Serialize the original message with `from` set to the sender.
    ///
    /// Any client-supplied `from` is overwritten. An unregistered sender
    /// yields `from: null`.
    pub fn into_forwarded(mut self, from: Option<&str>) -> Result<String, serde_json::Error> {
        let from = match from {
            Some(name) => Value::String(name.to_string()),
            None => Value::Null,
        };
        self.body.insert("from".to_string(), from);
        serde_json::to_string(&self.body)
    }
}

/// Server-to-client message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Current set of registered usernames
    UserList { users: Vec<String> },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Decode one inbound frame
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(body) = value else {
        return Err(ProtocolError::NotAnObject);
    };

    let kind = match body.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => return Ok(ClientMessage::Unknown(Some(other.to_string()))),
        None => return Ok(ClientMessage::Unknown(None)),
    };

    if kind == "register" {
        let username = string_field(&body, "register", "username")?;
        return Ok(ClientMessage::Register { username });
    }

    match RelayKind::from_type(kind) {
        Some(relay_kind) => {
            let to = string_field(&body, relay_kind.as_str(), "to")?;
            Ok(ClientMessage::Relay(RelayMessage {
                kind: relay_kind,
                to,
                body,
            }))
        }
        None => Ok(ClientMessage::Unknown(Some(kind.to_string()))),
    }
}

fn string_field(
    body: &Map<String, Value>,
    kind: &'static str,
    field: &'static str,
) -> Result<String, ProtocolError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ProtocolError::MissingField { kind, field })
}
