//! Wire message definitions
//!
//! Inbound broadcast payloads are opaque JSON objects relayed verbatim;
//! the relay only inspects their `roomCode` field. Outbound control
//! frames use Serde's tagged enum with snake_case naming.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::types::RoomCode;

/// Room-addressing envelope of an inbound payload
///
/// Deserialization reads only the `roomCode` field; everything else in
/// the object passes through the relay untouched.
#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    #[serde(rename = "roomCode")]
    pub room_code: Option<String>,
}

impl InboundEnvelope {
    /// Extract the target room from raw payload bytes
    ///
    /// Absent or empty `roomCode` is a client error, as is a payload
    /// that does not decode as a JSON object.
    pub fn room_code_of(payload: &[u8]) -> Result<RoomCode, RelayError> {
        let envelope: InboundEnvelope = serde_json::from_slice(payload)?;
        match envelope.room_code {
            Some(code) if !code.is_empty() => Ok(RoomCode::new(code)),
            _ => Err(RelayError::MissingRoomCode),
        }
    }
}

/// Server → Client control frame
///
/// Sent alongside relayed payloads: a join acknowledgement on connect,
/// an error report when an operation fails.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Connection registered, identity and room issued
    Connected {
        connection_id: String,
        room_code: String,
    },
    /// Operation failed
    Error { code: ErrorCode, message: String },
}

/// Error codes for ControlMessage::Error
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Payload carried no roomCode
    MissingRoomCode,
    /// Payload was not a JSON object
    InvalidPayload,
    /// Store or transport failure on the server side
    Internal,
}

/// Convert a RelayError to a control frame for client notification
impl From<&RelayError> for ControlMessage {
    fn from(err: &RelayError) -> Self {
        let (code, message) = match err {
            RelayError::MissingRoomCode => {
                (ErrorCode::MissingRoomCode, "roomCode is required".to_string())
            }
            RelayError::InvalidPayload(e) => {
                (ErrorCode::InvalidPayload, format!("Invalid payload: {}", e))
            }
            _ => (ErrorCode::Internal, "Internal error".to_string()),
        };
        ControlMessage::Error { code, message }
    }
}
