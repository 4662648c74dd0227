//! Error types for the relay
//!
//! Defines the operation-level error taxonomy plus the per-member
//! delivery outcome. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Registry store failures
///
/// Surfaced unchanged to the caller of the operation that hit them;
/// retry policy belongs to the store client, never to the core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing store rejected or failed the operation
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Per-member delivery failure
///
/// `Gone` is the distinguished terminated-endpoint signal and the only
/// outcome that triggers registry cleanup. Everything else is treated
/// as possibly transient: logged, never retried within a broadcast.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The addressed peer endpoint no longer exists
    #[error("peer gone")]
    Gone,

    /// Channel or network failure that may not recur
    #[error("transient delivery failure: {0}")]
    Transient(String),
}

impl DeliveryError {
    /// Whether this failure means the membership is stale
    pub fn is_gone(&self) -> bool {
        matches!(self, DeliveryError::Gone)
    }
}

/// Operation-level errors
///
/// Covers both transport-fatal errors (connection termination) and
/// business errors (reported back to the client).
#[derive(Debug, Error)]
pub enum RelayError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound payload carried no roomCode
    #[error("roomCode is required")]
    MissingRoomCode,

    /// Inbound payload was not a JSON object
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// Registry store failure (read or write)
    #[error("registry store error: {0}")]
    Store(#[from] StoreError),
}

impl RelayError {
    /// Whether the caller, not the service, is at fault
    ///
    /// The transport adapter uses this for its bad-request/internal
    /// split when answering the client.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RelayError::MissingRoomCode | RelayError::InvalidPayload(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gone_classification() {
        assert!(DeliveryError::Gone.is_gone());
        assert!(!DeliveryError::Transient("timeout".into()).is_gone());
    }

    #[test]
    fn test_client_error_split() {
        assert!(RelayError::MissingRoomCode.is_client_error());
        assert!(!RelayError::Store(StoreError::Backend("down".into())).is_client_error());
    }
}
