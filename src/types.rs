//! Basic type definitions for the relay
//!
//! Provides newtype wrappers for type safety:
//! - `ConnectionId`: UUID-based unique connection identifier
//! - `RoomCode`: client-supplied room name

use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 assigned by the transport when a peer connects.
/// Implements Hash and Eq for use as registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room code identifying a broadcast room
///
/// Rooms are named by clients and exist only as the set of current
/// memberships sharing a code. Codes are matched verbatim, no
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Create a RoomCode from a string
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_room_code_verbatim() {
        let code = RoomCode::new("Lobby-1");
        assert_eq!(code.0, "Lobby-1");
        assert_eq!(code.to_string(), "Lobby-1");
    }

    #[test]
    fn test_room_code_eq_is_case_sensitive() {
        assert_ne!(RoomCode::new("r1"), RoomCode::new("R1"));
    }
}
