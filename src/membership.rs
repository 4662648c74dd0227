//! Membership record definition
//!
//! One record per live connection, binding a connection identity to a
//! room and a join/expiry time. Rooms are never stored as their own
//! entity: a room is the set of memberships sharing a room code.

use std::time::{Duration, SystemTime};

use crate::types::{ConnectionId, RoomCode};

/// Registry record for one live connection
///
/// Existence means "believed reachable". That belief is advisory: a
/// gone signal during delivery is the source of truth for staleness,
/// and `expires_at` is only a cleanup hint honored by the store.
#[derive(Debug, Clone)]
pub struct Membership {
    /// Transport-assigned connection identity (primary key)
    pub connection_id: ConnectionId,
    /// Room this connection belongs to (secondary index key)
    pub room_code: RoomCode,
    /// Join time, informational only
    pub connected_at: SystemTime,
    /// Absolute time after which the store may purge this record
    pub expires_at: SystemTime,
}

impl Membership {
    /// Create a membership joining now, expiring `ttl` from now
    pub fn new(connection_id: ConnectionId, room_code: RoomCode, ttl: Duration) -> Self {
        let connected_at = SystemTime::now();
        Self {
            connection_id,
            room_code,
            connected_at,
            expires_at: connected_at + ttl,
        }
    }

    /// Whether the record has passed its expiry horizon at `now`
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_stamped_from_join_time() {
        let ttl = Duration::from_secs(3600);
        let m = Membership::new(ConnectionId::new(), RoomCode::new("R1"), ttl);
        assert_eq!(m.expires_at, m.connected_at + ttl);
    }

    #[test]
    fn test_is_expired() {
        let m = Membership::new(ConnectionId::new(), RoomCode::new("R1"), Duration::from_secs(60));
        assert!(!m.is_expired(m.connected_at));
        assert!(m.is_expired(m.connected_at + Duration::from_secs(61)));
    }
}
