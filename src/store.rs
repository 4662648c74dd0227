//! Connection registry store
//!
//! Defines the `RegistryStore` seam the relay operations run against,
//! plus `MemoryStore`, the bundled single-process implementation.
//! The store is the only point of mutual exclusion in the system:
//! upsert/delete are atomic per key, concurrent writes for the same
//! identity resolve to last-write-wins.

use std::collections::HashMap;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::membership::Membership;
use crate::types::{ConnectionId, RoomCode};

/// Durable membership registry, keyed by connection identity with a
/// secondary lookup by room code.
///
/// `query_room` must return the complete member list for the room: a
/// backend that paginates under load has to drain every page before
/// returning. The `expires_at` hint on each record is honored by the
/// store asynchronously; callers must tolerate reads that still
/// contain records past their horizon.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Insert or replace the membership for its connection id
    async fn upsert(&self, membership: Membership) -> Result<(), StoreError>;

    /// Delete the membership for a connection id.
    /// Deleting a non-existent entry is not an error.
    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), StoreError>;

    /// All current memberships whose room code matches
    async fn query_room(&self, room_code: &RoomCode) -> Result<Vec<Membership>, StoreError>;
}

/// In-memory registry store
///
/// A RwLock'd map keyed by connection id. Room membership is derived
/// by filtering, never stored separately. Expired records are skipped
/// at query time rather than purged by a background task.
#[derive(Default)]
pub struct MemoryStore {
    memberships: RwLock<HashMap<ConnectionId, Membership>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records (expired ones included until purged)
    pub async fn len(&self) -> usize {
        self.memberships.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memberships.read().await.is_empty()
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn upsert(&self, membership: Membership) -> Result<(), StoreError> {
        let mut memberships = self.memberships.write().await;
        debug!(
            connection_id = %membership.connection_id,
            room_code = %membership.room_code,
            "Membership upserted"
        );
        memberships.insert(membership.connection_id, membership);
        Ok(())
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), StoreError> {
        let mut memberships = self.memberships.write().await;
        if memberships.remove(connection_id).is_some() {
            debug!(connection_id = %connection_id, "Membership deleted");
        }
        Ok(())
    }

    async fn query_room(&self, room_code: &RoomCode) -> Result<Vec<Membership>, StoreError> {
        let now = SystemTime::now();
        let memberships = self.memberships.read().await;
        Ok(memberships
            .values()
            .filter(|m| &m.room_code == room_code && !m.is_expired(now))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(86400);

    fn member(id: ConnectionId, room: &str) -> Membership {
        Membership::new(id, RoomCode::new(room), TTL)
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_id() {
        let store = MemoryStore::new();
        let id = ConnectionId::new();

        store.upsert(member(id, "R1")).await.unwrap();
        store.upsert(member(id, "R1")).await.unwrap();

        let members = store.query_room(&RoomCode::new("R1")).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].connection_id, id);
    }

    #[tokio::test]
    async fn test_upsert_moves_between_rooms() {
        let store = MemoryStore::new();
        let id = ConnectionId::new();

        store.upsert(member(id, "R1")).await.unwrap();
        store.upsert(member(id, "R2")).await.unwrap();

        assert!(store.query_room(&RoomCode::new("R1")).await.unwrap().is_empty());
        let members = store.query_room(&RoomCode::new("R2")).await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let id = ConnectionId::new();
        store.upsert(member(id, "R1")).await.unwrap();

        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();

        assert!(store.query_room(&RoomCode::new("R1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_room_filters_by_code() {
        let store = MemoryStore::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        store.upsert(member(a, "R1")).await.unwrap();
        store.upsert(member(b, "R2")).await.unwrap();

        let members = store.query_room(&RoomCode::new("R1")).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].connection_id, a);
    }

    #[tokio::test]
    async fn test_query_room_skips_expired() {
        let store = MemoryStore::new();
        let live = ConnectionId::new();
        let dead = ConnectionId::new();
        store.upsert(member(live, "R1")).await.unwrap();
        store
            .upsert(Membership::new(dead, RoomCode::new("R1"), Duration::ZERO))
            .await
            .unwrap();

        let members = store.query_room(&RoomCode::new("R1")).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].connection_id, live);
        // Record is skipped, not purged
        assert_eq!(store.len().await, 2);
    }
}
