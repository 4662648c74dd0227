//! Core relay operations
//!
//! Three stateless operations composed around the registry store:
//! `join` records a membership on connect, `leave` removes it on
//! disconnect, and `broadcast` fans an inbound payload out to every
//! other member of the target room. All cross-invocation state lives
//! behind the `RegistryStore` seam; concurrent invocations never share
//! in-process mutable state.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::delivery::DeliveryChannel;
use crate::error::{DeliveryError, RelayError};
use crate::membership::Membership;
use crate::message::InboundEnvelope;
use crate::store::RegistryStore;
use crate::types::{ConnectionId, RoomCode};

/// The relay core
///
/// Cheap to clone via the shared handles; one instance serves every
/// connection.
#[derive(Clone)]
pub struct Relay {
    store: Arc<dyn RegistryStore>,
    delivery: Arc<dyn DeliveryChannel>,
    config: RelayConfig,
}

impl Relay {
    /// Create a relay with default configuration
    pub fn new(store: Arc<dyn RegistryStore>, delivery: Arc<dyn DeliveryChannel>) -> Self {
        Self::with_config(store, delivery, RelayConfig::default())
    }

    /// Create a relay with custom configuration
    pub fn with_config(
        store: Arc<dyn RegistryStore>,
        delivery: Arc<dyn DeliveryChannel>,
        config: RelayConfig,
    ) -> Self {
        Self {
            store,
            delivery,
            config,
        }
    }

    /// Record a membership for a newly connected peer
    ///
    /// A missing or empty room code falls back to the configured
    /// sentinel. Re-joining with the same identity replaces the prior
    /// membership, including switching rooms. Returns the room the
    /// connection ended up in.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room_code: Option<String>,
    ) -> Result<RoomCode, RelayError> {
        let room_code = room_code
            .filter(|code| !code.is_empty())
            .map(RoomCode::new)
            .unwrap_or_else(|| RoomCode::new(self.config.default_room_code.clone()));

        let membership = Membership::new(connection_id, room_code.clone(), self.config.membership_ttl);
        self.store.upsert(membership).await?;

        info!("Connection {} joined room {}", connection_id, room_code);
        Ok(room_code)
    }

    /// Remove the membership for a disconnected peer
    ///
    /// Idempotent: removing an identity that never joined (or already
    /// left) succeeds.
    pub async fn leave(&self, connection_id: ConnectionId) -> Result<(), RelayError> {
        self.store.delete(&connection_id).await?;
        info!("Connection {} left", connection_id);
        Ok(())
    }

    /// Fan an inbound payload out to the other members of its room
    ///
    /// The payload must carry a `roomCode` field; it is rejected before
    /// any registry access otherwise. Deliveries to the resolved
    /// members run concurrently and the call returns only once every
    /// attempt has settled. Members whose channel reports gone are
    /// purged from the registry; other delivery failures are logged
    /// and left alone. Only a failure to resolve the room itself fails
    /// the broadcast. Returns the number of successful deliveries.
    pub async fn broadcast(
        &self,
        sender: ConnectionId,
        payload: &[u8],
    ) -> Result<usize, RelayError> {
        let room_code = InboundEnvelope::room_code_of(payload)?;

        let members = self.store.query_room(&room_code).await?;
        debug!(
            "Resolved {} member(s) in room {} for broadcast from {}",
            members.len(),
            room_code,
            sender
        );

        let attempts = members
            .into_iter()
            .filter(|m| m.connection_id != sender)
            .map(|m| self.deliver(m.connection_id, payload));

        let outcomes = join_all(attempts).await;
        let delivered = outcomes.into_iter().filter(|delivered| *delivered).count();

        debug!("Broadcast to room {} delivered to {} member(s)", room_code, delivered);
        Ok(delivered)
    }

    /// Attempt one delivery and classify the outcome
    async fn deliver(&self, member: ConnectionId, payload: &[u8]) -> bool {
        match self.delivery.send(&member, payload).await {
            Ok(()) => {
                debug!("Delivered to {}", member);
                true
            }
            Err(DeliveryError::Gone) => {
                info!("Connection {} is gone, removing stale membership", member);
                self.reap(member).await;
                false
            }
            Err(DeliveryError::Transient(reason)) => {
                warn!("Delivery to {} failed ({}), keeping membership", member, reason);
                false
            }
        }
    }

    /// Best-effort removal of a stale membership
    ///
    /// Cleanup failure must never abort the broadcast in progress, so
    /// the error stops here: logged, not propagated, not retried.
    async fn reap(&self, connection_id: ConnectionId) {
        if let Err(err) = self.leave(connection_id).await {
            warn!("Stale membership cleanup for {} failed: {}", connection_id, err);
        }
    }
}
