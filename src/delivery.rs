//! Push delivery channel
//!
//! Defines the `DeliveryChannel` seam used by the fanout engine to
//! reach a peer by connection id, plus `PeerChannels`, the bundled
//! implementation backed by per-connection mpsc senders.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::error::DeliveryError;
use crate::types::ConnectionId;

/// Per-connection push channel, addressed by connection id.
///
/// `Gone` is reserved for "this identity no longer resolves to a live
/// peer" and is the only outcome the fanout engine turns into registry
/// cleanup. Backends that can fail in recoverable ways (timeouts,
/// backpressure) report those as `Transient`.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Deliver raw payload bytes to one connection
    async fn send(&self, connection_id: &ConnectionId, payload: &[u8]) -> Result<(), DeliveryError>;
}

/// Outbound byte stream handed to a connection's write task
pub type PeerSender = mpsc::Sender<Vec<u8>>;

/// Delivery channel over in-process peer senders
///
/// The transport adapter registers a sender per accepted connection
/// and unregisters it when the socket closes. An unknown id or a
/// closed channel both mean the peer endpoint is gone.
#[derive(Default)]
pub struct PeerChannels {
    peers: RwLock<HashMap<ConnectionId, PeerSender>>,
}

impl PeerChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outbound channel for a newly accepted connection
    pub async fn register(&self, connection_id: ConnectionId, sender: PeerSender) {
        let mut peers = self.peers.write().await;
        peers.insert(connection_id, sender);
        debug!(connection_id = %connection_id, "Peer channel registered");
    }

    /// Drop the outbound channel for a closed connection
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        let mut peers = self.peers.write().await;
        if peers.remove(connection_id).is_some() {
            debug!(connection_id = %connection_id, "Peer channel unregistered");
        }
    }
}

#[async_trait]
impl DeliveryChannel for PeerChannels {
    async fn send(&self, connection_id: &ConnectionId, payload: &[u8]) -> Result<(), DeliveryError> {
        let sender = {
            let peers = self.peers.read().await;
            peers.get(connection_id).cloned()
        };
        let Some(sender) = sender else {
            return Err(DeliveryError::Gone);
        };
        // A closed receiver means the write task exited with the socket
        sender
            .send(payload.to_vec())
            .await
            .map_err(|_| DeliveryError::Gone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_registered_peer() {
        let channels = PeerChannels::new();
        let id = ConnectionId::new();
        let (tx, mut rx) = mpsc::channel(8);
        channels.register(id, tx).await;

        channels.send(&id, b"hello").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), b"hello".to_vec());
    }

    #[tokio::test]
    async fn test_send_to_unknown_peer_is_gone() {
        let channels = PeerChannels::new();
        let err = channels.send(&ConnectionId::new(), b"x").await.unwrap_err();
        assert!(err.is_gone());
    }

    #[tokio::test]
    async fn test_send_to_closed_peer_is_gone() {
        let channels = PeerChannels::new();
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(8);
        channels.register(id, tx).await;
        drop(rx);

        let err = channels.send(&id, b"x").await.unwrap_err();
        assert!(err.is_gone());
    }

    #[tokio::test]
    async fn test_unregister_makes_peer_gone() {
        let channels = PeerChannels::new();
        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::channel(8);
        channels.register(id, tx).await;
        channels.unregister(&id).await;

        assert!(channels.send(&id, b"x").await.unwrap_err().is_gone());
    }
}
