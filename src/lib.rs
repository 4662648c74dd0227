//! Room-Scoped Broadcast Relay Library
//!
//! A WebSocket broadcast relay built with tokio-tungstenite: clients
//! connect into a named room and every message is fanned out to the
//! other members of that room.
//!
//! # Features
//! - WebSocket connection handling with room selection at connect time
//! - Membership registry with per-record expiry hints
//! - Concurrent per-member fanout with a join-all barrier
//! - Stale-connection detection and cleanup via gone signals
//! - Opaque payload passthrough (the relay only reads `roomCode`)
//!
//! # Architecture
//! The core is stateless per invocation: `Relay` runs the three
//! operations (join / leave / broadcast) against two trait seams,
//! `RegistryStore` for membership state and `DeliveryChannel` for
//! pushing bytes to a peer. The bundled `MemoryStore` and
//! `PeerChannels` implementations make a single-process server;
//! swapping the seams swaps the backing infrastructure.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use room_relay::{handle_connection, MemoryStore, PeerChannels, Relay};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let channels = Arc::new(PeerChannels::new());
//!     let relay = Relay::new(Arc::new(MemoryStore::new()), channels.clone());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         tokio::spawn(handle_connection(stream, relay.clone(), channels.clone()));
//!     }
//! }
//! ```

pub mod config;
pub mod delivery;
pub mod error;
pub mod handler;
pub mod membership;
pub mod message;
pub mod relay;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config::RelayConfig;
pub use delivery::{DeliveryChannel, PeerChannels, PeerSender};
pub use error::{DeliveryError, RelayError, StoreError};
pub use handler::handle_connection;
pub use membership::Membership;
pub use message::{ControlMessage, ErrorCode, InboundEnvelope};
pub use relay::Relay;
pub use store::{MemoryStore, RegistryStore};
pub use types::{ConnectionId, RoomCode};
