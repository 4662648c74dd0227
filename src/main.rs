//! Room Broadcast Relay - Entry Point
//!
//! Starts the TCP listener and the relay core, accepting connections.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use room_relay::{handle_connection, MemoryStore, PeerChannels, Relay};

/// Default server address
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=room_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("room_relay=info")),
        )
        .init();

    // Get bind address from command line or use default
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    // Start TCP listener
    let listener = TcpListener::bind(&addr).await?;
    info!("Room relay listening on {}", addr);

    // Wire the core: in-memory registry + in-process peer channels
    let channels = Arc::new(PeerChannels::new());
    let relay = Relay::new(Arc::new(MemoryStore::new()), channels.clone());

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let relay = relay.clone();
                let channels = channels.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, relay, channels).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
