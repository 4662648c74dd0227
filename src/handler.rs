//! WebSocket connection handler
//!
//! The transport adapter: accepts the WebSocket upgrade, assigns a
//! connection identity, and turns socket events into the three core
//! operations — join on connect, broadcast per inbound frame, leave
//! on close.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::delivery::{PeerChannels, PeerSender};
use crate::error::RelayError;
use crate::message::ControlMessage;
use crate::relay::Relay;
use crate::types::ConnectionId;

/// Buffer size for the per-connection outbound channel
const PEER_CHANNEL_SIZE: usize = 32;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake (reading the `roomCode` query
/// parameter off the upgrade request), registers the connection, and
/// pumps frames until either side closes.
pub async fn handle_connection(
    stream: TcpStream,
    relay: Relay,
    channels: Arc<PeerChannels>,
) -> Result<(), RelayError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake; the room is named in the upgrade request
    // query string, e.g. GET /?roomCode=R1
    let mut requested_room: Option<String> = None;
    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| {
        requested_room = query_param(req.uri().query(), "roomCode");
        Ok(resp)
    })
    .await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign connection identity
    let connection_id = ConnectionId::new();
    info!("Connection {} accepted from {}", connection_id, peer_addr);

    // Create the outbound byte channel and make this peer addressable
    let (peer_tx, mut peer_rx) = mpsc::channel::<Vec<u8>>(PEER_CHANNEL_SIZE);
    channels.register(connection_id, peer_tx.clone()).await;

    // Record the membership
    let room_code = match relay.join(connection_id, requested_room).await {
        Ok(room_code) => room_code,
        Err(err) => {
            error!("Failed to register connection {}: {}", connection_id, err);
            channels.unregister(&connection_id).await;
            if let Ok(frame) = serde_json::to_string(&ControlMessage::from(&err)) {
                let _ = ws_sender.send(Message::Text(frame.into())).await;
            }
            let _ = ws_sender.close().await;
            return Err(err);
        }
    };

    // Acknowledge the join
    let connected = ControlMessage::Connected {
        connection_id: connection_id.to_string(),
        room_code: room_code.to_string(),
    };
    let json = serde_json::to_string(&connected)?;
    ws_sender.send(Message::Text(json.into())).await?;

    // Clone handles for the read task
    let relay_read = relay.clone();
    let reply_tx = peer_tx.clone();

    // Spawn read task (inbound frames -> broadcast)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    broadcast_frame(&relay_read, connection_id, text.as_bytes(), &reply_tx).await;
                }
                Ok(Message::Binary(data)) => {
                    broadcast_frame(&relay_read, connection_id, &data, &reply_tx).await;
                }
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    debug!("Ping from {}", connection_id);
                    // Pong is handled automatically by tungstenite
                }
                Ok(Message::Pong(_)) => {
                    debug!("Pong from {}", connection_id);
                }
                Ok(_) => {
                    // Raw frames - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Spawn write task (relayed bytes -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(bytes) = peer_rx.recv().await {
            // Payloads pass through opaque; text when they decode, raw otherwise
            let msg = match String::from_utf8(bytes) {
                Ok(text) => Message::Text(text.into()),
                Err(raw) => Message::Binary(raw.into_bytes().into()),
            };
            if ws_sender.send(msg).await.is_err() {
                debug!("WebSocket send failed, ending write task");
                break;
            }
        }
        debug!("Write task ended for {}", connection_id);

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", connection_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", connection_id);
        }
    }

    // Tear down: stop routing to this peer, then drop the membership
    channels.unregister(&connection_id).await;
    if let Err(err) = relay.leave(connection_id).await {
        error!("Failed to remove membership for {}: {}", connection_id, err);
    }

    info!("Connection {} disconnected", connection_id);

    Ok(())
}

/// Run one broadcast and report failures back to the sender
async fn broadcast_frame(
    relay: &Relay,
    connection_id: ConnectionId,
    payload: &[u8],
    reply: &PeerSender,
) {
    match relay.broadcast(connection_id, payload).await {
        Ok(count) => {
            debug!("Connection {} broadcast to {} member(s)", connection_id, count);
        }
        Err(err) => {
            if err.is_client_error() {
                warn!("Rejected payload from {}: {}", connection_id, err);
            } else {
                error!("Broadcast from {} failed: {}", connection_id, err);
            }
            if let Ok(frame) = serde_json::to_string(&ControlMessage::from(&err)) {
                let _ = reply.send(frame.into_bytes()).await;
            }
        }
    }
}

/// Extract a query parameter from an upgrade request query string
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_present() {
        assert_eq!(
            query_param(Some("roomCode=R1"), "roomCode"),
            Some("R1".to_string())
        );
        assert_eq!(
            query_param(Some("a=1&roomCode=R1&b=2"), "roomCode"),
            Some("R1".to_string())
        );
    }

    #[test]
    fn test_query_param_absent() {
        assert_eq!(query_param(None, "roomCode"), None);
        assert_eq!(query_param(Some("a=1&b=2"), "roomCode"), None);
    }

    #[test]
    fn test_query_param_empty_value() {
        assert_eq!(query_param(Some("roomCode="), "roomCode"), None);
    }
}
