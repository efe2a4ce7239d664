//! WebSocket connection handlers.

use std::{fmt::Display, sync::Arc};

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use boatdash_shared::time::now_millis;
use futures_util::{Sink, Stream, sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{
        BroadcastPayload, CloseReason, ConnectionEvent, ConnectionHandle, ConnectionLifecycle,
        SocketId, Timestamp,
    },
    ui::{error::ApiError, extract::PeerAddr, state::AppState},
    usecase::{RegisterClientUseCase, UnregisterClientUseCase},
};

/// Upgrade to the real-time channel.
///
/// The client is registered before the handshake completes so that a full
/// registry is answered with 503 instead of an upgraded socket.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    PeerAddr(peer): PeerAddr,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.socket_ids.generate();

    // Create a channel for this client to receive broadcasts
    let (tx, rx) = mpsc::channel(state.send_queue);
    let handle = ConnectionHandle::new(id, peer, Timestamp::new(now_millis()), tx);
    let lifecycle = handle.lifecycle().clone();

    let register_usecase = RegisterClientUseCase::new(state.repository.clone());
    register_usecase.execute(handle).await?;

    let failed_state = state.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade failed for client {}: {}", id, e);
            tokio::spawn(async move {
                let unregister_usecase =
                    UnregisterClientUseCase::new(failed_state.repository.clone());
                unregister_usecase
                    .execute(id, CloseReason::UpgradeFailed)
                    .await;
            });
        })
        .on_upgrade(move |socket| handle_socket(socket, state, id, lifecycle, rx)))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    id: SocketId,
    lifecycle: ConnectionLifecycle,
    rx: mpsc::Receiver<BroadcastPayload>,
) {
    // Evicted or cleared between registration and handshake: drop the socket
    match lifecycle.apply(ConnectionEvent::Upgraded) {
        Ok(next) => tracing::debug!("Client {} is {:?}", id, next),
        Err(e) => {
            tracing::info!("Client {} closed before upgrade: {}", id, e);
            return;
        }
    }

    let (sender, receiver) = socket.split();
    drive_connection(sender, receiver, state, id, lifecycle, rx).await;
}

/// Pump one upgraded connection until the transport closes or the
/// connection is unregistered.
///
/// Both socket halves are dropped before this returns, which closes the
/// transport even when a write is stuck on a client that stopped reading.
async fn drive_connection<W, R, E>(
    mut sender: W,
    mut receiver: R,
    state: Arc<AppState>,
    id: SocketId,
    lifecycle: ConnectionLifecycle,
    mut rx: mpsc::Receiver<BroadcastPayload>,
) where
    W: Sink<Message> + Unpin + Send + 'static,
    W::Error: Display + Send,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    // Forward broadcasts to this client until the registry drops its handle
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(e) = sender.send(to_message(&payload)).await {
                tracing::debug!("Failed to write to client {}: {}", id, e);
                break;
            }
        }
        if let Err(e) = sender.close().await {
            tracing::debug!("Failed to close client {}: {}", id, e);
        }
    });

    // Frames from the client carry no commands; read only to observe close
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    tracing::debug!("Ignoring text frame from client {}: {}", id, text.as_str());
                }
                Ok(Message::Binary(data)) => {
                    tracing::debug!(
                        "Ignoring binary frame from client {} ({} bytes)",
                        id,
                        data.len()
                    );
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Client {} requested close", id);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("WebSocket error from client {}: {}", id, e);
                    break;
                }
            }
        }
    });

    // Whichever finishes first ends the connection
    tokio::select! {
        _ = &mut recv_task => {}
        _ = &mut send_task => {}
        reason = lifecycle.closed() => {
            tracing::debug!("Closing socket of client {}: {}", id, reason);
        }
    };
    send_task.abort();
    recv_task.abort();
    // Aborted tasks drop their socket half once they have stopped
    let _ = tokio::join!(send_task, recv_task);

    let unregister_usecase = UnregisterClientUseCase::new(state.repository.clone());
    unregister_usecase
        .execute(id, CloseReason::TransportClosed)
        .await;
}

/// UTF-8 payloads go out as text frames, anything else as binary
fn to_message(payload: &BroadcastPayload) -> Message {
    match payload.as_text() {
        Some(text) => Message::Text(text.to_owned().into()),
        None => Message::Binary(Bytes::copy_from_slice(payload.as_bytes())),
    }
}
