//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::HeaderMap};

use crate::{
    domain::{BroadcastPayload, ProtectedOperation},
    infrastructure::dto::{
        http::{ClientsDto, RelayStateDto},
        websocket::{MessageType, RelaysChangedMessage},
    },
    ui::{body::read_request_body, error::ApiError, extract::PeerAddr, state::AppState},
    usecase::{ApplyRelayCommandUseCase, Audience},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Registry occupancy
pub async fn get_clients(State(state): State<Arc<AppState>>) -> Json<ClientsDto> {
    Json(ClientsDto {
        connected: state.repository.count().await,
        capacity: state.repository.capacity(),
    })
}

/// Current relay state
pub async fn get_relays(State(state): State<Arc<AppState>>) -> Json<RelayStateDto> {
    let usecase = ApplyRelayCommandUseCase::new(state.relays.clone());
    Json(usecase.current().await.into())
}

/// Apply a relay command such as `{"spot":true}`
pub async fn post_relays(
    State(state): State<Arc<AppState>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<RelayStateDto>, ApiError> {
    // Refuse before reading the body
    state
        .policy
        .authorize(ProtectedOperation::RelayControl, peer)?;

    let body = read_request_body(&headers, body, &state.limits.command).await?;

    let usecase = ApplyRelayCommandUseCase::new(state.relays.clone());
    // Clients must see relay states in the order they were applied
    let _order = state.relay_order.lock().await;
    let relays = RelayStateDto::from(usecase.execute(&body).await?);

    let message = RelaysChangedMessage {
        r#type: MessageType::Relays,
        relays,
    };
    match BroadcastPayload::from_json(&message) {
        Ok(payload) => state.broadcasts.publish(payload, Audience::Everyone).await,
        Err(e) => tracing::error!("Failed to serialize relay state: {}", e),
    }

    Ok(Json(relays))
}
