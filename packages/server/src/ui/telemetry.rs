//! Periodic state snapshot producer.

use std::{sync::Arc, time::Duration};

use boatdash_shared::time::now_millis;
use tokio::time::MissedTickBehavior;

use crate::{
    domain::BroadcastPayload,
    infrastructure::dto::websocket::{MessageType, StateSnapshotMessage},
    usecase::Audience,
};

use super::state::AppState;

/// Broadcast a state snapshot every `period`
pub async fn snapshot_broadcast_loop(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        // A snapshot must not overtake a relay change published after it was taken
        let _order = state.relay_order.lock().await;
        match snapshot_payload(&state).await {
            Ok(payload) => state.broadcasts.publish(payload, Audience::Everyone).await,
            Err(e) => tracing::error!("Failed to serialize state snapshot: {}", e),
        }
    }
}

async fn snapshot_payload(state: &AppState) -> Result<BroadcastPayload, serde_json::Error> {
    let message = StateSnapshotMessage {
        r#type: MessageType::State,
        relays: state.relays.state().await.into(),
        clients: state.repository.count().await,
        uptime_ms: u64::try_from(state.started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
        timestamp: now_millis(),
    };
    BroadcastPayload::from_json(&message)
}
