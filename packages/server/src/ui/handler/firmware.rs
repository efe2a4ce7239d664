//! Firmware upload endpoint.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::HeaderMap};

use crate::{
    domain::{BroadcastPayload, ProtectedOperation},
    infrastructure::dto::{
        http::FirmwareStagedDto,
        websocket::{FirmwareStagedMessage, MessageType},
    },
    ui::{body::read_request_body, error::ApiError, extract::PeerAddr, state::AppState},
    usecase::{Audience, UploadFirmwareUseCase},
};

/// Stage an uploaded firmware image for the next boot.
///
/// Only peers on the access-point network may upload. The outcome is pushed
/// to access-point clients only.
pub async fn upload_firmware(
    State(state): State<Arc<AppState>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<FirmwareStagedDto>, ApiError> {
    state
        .policy
        .authorize(ProtectedOperation::FirmwareUpload, peer)?;

    let image = read_request_body(&headers, body, &state.limits.firmware).await?;
    tracing::info!("Received firmware image ({} bytes)", image.len());

    let usecase = UploadFirmwareUseCase::new(state.firmware.clone());
    let _order = state.firmware_order.lock().await;
    let staged = FirmwareStagedDto::from(usecase.execute(image).await?);

    let message = FirmwareStagedMessage {
        r#type: MessageType::FirmwareStaged,
        bytes: staged.bytes,
        staged_at: staged.staged_at,
    };
    match BroadcastPayload::from_json(&message) {
        Ok(payload) => {
            state
                .broadcasts
                .publish(payload, Audience::AccessPointOnly)
                .await
        }
        Err(e) => tracing::error!("Failed to serialize firmware status: {}", e),
    }

    Ok(Json(staged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GatewayConfig,
        infrastructure::{InMemoryFirmwareSlot, InMemoryRelayBank},
        ui::create_router,
    };
    use axum::{
        Router,
        extract::ConnectInfo,
        http::{Request, StatusCode},
    };
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn create_test_app(firmware_max_bytes: usize) -> (Router, Arc<InMemoryFirmwareSlot>) {
        let config = GatewayConfig {
            firmware_max_bytes,
            ..GatewayConfig::default()
        };
        let firmware = Arc::new(InMemoryFirmwareSlot::new());
        let state = Arc::new(AppState::with_collaborators(
            &config,
            Arc::new(InMemoryRelayBank::default()),
            firmware.clone(),
        ));
        (create_router(state, None), firmware)
    }

    fn ota_request(peer: ([u8; 4], u16), image: Vec<u8>) -> Request<Body> {
        let mut request = Request::post("/api/ota")
            .header("content-type", "application/octet-stream")
            .header("content-length", image.len())
            .body(Body::from(image))
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(peer)));
        request
    }

    #[tokio::test]
    async fn test_upload_firmware_from_access_point() {
        // テスト項目: AP 内からのアップロードはステージされる
        // given (前提条件):
        let (app, firmware) = create_test_app(1024);

        // when (操作):
        let response = app
            .oneshot(ota_request(([192, 168, 4, 2], 50000), vec![0xe9; 512]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(firmware.staged_len().await, Some(512));
    }

    #[tokio::test]
    async fn test_upload_firmware_from_uplink_is_forbidden() {
        // テスト項目: AP 外からのアップロードは 403 になり、何もステージされない
        // given (前提条件):
        let (app, firmware) = create_test_app(1024);

        // when (操作):
        let response = app
            .oneshot(ota_request(([10, 1, 2, 3], 50000), vec![0xe9; 512]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(firmware.staged_len().await, None);
    }

    #[tokio::test]
    async fn test_upload_firmware_too_large() {
        // テスト項目: 上限を超えるイメージは 413 になる
        // given (前提条件):
        let (app, firmware) = create_test_app(1024);

        // when (操作):
        let response = app
            .oneshot(ota_request(([192, 168, 4, 2], 50000), vec![0xe9; 2048]))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(firmware.staged_len().await, None);
    }

    #[tokio::test]
    async fn test_upload_firmware_empty_image() {
        // テスト項目: 空のイメージは 400 になる
        // given (前提条件):
        let (app, _firmware) = create_test_app(1024);

        // when (操作):
        let response = app
            .oneshot(ota_request(([192, 168, 4, 2], 50000), Vec::new()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
