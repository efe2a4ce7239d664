//! Server startup and shutdown.

use std::{future::Future, net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;

use crate::{
    config::GatewayConfig,
    error::ServerError,
    usecase::{UnregisterClientUseCase, UploadFirmwareUseCase},
};

use super::{router::create_router, signal::shutdown_signal, state::AppState, telemetry};

/// Bind the configured address and serve until Ctrl-C / SIGTERM
pub async fn run(config: GatewayConfig) -> Result<(), ServerError> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// On shutdown every registered client is unregistered, which closes its
/// socket.
pub async fn serve<F>(
    listener: TcpListener,
    config: GatewayConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::new(&config));

    // Reaching this point means the running image boots; cancel any pending rollback
    let firmware_usecase = UploadFirmwareUseCase::new(state.firmware.clone());
    if let Err(e) = firmware_usecase.confirm_running_image().await {
        tracing::error!("Failed to confirm running firmware image: {}", e);
    }

    let telemetry_task = config.telemetry_interval().map(|period| {
        tracing::info!("Broadcasting state snapshots every {:?}", period);
        tokio::spawn(telemetry::snapshot_broadcast_loop(state.clone(), period))
    });

    let app = create_router(state.clone(), config.assets_dir.as_deref());
    if let Some(dir) = &config.assets_dir {
        tracing::info!("Serving UI assets from {}", dir.display());
    }

    tracing::info!(
        "BoatDash gateway listening on {} (access-point subnet {}, {} clients max)",
        listener.local_addr()?,
        config.ap_subnet,
        config.max_clients
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    if let Some(task) = telemetry_task {
        task.abort();
    }

    let unregister_usecase = UnregisterClientUseCase::new(state.repository.clone());
    let cleared = unregister_usecase.clear_all().await;
    tracing::info!("Server stopped, {} clients disconnected", cleared);

    Ok(())
}
