//! Server state shared by every handler.

use std::{sync::Arc, time::Instant};

use tokio::sync::Mutex;

use crate::{
    config::GatewayConfig,
    domain::{
        AccessGuard, AccessPolicy, ClientRepository, FirmwareUpdater, RelayController,
        SocketIdFactory,
    },
    infrastructure::{InMemoryClientRepository, InMemoryFirmwareSlot, InMemoryRelayBank},
    usecase::{BroadcastDispatcher, BroadcastQueue},
};

use super::body::DrainLimits;

/// Body limits per endpoint
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub command: DrainLimits,
    pub firmware: DrainLimits,
}

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn ClientRepository>,
    /// Relay-control collaborator
    pub relays: Arc<dyn RelayController>,
    /// Firmware collaborator
    pub firmware: Arc<dyn FirmwareUpdater>,
    /// Ordered fan-out to registered clients
    pub broadcasts: BroadcastQueue,
    /// Held while a relay change is applied and published
    pub relay_order: Mutex<()>,
    /// Held while an image is staged and published
    pub firmware_order: Mutex<()>,
    /// Which operations need an access-point peer
    pub policy: AccessPolicy,
    pub limits: RequestLimits,
    pub socket_ids: SocketIdFactory,
    /// Outgoing frames queued per client
    pub send_queue: usize,
    pub started_at: Instant,
}

impl AppState {
    /// State backed by the in-memory collaborators.
    ///
    /// Spawns the broadcast task, so this must run inside a Tokio runtime.
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(InMemoryRelayBank::default()),
            Arc::new(InMemoryFirmwareSlot::new()),
        )
    }

    pub fn with_collaborators(
        config: &GatewayConfig,
        relays: Arc<dyn RelayController>,
        firmware: Arc<dyn FirmwareUpdater>,
    ) -> Self {
        let repository: Arc<dyn ClientRepository> =
            Arc::new(InMemoryClientRepository::with_capacity(config.max_clients));
        let guard = AccessGuard::new(config.ap_subnet);
        let dispatcher = Arc::new(BroadcastDispatcher::new(
            repository.clone(),
            guard,
            config.send_timeout(),
        ));
        let body_limits = |max_bytes| DrainLimits {
            max_bytes,
            read_timeout: config.read_timeout(),
            read_retries: config.read_retries,
        };

        Self {
            repository,
            relays,
            firmware,
            broadcasts: BroadcastQueue::spawn(dispatcher),
            relay_order: Mutex::new(()),
            firmware_order: Mutex::new(()),
            policy: AccessPolicy::new(guard, config.guard_relays),
            limits: RequestLimits {
                command: body_limits(config.command_max_bytes),
                firmware: body_limits(config.firmware_max_bytes),
            },
            socket_ids: SocketIdFactory::new(),
            send_queue: config.send_queue,
            started_at: Instant::now(),
        }
    }
}
