//! Core domain models for the UI gateway.

use serde::{Deserialize, Serialize};
use std::{fmt, net::SocketAddr, sync::Arc};
use tokio::sync::{mpsc, watch};

use super::{
    error::{CommandError, ConnectionError, FirmwareError},
    value_object::{BroadcastPayload, RelayName, SocketId, Timestamp},
};

/// Handle of one real-time connection.
///
/// Two handles are equal when they carry the same socket id. The sender is
/// the connection's outbound queue; its writer task owns the receiving end.
/// Clones share one [`ConnectionLifecycle`].
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Transport-level socket identifier
    pub id: SocketId,
    /// Peer address reported by the transport, if any
    pub peer: Option<SocketAddr>,
    /// Timestamp when the connection was accepted
    pub connected_at: Timestamp,
    sender: mpsc::Sender<BroadcastPayload>,
    lifecycle: ConnectionLifecycle,
}

impl ConnectionHandle {
    /// Create a new connection handle in the `Connecting` state
    pub fn new(
        id: SocketId,
        peer: Option<SocketAddr>,
        connected_at: Timestamp,
        sender: mpsc::Sender<BroadcastPayload>,
    ) -> Self {
        Self {
            id,
            peer,
            connected_at,
            sender,
            lifecycle: ConnectionLifecycle::new(),
        }
    }

    /// Outbound queue of the connection
    pub fn sender(&self) -> &mpsc::Sender<BroadcastPayload> {
        &self.sender
    }

    pub fn lifecycle(&self) -> &ConnectionLifecycle {
        &self.lifecycle
    }
}

/// Shared, observable [`ConnectionState`] of one connection.
///
/// The registry side drives `Closed` transitions; the socket side drives
/// `Upgraded` and waits on [`ConnectionLifecycle::closed`] to tear the
/// transport down.
#[derive(Debug, Clone)]
pub struct ConnectionLifecycle(Arc<watch::Sender<ConnectionState>>);

impl ConnectionLifecycle {
    pub fn new() -> Self {
        Self(Arc::new(watch::Sender::new(ConnectionState::default())))
    }

    pub fn current(&self) -> ConnectionState {
        *self.0.borrow()
    }

    /// Apply an event to the shared state.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::InvalidTransition` and leaves the state
    /// untouched when the event is not allowed.
    pub fn apply(&self, event: ConnectionEvent) -> Result<ConnectionState, ConnectionError> {
        let mut outcome = None;
        self.0.send_if_modified(|state| match state.on(event) {
            Ok(next) => {
                *state = next;
                outcome = Some(Ok(next));
                true
            }
            Err(e) => {
                outcome = Some(Err(e));
                false
            }
        });
        outcome.unwrap_or_else(|| Ok(self.current()))
    }

    /// Wait until the connection reaches `Closed`, returning the reason
    pub async fn closed(&self) -> CloseReason {
        let mut rx = self.0.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            if let ConnectionState::Closed(reason) = state {
                return reason;
            }
            // The sender lives in `self`, so the channel stays open
            if rx.changed().await.is_err() {
                return CloseReason::TransportClosed;
            }
        }
    }
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

/// Why a connection left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client or the transport closed the socket
    TransportClosed,
    /// A broadcast send failed or timed out
    SendFailed,
    /// The registry accepted the client but the handshake never completed
    UpgradeFailed,
    /// The registry was cleared (shutdown)
    Cleared,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CloseReason::TransportClosed => "transport closed",
            CloseReason::SendFailed => "send failed",
            CloseReason::UpgradeFailed => "upgrade failed",
            CloseReason::Cleared => "registry cleared",
        };
        f.write_str(text)
    }
}

/// Event driving a [`ConnectionState`] transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The WebSocket handshake completed
    Upgraded,
    /// The connection is gone
    Closed(CloseReason),
}

/// Lifecycle of one real-time connection.
///
/// ```text
/// Connecting --Upgraded--> Upgraded --Closed(reason)--> Closed(reason)
///      \------------------Closed(reason)-------------------/
/// ```
///
/// `Closed` is terminal. Eviction after a failed broadcast send is the
/// `Closed(SendFailed)` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Upgraded,
    Closed(CloseReason),
}

impl ConnectionState {
    /// Apply an event, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::InvalidTransition` for events not allowed in
    /// the current state (upgrading twice, anything after `Closed`).
    pub fn on(self, event: ConnectionEvent) -> Result<ConnectionState, ConnectionError> {
        match (self, event) {
            (ConnectionState::Connecting, ConnectionEvent::Upgraded) => {
                Ok(ConnectionState::Upgraded)
            }
            (
                ConnectionState::Connecting | ConnectionState::Upgraded,
                ConnectionEvent::Closed(reason),
            ) => Ok(ConnectionState::Closed(reason)),
            (state, event) => Err(ConnectionError::InvalidTransition {
                state: format!("{state:?}"),
                event: format!("{event:?}"),
            }),
        }
    }

    /// Whether the connection is registered and receiving broadcasts
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionState::Upgraded)
    }
}

/// On/off state of every relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelayState {
    pub nav: bool,
    pub all: bool,
    pub spot: bool,
}

impl RelayState {
    /// Current value of one relay
    pub fn get(&self, relay: RelayName) -> bool {
        match relay {
            RelayName::Nav => self.nav,
            RelayName::All => self.all,
            RelayName::Spot => self.spot,
        }
    }

    /// Set one relay
    pub fn set(&mut self, relay: RelayName, on: bool) {
        match relay {
            RelayName::Nav => self.nav = on,
            RelayName::All => self.all = on,
            RelayName::Spot => self.spot = on,
        }
    }

    /// Return the state after applying every setting of `command`
    pub fn applied(mut self, command: &RelayCommand) -> Self {
        for (relay, on) in command.settings() {
            self.set(*relay, *on);
        }
        self
    }
}

/// Validated relay directive.
///
/// Parsed from a JSON object mapping relay names to booleans, for example
/// `{"spot":true,"nav":false}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCommand {
    settings: Vec<(RelayName, bool)>,
}

impl RelayCommand {
    /// Create a command from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Empty` when no relay is named.
    pub fn new(settings: Vec<(RelayName, bool)>) -> Result<Self, CommandError> {
        if settings.is_empty() {
            return Err(CommandError::Empty);
        }
        Ok(Self { settings })
    }

    /// Parse and validate a command body.
    ///
    /// # Errors
    ///
    /// * `CommandError::Malformed` - body is not a JSON object
    /// * `CommandError::Empty` - object has no entries
    /// * `CommandError::UnknownRelay` - unknown relay name
    /// * `CommandError::NotBoolean` - a value is not `true`/`false`
    pub fn parse(body: &[u8]) -> Result<Self, CommandError> {
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(body).map_err(|e| CommandError::Malformed(e.to_string()))?;

        let settings = object
            .into_iter()
            .map(|(name, value)| -> Result<(RelayName, bool), CommandError> {
                let relay = name.parse::<RelayName>()?;
                let on = value
                    .as_bool()
                    .ok_or(CommandError::NotBoolean { relay: name })?;
                Ok((relay, on))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(settings)
    }

    /// Relay settings of the command
    pub fn settings(&self) -> &[(RelayName, bool)] {
        &self.settings
    }
}

/// Firmware image received from a privileged upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage(Vec<u8>);

impl FirmwareImage {
    /// # Errors
    ///
    /// Returns `FirmwareError::EmptyImage` for a zero-length image.
    pub fn new(bytes: Vec<u8>) -> Result<Self, FirmwareError> {
        if bytes.is_empty() {
            return Err(FirmwareError::EmptyImage);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of staging a firmware image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFirmware {
    /// Number of bytes written
    pub bytes: usize,
    /// When the image was staged
    pub staged_at: Timestamp,
}
