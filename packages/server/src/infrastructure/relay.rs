//! In-memory relay bank.
//!
//! Stands in for the GPIO relay driver on hosts without actuator hardware.
//! State changes are logged so that a bench run shows every switch.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RelayCommand, RelayController, RelayError, RelayState};

/// Relay controller keeping the relay state in memory
#[derive(Debug, Default)]
pub struct InMemoryRelayBank {
    state: Mutex<RelayState>,
}

impl InMemoryRelayBank {
    pub fn new(initial: RelayState) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }
}

#[async_trait]
impl RelayController for InMemoryRelayBank {
    async fn apply(&self, command: &RelayCommand) -> Result<RelayState, RelayError> {
        let mut state = self.state.lock().await;
        let next = state.applied(command);
        for (relay, on) in command.settings() {
            if state.get(*relay) != *on {
                tracing::info!("Relay '{}' switched {}", relay, if *on { "on" } else { "off" });
            }
        }
        *state = next;
        Ok(next)
    }

    async fn state(&self) -> RelayState {
        *self.state.lock().await
    }
}
