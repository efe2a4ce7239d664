//! Domain factories for creating domain entities and value objects.

use std::sync::atomic::{AtomicU64, Ordering};

use super::SocketId;

/// Factory for generating SocketId instances.
///
/// Ids are handed out in increasing order starting at 1 and are never
/// reused for the lifetime of the factory, so an id stays unique while its
/// connection is open.
#[derive(Debug)]
pub struct SocketIdFactory {
    next: AtomicU64,
}

impl SocketIdFactory {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Generate the next SocketId.
    pub fn generate(&self) -> SocketId {
        SocketId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SocketIdFactory {
    fn default() -> Self {
        Self::new()
    }
}
