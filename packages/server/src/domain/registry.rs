//! Fixed-capacity registry of live real-time connections.

use super::{entity::ConnectionHandle, error::RegistryError, value_object::SocketId};

/// Default maximum number of simultaneous real-time connections
pub const DEFAULT_CLIENT_CAPACITY: usize = 8;

/// Ordered set of live connection handles.
///
/// Handles live in numbered slots; a freed slot is reused by the next `add`.
/// The registry never holds two handles with the same socket id and never
/// holds more than `capacity` handles.
#[derive(Debug)]
pub struct ClientRegistry {
    slots: Vec<Option<ConnectionHandle>>,
    len: usize,
}

impl ClientRegistry {
    /// Create an empty registry with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CLIENT_CAPACITY)
    }

    /// Create an empty registry holding at most `capacity` handles
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            len: 0,
        }
    }

    /// Maximum number of handles
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of registered handles
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }

    /// Whether a handle with this socket id is registered
    pub fn contains(&self, id: SocketId) -> bool {
        self.iter().any(|handle| handle.id == id)
    }

    /// Register a handle in the first free slot.
    ///
    /// Adding a handle whose socket id is already registered is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::CapacityExceeded` if every slot is taken.
    /// The registry is left unchanged.
    pub fn add(&mut self, handle: ConnectionHandle) -> Result<(), RegistryError> {
        if self.contains(handle.id) {
            return Ok(());
        }
        let capacity = self.capacity();
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) else {
            return Err(RegistryError::CapacityExceeded {
                capacity,
                current: self.len,
            });
        };
        *slot = Some(handle);
        self.len += 1;
        Ok(())
    }

    /// Remove the handle with this socket id, returning it if it was present
    pub fn remove(&mut self, id: SocketId) -> Option<ConnectionHandle> {
        let handle = self
            .slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|handle| handle.id == id))?
            .take()?;
        self.len -= 1;
        Some(handle)
    }

    /// Point-in-time copy of every registered handle, in slot order
    pub fn snapshot(&self) -> Vec<ConnectionHandle> {
        self.iter().cloned().collect()
    }

    /// Remove every handle, returning them in slot order
    pub fn clear(&mut self) -> Vec<ConnectionHandle> {
        self.len = 0;
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    fn iter(&self) -> impl Iterator<Item = &ConnectionHandle> {
        self.slots.iter().flatten()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
