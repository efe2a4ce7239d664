//! Network-origin classification and the privileged-operation policy.

use std::net::{IpAddr, SocketAddr};

use super::value_object::{DEFAULT_AP_SUBNET, Ipv4Cidr};

/// Where a request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Peer is on the controller's own access point
    Local,
    /// Any other peer, including peers whose address is unknown
    Other,
}

impl Origin {
    pub fn is_local(&self) -> bool {
        matches!(self, Origin::Local)
    }
}

/// Classifies peers against the access-point subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGuard {
    subnet: Ipv4Cidr,
}

impl AccessGuard {
    pub fn new(subnet: Ipv4Cidr) -> Self {
        Self { subnet }
    }

    pub fn subnet(&self) -> Ipv4Cidr {
        self.subnet
    }

    /// Classify a peer address.
    ///
    /// IPv4-mapped IPv6 peers are compared by their IPv4 address. A missing
    /// peer address classifies as `Other`.
    pub fn classify(&self, peer: Option<SocketAddr>) -> Origin {
        let address = match peer.map(|peer| peer.ip()) {
            Some(IpAddr::V4(v4)) => v4,
            Some(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
                Some(v4) => v4,
                None => return Origin::Other,
            },
            None => return Origin::Other,
        };

        if self.subnet.contains(address) {
            Origin::Local
        } else {
            Origin::Other
        }
    }
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new(DEFAULT_AP_SUBNET)
    }
}

/// Operations that may be restricted to `Local` peers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectedOperation {
    /// Firmware upload, always privileged
    FirmwareUpload,
    /// Relay actuation, privileged when the policy says so
    RelayControl,
}

/// Peer was refused access to a privileged operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation:?} is only allowed from the access-point network")]
pub struct AccessDenied {
    pub operation: ProtectedOperation,
}

/// Which operations require a `Local` origin.
///
/// Firmware upload is always guarded. Relay control is guarded only when the
/// policy is built with `guard_relays = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    guard: AccessGuard,
    guard_relays: bool,
}

impl AccessPolicy {
    pub fn new(guard: AccessGuard, guard_relays: bool) -> Self {
        Self {
            guard,
            guard_relays,
        }
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Whether `operation` requires a `Local` origin under this policy
    pub fn is_privileged(&self, operation: ProtectedOperation) -> bool {
        match operation {
            ProtectedOperation::FirmwareUpload => true,
            ProtectedOperation::RelayControl => self.guard_relays,
        }
    }

    /// Check whether `peer` may perform `operation`.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` when the operation is privileged and the peer
    /// classifies as `Other`.
    pub fn authorize(
        &self,
        operation: ProtectedOperation,
        peer: Option<SocketAddr>,
    ) -> Result<Origin, AccessDenied> {
        let origin = self.guard.classify(peer);
        if self.is_privileged(operation) && !origin.is_local() {
            return Err(AccessDenied { operation });
        }
        Ok(origin)
    }
}
