//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::{fmt, net::Ipv4Addr, str::FromStr, sync::Arc};

use super::error::ValueObjectError;

/// Transport-level socket identifier of a real-time connection.
///
/// Unique while the connection is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SocketId(u64);

impl SocketId {
    /// Create a new SocketId.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the inner u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subnet served by the controller's own access point (`192.168.4.0/24`)
pub const DEFAULT_AP_SUBNET: Ipv4Cidr = Ipv4Cidr {
    network: Ipv4Addr::new(192, 168, 4, 0),
    prefix_len: 24,
};

/// IPv4 CIDR block value object.
///
/// The network address is stored with its host bits cleared, so
/// `192.168.4.17/24` and `192.168.4.0/24` are the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// Longest valid IPv4 prefix
    pub const MAX_PREFIX_LEN: u8 = 32;

    /// Create a new Ipv4Cidr.
    ///
    /// # Arguments
    ///
    /// * `address` - Any address inside the block
    /// * `prefix_len` - Number of leading network bits (0..=32)
    ///
    /// # Returns
    ///
    /// A Result containing the Ipv4Cidr or an error if the prefix is too long
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self, ValueObjectError> {
        if prefix_len > Self::MAX_PREFIX_LEN {
            return Err(ValueObjectError::CidrPrefixTooLong {
                max: Self::MAX_PREFIX_LEN,
                actual: prefix_len,
            });
        }
        let network = Ipv4Addr::from(u32::from(address) & Self::mask(prefix_len));
        Ok(Self {
            network,
            prefix_len,
        })
    }

    fn mask(prefix_len: u8) -> u32 {
        match prefix_len {
            0 => 0,
            len => u32::MAX << (32 - u32::from(len)),
        }
    }

    /// Network address of the block.
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length of the block.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Whether `address` lies inside the block.
    pub fn contains(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & Self::mask(self.prefix_len) == u32::from(self.network)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueObjectError::CidrInvalidFormat(s.to_string());
        let (address, prefix_len) = s.trim().split_once('/').ok_or_else(invalid)?;
        let address = address.parse::<Ipv4Addr>().map_err(|_| invalid())?;
        let prefix_len = prefix_len.parse::<u8>().map_err(|_| invalid())?;
        Self::new(address, prefix_len)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

/// Immutable payload pushed to every live real-time connection.
///
/// Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPayload(Arc<[u8]>);

impl BroadcastPayload {
    /// Create a payload from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    /// Serialize a value as a JSON payload.
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(value).map(Self::new)
    }

    /// Raw bytes of the payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload as text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for BroadcastPayload {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for BroadcastPayload {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

/// Name of a switchable relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayName {
    /// Navigation lights
    Nav,
    /// All-round (anchor) light
    All,
    /// Spotlight
    Spot,
}

impl RelayName {
    /// Every relay, in wire order.
    pub const ALL: [RelayName; 3] = [RelayName::Nav, RelayName::All, RelayName::Spot];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelayName::Nav => "nav",
            RelayName::All => "all",
            RelayName::Spot => "spot",
        }
    }
}

impl FromStr for RelayName {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelayName::ALL
            .into_iter()
            .find(|relay| relay.as_str() == s)
            .ok_or_else(|| ValueObjectError::RelayNameUnknown(s.to_string()))
    }
}

impl fmt::Display for RelayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_parse_success() {
        // テスト項目: 有効な CIDR 文字列をパースできる
        // when (操作):
        let result = "192.168.4.0/24".parse::<Ipv4Cidr>();

        // then (期待する結果):
        let cidr = result.unwrap();
        assert_eq!(cidr.network(), Ipv4Addr::new(192, 168, 4, 0));
        assert_eq!(cidr.prefix_len(), 24);
        assert_eq!(cidr.to_string(), "192.168.4.0/24");
    }

    #[test]
    fn test_default_ap_subnet() {
        // テスト項目: デフォルトの AP サブネットは 192.168.4.0/24
        // then (期待する結果):
        assert_eq!(DEFAULT_AP_SUBNET, "192.168.4.0/24".parse::<Ipv4Cidr>().unwrap());
    }

    #[test]
    fn test_cidr_clears_host_bits() {
        // テスト項目: ホスト部を含むアドレスはネットワークアドレスに正規化される
        // when (操作):
        let cidr = "192.168.4.17/24".parse::<Ipv4Cidr>().unwrap();

        // then (期待する結果):
        assert_eq!(cidr.network(), Ipv4Addr::new(192, 168, 4, 0));
        assert_eq!(cidr, "192.168.4.0/24".parse::<Ipv4Cidr>().unwrap());
    }

    #[test]
    fn test_cidr_parse_invalid_format_fails() {
        // テスト項目: 不正な形式の CIDR はパースできない
        // given (前提条件):
        let inputs = ["", "192.168.4.0", "192.168.4/24", "192.168.4.0/abc", "/24"];

        for input in inputs {
            // when (操作):
            let result = input.parse::<Ipv4Cidr>();

            // then (期待する結果):
            assert_eq!(
                result,
                Err(ValueObjectError::CidrInvalidFormat(input.to_string()))
            );
        }
    }

    #[test]
    fn test_cidr_prefix_too_long_fails() {
        // テスト項目: 32 を超えるプレフィックス長は拒否される
        // when (操作):
        let result = "10.0.0.0/33".parse::<Ipv4Cidr>();

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::CidrPrefixTooLong {
                max: 32,
                actual: 33
            })
        );
    }

    #[test]
    fn test_cidr_contains() {
        // テスト項目: ブロック内外のアドレスを正しく判定できる
        // given (前提条件):
        let cidr = "192.168.4.0/24".parse::<Ipv4Cidr>().unwrap();

        // then (期待する結果):
        assert!(cidr.contains(Ipv4Addr::new(192, 168, 4, 1)));
        assert!(cidr.contains(Ipv4Addr::new(192, 168, 4, 255)));
        assert!(!cidr.contains(Ipv4Addr::new(192, 168, 5, 1)));
        assert!(!cidr.contains(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_cidr_edge_prefixes() {
        // テスト項目: /0 は全アドレス、/32 は単一アドレスにマッチする
        // given (前提条件):
        let everything = "0.0.0.0/0".parse::<Ipv4Cidr>().unwrap();
        let single = "192.168.4.1/32".parse::<Ipv4Cidr>().unwrap();

        // then (期待する結果):
        assert!(everything.contains(Ipv4Addr::new(8, 8, 8, 8)));
        assert!(single.contains(Ipv4Addr::new(192, 168, 4, 1)));
        assert!(!single.contains(Ipv4Addr::new(192, 168, 4, 2)));
    }

    #[test]
    fn test_broadcast_payload_preserves_bytes() {
        // テスト項目: ペイロードはバイト列を変更せず保持する
        // when (操作):
        let payload = BroadcastPayload::from("{\"spot\":true}");

        // then (期待する結果):
        assert_eq!(payload.as_bytes(), b"{\"spot\":true}");
        assert_eq!(payload.len(), 13);
        assert_eq!(payload.as_text(), Some("{\"spot\":true}"));
    }

    #[test]
    fn test_broadcast_payload_non_utf8_has_no_text() {
        // テスト項目: UTF-8 でないペイロードはテキストとして取得できない
        // when (操作):
        let payload = BroadcastPayload::new(vec![0xff, 0xfe]);

        // then (期待する結果):
        assert_eq!(payload.as_text(), None);
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_relay_name_parse() {
        // テスト項目: リレー名をパースでき、未知の名前は拒否される
        // then (期待する結果):
        assert_eq!("spot".parse::<RelayName>(), Ok(RelayName::Spot));
        assert_eq!("nav".parse::<RelayName>(), Ok(RelayName::Nav));
        assert_eq!(
            "horn".parse::<RelayName>(),
            Err(ValueObjectError::RelayNameUnknown("horn".to_string()))
        );
    }
}
