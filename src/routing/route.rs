//! Route definitions
//!
//! Routing intents a caller can attach to a cluster command. Every route is
//! validated when it is built, so a value of these types is always sendable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::slot::{slot_for_key, MAX_SLOT_ID};
use crate::error::{BridgeError, Result};

/// Which node of the owning shard serves a slot route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SlotType {
    Primary = 1,
    Replica = 2,
}

impl From<SlotType> for u8 {
    fn from(slot_type: SlotType) -> u8 {
        slot_type as u8
    }
}

impl TryFrom<u8> for SlotType {
    type Error = BridgeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(SlotType::Primary),
            2 => Ok(SlotType::Replica),
            _ => Err(BridgeError::InvalidRoute(format!(
                "slot_type: unknown value {}",
                value
            ))),
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::Primary => write!(f, "primary"),
            SlotType::Replica => write!(f, "replica"),
        }
    }
}

// =============================================================================
// Slot Routes
// =============================================================================

/// Route to the shard owning the slot `slot_key` hashes to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKeyRoute {
    slot_type: SlotType,
    slot_key: String,
}

impl SlotKeyRoute {
    pub fn new(slot_type: SlotType, slot_key: impl Into<String>) -> Self {
        Self {
            slot_type,
            slot_key: slot_key.into(),
        }
    }

    pub fn slot_type(&self) -> SlotType {
        self.slot_type
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// The slot the engine will resolve this key to
    pub fn slot(&self) -> u16 {
        slot_for_key(self.slot_key.as_bytes())
    }
}

/// Route to the shard owning a slot number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotIdRoute {
    slot_type: SlotType,
    slot_id: u16,
}

impl SlotIdRoute {
    /// Fails with `InvalidRoute` unless `slot_id` is in `0..=16383`
    pub fn new(slot_type: SlotType, slot_id: u16) -> Result<Self> {
        if slot_id > MAX_SLOT_ID {
            return Err(BridgeError::InvalidRoute(format!(
                "slot_id: {} is outside 0..={}",
                slot_id, MAX_SLOT_ID
            )));
        }
        Ok(Self { slot_type, slot_id })
    }

    pub fn slot_type(&self) -> SlotType {
        self.slot_type
    }

    pub fn slot_id(&self) -> u16 {
        self.slot_id
    }
}

// =============================================================================
// Address Route
// =============================================================================

/// Route to one node by address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByAddressRoute {
    host: String,
    port: u16,
}

impl ByAddressRoute {
    /// Build from an explicit host and port
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(BridgeError::InvalidRoute("host: must not be empty".to_string()));
        }
        Ok(Self { host, port })
    }

    /// Build from a single `host:port` string
    ///
    /// The string must contain exactly one `:`. IPv6 literals are therefore
    /// only accepted through [`ByAddressRoute::new`].
    pub fn parse(address: &str) -> Result<Self> {
        let mut parts = address.split(':');
        let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BridgeError::InvalidRoute(format!(
                "host: `{}` must be `host:port` with exactly one ':' (or pass the port explicitly)",
                address
            )));
        };

        let invalid_port =
            || BridgeError::InvalidRoute(format!("port: `{}` is not a valid port number", port));
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_port());
        }
        let port = port.parse::<u16>().map_err(|_| invalid_port())?;

        Self::new(host, port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for ByAddressRoute {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ByAddressRoute {
    type Error = BridgeError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

// =============================================================================
// Route
// =============================================================================

/// Which cluster node(s) a command should be sent to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Every node. Not safe for writes that must stay consistent.
    AllNodes,

    /// Every primary node
    AllPrimaries,

    /// One arbitrarily chosen node
    RandomNode,

    /// The shard owning the slot a key hashes to
    SlotKey(SlotKeyRoute),

    /// The shard owning a slot number
    SlotId(SlotIdRoute),

    /// One exact node address
    ByAddress(ByAddressRoute),
}

impl Route {
    /// Shorthand for a slot key route
    pub fn slot_key(slot_type: SlotType, slot_key: impl Into<String>) -> Self {
        Route::SlotKey(SlotKeyRoute::new(slot_type, slot_key))
    }

    /// Shorthand for a slot id route
    pub fn slot_id(slot_type: SlotType, slot_id: u16) -> Result<Self> {
        Ok(Route::SlotId(SlotIdRoute::new(slot_type, slot_id)?))
    }

    /// Shorthand for an address route from `host:port`
    pub fn by_address(address: &str) -> Result<Self> {
        Ok(Route::ByAddress(ByAddressRoute::parse(address)?))
    }

    /// True when the command fans out to several nodes
    pub fn is_multi_node(&self) -> bool {
        matches!(self, Route::AllNodes | Route::AllPrimaries)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::AllNodes => write!(f, "all-nodes"),
            Route::AllPrimaries => write!(f, "all-primaries"),
            Route::RandomNode => write!(f, "random"),
            Route::SlotKey(r) => write!(f, "key:{}@{}", r.slot_key, r.slot_type),
            Route::SlotId(r) => write!(f, "slot:{}@{}", r.slot_id, r.slot_type),
            Route::ByAddress(r) => write!(f, "addr:{}:{}", r.host, r.port),
        }
    }
}

impl From<SlotKeyRoute> for Route {
    fn from(route: SlotKeyRoute) -> Self {
        Route::SlotKey(route)
    }
}

impl From<SlotIdRoute> for Route {
    fn from(route: SlotIdRoute) -> Self {
        Route::SlotId(route)
    }
}

impl From<ByAddressRoute> for Route {
    fn from(route: ByAddressRoute) -> Self {
        Route::ByAddress(route)
    }
}
