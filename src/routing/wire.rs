//! Wire routing records
//!
//! The routing structure embedded in `CommandRequest`. `to_wire` is the
//! outgoing direction and never fails: every `Route` is valid by
//! construction. The reverse conversion treats the record as untrusted input.

use serde::{Deserialize, Serialize};

use super::route::{ByAddressRoute, Route, SlotIdRoute, SlotKeyRoute, SlotType};
use crate::error::{BridgeError, Result};

/// Routes that carry no parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SimpleRoute {
    AllNodes = 0,
    AllPrimaries = 1,
    Random = 2,
}

impl From<SimpleRoute> for u8 {
    fn from(route: SimpleRoute) -> u8 {
        route as u8
    }
}

impl TryFrom<u8> for SimpleRoute {
    type Error = BridgeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SimpleRoute::AllNodes),
            1 => Ok(SimpleRoute::AllPrimaries),
            2 => Ok(SimpleRoute::Random),
            _ => Err(BridgeError::InvalidRoute(format!(
                "simple_route: unknown value {}",
                value
            ))),
        }
    }
}

/// Routing record as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireRoute {
    Simple(SimpleRoute),
    SlotKey { slot_type: SlotType, slot_key: String },
    SlotId { slot_type: SlotType, slot_id: i32 },
    ByAddress { host: String, port: i32 },
}

/// Translate an optional routing intent into its wire record
///
/// `None` means no explicit routing; the engine applies its default policy.
pub fn to_wire(route: Option<&Route>) -> Option<WireRoute> {
    route.map(WireRoute::from)
}

impl From<&Route> for WireRoute {
    fn from(route: &Route) -> Self {
        match route {
            Route::AllNodes => WireRoute::Simple(SimpleRoute::AllNodes),
            Route::AllPrimaries => WireRoute::Simple(SimpleRoute::AllPrimaries),
            Route::RandomNode => WireRoute::Simple(SimpleRoute::Random),
            Route::SlotKey(r) => WireRoute::SlotKey {
                slot_type: r.slot_type(),
                slot_key: r.slot_key().to_string(),
            },
            Route::SlotId(r) => WireRoute::SlotId {
                slot_type: r.slot_type(),
                slot_id: i32::from(r.slot_id()),
            },
            Route::ByAddress(r) => WireRoute::ByAddress {
                host: r.host().to_string(),
                port: i32::from(r.port()),
            },
        }
    }
}

impl TryFrom<WireRoute> for Route {
    type Error = BridgeError;

    fn try_from(wire: WireRoute) -> Result<Self> {
        match wire {
            WireRoute::Simple(SimpleRoute::AllNodes) => Ok(Route::AllNodes),
            WireRoute::Simple(SimpleRoute::AllPrimaries) => Ok(Route::AllPrimaries),
            WireRoute::Simple(SimpleRoute::Random) => Ok(Route::RandomNode),
            WireRoute::SlotKey { slot_type, slot_key } => {
                Ok(Route::SlotKey(SlotKeyRoute::new(slot_type, slot_key)))
            }
            WireRoute::SlotId { slot_type, slot_id } => {
                let slot_id = u16::try_from(slot_id).map_err(|_| {
                    BridgeError::InvalidRoute(format!("slot_id: {} is out of range", slot_id))
                })?;
                Ok(Route::SlotId(SlotIdRoute::new(slot_type, slot_id)?))
            }
            WireRoute::ByAddress { host, port } => {
                let port = u16::try_from(port).map_err(|_| {
                    BridgeError::InvalidRoute(format!("port: {} is out of range", port))
                })?;
                Ok(Route::ByAddress(ByAddressRoute::new(host, port)?))
            }
        }
    }
}
