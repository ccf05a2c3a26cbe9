//! Routing Module
//!
//! Cluster routing descriptors and their wire representation.
//!
//! ## Route Variants
//! - `AllNodes`, `AllPrimaries`, `RandomNode`: wire `Simple` enumerator
//! - `SlotKey`: slot type + key, hashed by the engine
//! - `SlotId`: slot type + slot number (0..=16383)
//! - `ByAddress`: host + port
//!
//! ### Slot Types on the Wire
//! - 1: PRIMARY
//! - 2: REPLICA

mod route;
mod slot;
mod wire;

pub use route::{ByAddressRoute, Route, SlotIdRoute, SlotKeyRoute, SlotType};
pub use slot::{crc16, slot_for_key, MAX_SLOT_ID, SLOT_COUNT};
pub use wire::{to_wire, SimpleRoute, WireRoute};
