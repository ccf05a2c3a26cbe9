//! # kvbridge
//!
//! Client-side binding for a key-value core engine with:
//! - Varint length-delimited framing over any byte stream
//! - Typed cluster routing descriptors validated at construction
//! - Incremental decoding that survives arbitrary read boundaries
//! - A multiplexed client matching responses by callback index
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Caller (Command + Route)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Client                                 │
//! │         (callback registry, write lock, reader)             │
//! └──────────┬──────────────────────────────────▲───────────────┘
//!            │                                  │
//!            ▼                                  │
//!   ┌─────────────────┐                ┌────────┴────────┐
//!   │ Route Resolver  │                │  ReceiveBuffer  │
//!   │   (to_wire)     │                │ (partial frames)│
//!   └────────┬────────┘                └────────▲────────┘
//!            │                                  │
//!            ▼                                  │
//!   ┌─────────────────────────────────────────────────────┐
//!   │             Frame Codec (varint + body)             │
//!   └─────────────────────────┬───────────────────────────┘
//!                             │
//!                             ▼
//!                   Core engine (socket)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod routing;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BridgeError, Result};
pub use config::ClientConfig;
pub use network::Client;
pub use routing::Route;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvbridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
