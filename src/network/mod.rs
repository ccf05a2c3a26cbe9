//! Network Module
//!
//! Client side of the connection to the core engine.
//!
//! ## Architecture
//! - Callers write framed requests under a write lock
//! - One reader thread per connection decodes responses
//! - Responses matched to requests by callback index

mod client;
mod registry;

pub use client::{Client, Transport};
pub use registry::{CallbackRegistry, ResponseReceiver};
