//! Protocol Module
//!
//! Defines the framed wire protocol spoken with the core engine.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ Len (varint) │     Body (Len bytes)        │
//! └──────────────┴─────────────────────────────┘
//! ```
//!
//! ### Bodies
//! - Requests: `CommandRequest` (callback index, command or batch, route)
//! - Responses: `Response` (callback index, value or error, push flag)
//!
//! Both are bincode-encoded serde structures. The framing layer is agnostic
//! to the body and works with any `WireMessage`.

mod buffer;
mod codec;
mod command;
mod response;
pub mod varint;

pub use buffer::{ReceiveBuffer, DEFAULT_BUFFER_SIZE};
pub use codec::{decode, decode_frame, encode, encode_into, read_frame, write_frame, WireMessage};
pub use command::{Batch, Command, CommandRequest, RequestBody, RequestType};
pub use response::{RequestError, RequestErrorKind, Response, ResponseValue, Value};
