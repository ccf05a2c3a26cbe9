//! Response definitions
//!
//! Messages sent from the core engine back to the binding.

use serde::{Deserialize, Serialize};

use super::codec::{self, WireMessage};
use crate::error::{BridgeError, Result};

/// A value returned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Okay,
    Int(i64),
    Boolean(bool),
    Simple(String),
    Bulk(Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Create a bulk value from bytes
    pub fn bulk(bytes: impl AsRef<[u8]>) -> Self {
        Value::Bulk(bytes.as_ref().to_vec())
    }
}

/// Classification of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RequestErrorKind {
    Unspecified = 0,
    ExecAbort = 1,
    Timeout = 2,
    Disconnect = 3,
}

/// Error reported by the engine for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestError {
    pub kind: RequestErrorKind,
    pub message: String,
}

/// Outcome carried by a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseValue {
    Value(Value),
    RequestError(RequestError),
    /// The engine is closing the connection
    ClosingError(String),
}

/// Envelope for every message read from the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Index of the request this answers (unused for push messages)
    pub callback_idx: u32,

    pub value: ResponseValue,

    /// Server-initiated message not tied to a request
    pub is_push: bool,
}

impl Response {
    /// Create a successful response
    pub fn value(callback_idx: u32, value: Value) -> Self {
        Self {
            callback_idx,
            value: ResponseValue::Value(value),
            is_push: false,
        }
    }

    /// Create a request error response
    pub fn request_error(callback_idx: u32, kind: RequestErrorKind, message: &str) -> Self {
        Self {
            callback_idx,
            value: ResponseValue::RequestError(RequestError {
                kind,
                message: message.to_string(),
            }),
            is_push: false,
        }
    }

    /// Create a closing error response
    pub fn closing_error(message: &str) -> Self {
        Self {
            callback_idx: 0,
            value: ResponseValue::ClosingError(message.to_string()),
            is_push: false,
        }
    }

    /// Create a push message
    pub fn push(value: Value) -> Self {
        Self {
            callback_idx: 0,
            value: ResponseValue::Value(value),
            is_push: true,
        }
    }

    /// Convert into the value, or the error the engine reported
    pub fn into_result(self) -> Result<Value> {
        match self.value {
            ResponseValue::Value(value) => Ok(value),
            ResponseValue::RequestError(err) => Err(BridgeError::Request {
                kind: err.kind,
                message: err.message,
            }),
            ResponseValue::ClosingError(message) => Err(BridgeError::Closing(message)),
        }
    }
}

impl WireMessage for Response {
    fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        codec::serialize_body(self)
    }

    fn from_wire_bytes(bytes: &[u8]) -> Result<Self> {
        codec::deserialize_body(bytes)
    }
}
