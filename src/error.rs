//! Error types for kvbridge
//!
//! Provides a unified error type for framing, routing and client operations.

use thiserror::Error;

use crate::protocol::RequestErrorKind;

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type for kvbridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    /// Not enough bytes buffered to decode a whole frame. Read more and retry
    /// from the same offset.
    #[error("Partial frame: {available} bytes buffered, at least {required} needed")]
    PartialFrame { available: usize, required: usize },

    /// The stream cannot be a valid sequence of frames. The connection must
    /// be torn down.
    #[error("Corrupt frame: {0}")]
    CorruptFrame(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Routing Errors
    // -------------------------------------------------------------------------
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Connection closed: {0}")]
    Closing(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Request failed ({kind:?}): {message}")]
    Request {
        kind: RequestErrorKind,
        message: String,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// True for the "read more bytes and retry" signal.
    pub fn is_partial_frame(&self) -> bool {
        matches!(self, BridgeError::PartialFrame { .. })
    }

    /// True when the connection that produced this error can no longer be
    /// used.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::Io(_)
                | BridgeError::CorruptFrame(_)
                | BridgeError::Serialization(_)
                | BridgeError::Closing(_)
        )
    }
}
