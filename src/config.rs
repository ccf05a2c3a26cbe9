//! Configuration for kvbridge clients
//!
//! Centralized configuration with sensible defaults.

use crate::error::{BridgeError, Result};
use crate::protocol::DEFAULT_BUFFER_SIZE;

/// Default time to wait for a response (milliseconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 250;

/// Default number of unread push messages kept before new ones are dropped
pub const DEFAULT_PUSH_QUEUE_CAPACITY: usize = 1024;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Read Path Configuration
    // -------------------------------------------------------------------------
    /// Bytes requested from the transport per read
    pub read_buffer_size: usize,

    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Time to wait for a response (milliseconds, 0 = wait forever)
    pub request_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Push Configuration
    // -------------------------------------------------------------------------
    /// Unread push messages kept; further pushes are dropped until the
    /// queue is drained
    pub push_queue_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            write_timeout_ms: 0,
            push_queue_capacity: DEFAULT_PUSH_QUEUE_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(BridgeError::Config(
                "read_buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.push_queue_capacity == 0 {
            return Err(BridgeError::Config(
                "push_queue_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the per-read chunk size (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set the request timeout (in milliseconds, 0 disables it)
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds, 0 disables it)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set how many unread push messages are kept
    pub fn push_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.push_queue_capacity = capacity;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
