//! Command definitions
//!
//! Requests sent from the binding to the core engine.

use serde::{Deserialize, Serialize};

use super::codec::{self, WireMessage};
use crate::error::Result;
use crate::routing::{self, Route, WireRoute};

/// Request types understood by the engine
///
/// `CustomCommand` carries the command name as its first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum RequestType {
    CustomCommand = 1,
    Get = 2,
    Set = 3,
    Del = 4,
    Ping = 5,
    Info = 6,
    Exists = 7,
    Expire = 8,
    Incr = 9,
    MGet = 10,
    MSet = 11,
}

/// A single command: request type plus raw arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub request_type: RequestType,
    pub args: Vec<Vec<u8>>,
}

impl Command {
    /// Create a command with no arguments
    pub fn new(request_type: RequestType) -> Self {
        Self {
            request_type,
            args: Vec::new(),
        }
    }

    /// Create a custom command from its full argument list (name first)
    pub fn custom<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        Self {
            request_type: RequestType::CustomCommand,
            args: args.into_iter().map(|a| a.as_ref().to_vec()).collect(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.args.push(arg.as_ref().to_vec());
        self
    }
}

/// Several commands sent in one request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Batch {
    /// Execute as a transaction (MULTI/EXEC)
    pub is_atomic: bool,

    /// Fail the whole batch on the first command error instead of returning
    /// errors inline
    pub raise_on_error: bool,

    pub commands: Vec<Command>,
}

impl Batch {
    /// Create an empty batch
    pub fn new(is_atomic: bool) -> Self {
        Self {
            is_atomic,
            raise_on_error: true,
            commands: Vec::new(),
        }
    }

    /// Append a command
    pub fn add(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// What a request asks the engine to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestBody {
    Single(Command),
    Batch(Batch),
}

/// Envelope for every request written to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Correlates the engine's response with this request
    pub callback_idx: u32,

    pub body: RequestBody,

    /// `None` lets the engine pick its default routing
    pub route: Option<WireRoute>,
}

impl CommandRequest {
    /// Build a request, translating the routing intent to its wire form
    pub fn new(callback_idx: u32, body: RequestBody, route: Option<&Route>) -> Self {
        Self {
            callback_idx,
            body,
            route: routing::to_wire(route),
        }
    }
}

impl WireMessage for CommandRequest {
    fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        codec::serialize_body(self)
    }

    fn from_wire_bytes(bytes: &[u8]) -> Result<Self> {
        codec::deserialize_body(bytes)
    }
}
