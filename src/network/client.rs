//! Engine Client
//!
//! Multiplexed request/response dispatcher over a framed byte stream.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::BytesMut;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;

use super::registry::CallbackRegistry;
use crate::config::ClientConfig;
use crate::error::{BridgeError, Result};
use crate::protocol::{
    encode_into, Batch, Command, CommandRequest, ReceiveBuffer, RequestBody, Response,
    ResponseValue, Value,
};
use crate::routing::Route;

/// Reason recorded when the engine side hangs up
const UNEXPECTED_CLOSE: &str = "The communication layer was unexpectedly closed.";

// =============================================================================
// Transport
// =============================================================================

/// A byte stream the client can split into a read half and a write half
pub trait Transport: Read + Write + Send + Sized + 'static {
    /// Another handle to the same underlying stream
    fn try_clone_stream(&self) -> io::Result<Self>;

    /// Shut down both directions, unblocking any pending read
    fn shutdown_stream(&self) -> io::Result<()>;

    fn apply_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Peer description for logging
    fn describe_peer(&self) -> String;
}

impl Transport for TcpStream {
    fn try_clone_stream(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn shutdown_stream(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }

    fn apply_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_write_timeout(timeout)
    }

    fn describe_peer(&self) -> String {
        self.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(unix)]
impl Transport for UnixStream {
    fn try_clone_stream(&self) -> io::Result<Self> {
        self.try_clone()
    }

    fn shutdown_stream(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }

    fn apply_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_write_timeout(timeout)
    }

    fn describe_peer(&self) -> String {
        self.peer_addr()
            .ok()
            .and_then(|a| a.as_pathname().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "unix:unnamed".to_string())
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for one connection to the core engine
///
/// Requests from any number of threads share the connection. Each request
/// gets a callback index; a dedicated reader thread decodes responses and
/// hands each one to the request with the matching index.
pub struct Client<S: Transport> {
    /// Write half; one frame is written at a time
    writer: Mutex<S>,

    /// Requests awaiting a response
    registry: Arc<CallbackRegistry>,

    /// Server push messages, in arrival order, bounded by
    /// `push_queue_capacity`
    push_rx: Receiver<Response>,

    /// Reader thread, taken on close
    reader: Mutex<Option<JoinHandle<()>>>,

    config: ClientConfig,

    /// Peer address for logging
    peer: String,
}

#[cfg(unix)]
impl Client<UnixStream> {
    /// Connect to an engine listening on a Unix domain socket
    pub fn connect_unix(path: impl AsRef<Path>, config: ClientConfig) -> Result<Self> {
        let stream = UnixStream::connect(path)?;
        Self::new(stream, config)
    }
}

impl Client<TcpStream> {
    /// Connect to an engine listening on TCP
    pub fn connect_tcp(addr: impl ToSocketAddrs, config: ClientConfig) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        Self::new(stream, config)
    }
}

impl<S: Transport> Client<S> {
    /// Wrap an established stream and start its reader thread
    pub fn new(stream: S, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        if config.write_timeout_ms > 0 {
            stream.apply_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let peer = stream.describe_peer();
        let read_half = stream.try_clone_stream()?;
        let registry = Arc::new(CallbackRegistry::new());
        let (push_tx, push_rx) = channel::bounded(config.push_queue_capacity);

        let reader = {
            let registry = Arc::clone(&registry);
            let peer = peer.clone();
            let chunk_size = config.read_buffer_size;
            thread::Builder::new()
                .name("kvbridge-reader".to_string())
                .spawn(move || reader_loop(read_half, registry, push_tx, chunk_size, peer))?
        };

        tracing::debug!("Connected to engine at {}", peer);

        Ok(Self {
            writer: Mutex::new(stream),
            registry,
            push_rx,
            reader: Mutex::new(Some(reader)),
            config,
            peer,
        })
    }

    /// Run one command and wait for its result
    pub fn execute(&self, command: Command, route: Option<&Route>) -> Result<Value> {
        self.submit(RequestBody::Single(command), route)
    }

    /// Run a batch and wait for its result (an array, one entry per command)
    pub fn execute_batch(&self, batch: Batch, route: Option<&Route>) -> Result<Value> {
        self.submit(RequestBody::Batch(batch), route)
    }

    /// Next queued push message, if any
    pub fn try_recv_push(&self) -> Option<Response> {
        self.push_rx.try_recv().ok()
    }

    /// Channel of push messages, for blocking or `select!` consumers
    pub fn push_messages(&self) -> &Receiver<Response> {
        &self.push_rx
    }

    /// Number of requests still waiting on the engine
    pub fn pending_requests(&self) -> usize {
        self.registry.pending_count()
    }

    /// True once the connection is unusable
    pub fn is_closed(&self) -> bool {
        self.registry.closed_reason().is_some()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer
    }

    /// Fail pending requests, shut the stream down and stop the reader
    pub fn close(&self) {
        self.registry.fail_all("client closed");

        if let Err(e) = self.writer.lock().shutdown_stream() {
            tracing::trace!("Shutdown of {} failed: {}", self.peer, e);
        }

        if let Some(handle) = self.reader.lock().take() {
            if handle.join().is_err() {
                tracing::warn!("Reader thread for {} panicked", self.peer);
            }
        }
    }

    fn submit(&self, body: RequestBody, route: Option<&Route>) -> Result<Value> {
        let (callback_idx, rx) = self.registry.register()?;
        let request = CommandRequest::new(callback_idx, body, route);

        tracing::trace!(
            callback_idx,
            route = %route.map(|r| r.to_string()).unwrap_or_else(|| "default".to_string()),
            "Sending request to {}",
            self.peer
        );

        let mut frame = BytesMut::new();
        if let Err(e) = encode_into(&request, &mut frame) {
            // Nothing reached the stream yet
            self.registry.release(callback_idx);
            return Err(e);
        }

        if let Err(e) = self.write_frame(&frame) {
            // Part of the frame may be on the wire; later frames would be misaligned
            let reason = format!("write to {} failed: {}", self.peer, e);
            tracing::warn!("Dropping connection: {}", reason);
            self.registry.fail_all(&reason);
            if let Err(shutdown_err) = self.writer.lock().shutdown_stream() {
                tracing::trace!("Shutdown of {} failed: {}", self.peer, shutdown_err);
            }
            return Err(e.into());
        }

        let timeout_ms = self.config.request_timeout_ms;
        let outcome = if timeout_ms == 0 {
            rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
        } else {
            rx.recv_timeout(Duration::from_millis(timeout_ms))
        };

        match outcome {
            Ok(response) => response?.into_result(),
            Err(RecvTimeoutError::Timeout) => {
                self.registry.cancel(callback_idx);
                Err(BridgeError::Timeout(timeout_ms))
            }
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Closing(
                self.registry
                    .closed_reason()
                    .unwrap_or_else(|| UNEXPECTED_CLOSE.to_string()),
            )),
        }
    }

    fn write_frame(&self, frame: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(frame)?;
        writer.flush()
    }
}

impl<S: Transport> Drop for Client<S> {
    fn drop(&mut self) {
        self.close();
    }
}

// =============================================================================
// Reader Thread
// =============================================================================

/// Read responses until the stream ends or turns out to be unusable
fn reader_loop<S: Transport>(
    mut stream: S,
    registry: Arc<CallbackRegistry>,
    push_tx: Sender<Response>,
    chunk_size: usize,
    peer: String,
) {
    let mut buffer = ReceiveBuffer::with_capacity(chunk_size);

    let reason = loop {
        match buffer.read_from(&mut stream, chunk_size) {
            Ok(0) => break UNEXPECTED_CLOSE.to_string(),
            Ok(n) => tracing::trace!("Read {} bytes from {}", n, peer),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break format!("read from {} failed: {}", peer, e),
        }

        if let Err(reason) = dispatch_buffered(&mut buffer, &registry, &push_tx) {
            break reason;
        }
    };

    tracing::debug!("Reader for {} stopping: {}", peer, reason);
    registry.fail_all(&reason);
}

/// Hand every complete buffered response to its destination
///
/// Returns the close reason if the connection must be torn down.
fn dispatch_buffered(
    buffer: &mut ReceiveBuffer,
    registry: &CallbackRegistry,
    push_tx: &Sender<Response>,
) -> std::result::Result<(), String> {
    loop {
        let response = match buffer.next_message::<Response>() {
            Ok(Some(response)) => response,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!("Dropping connection on undecodable frame: {}", e);
                return Err(e.to_string());
            }
        };

        if response.is_push {
            match push_tx.try_send(response) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Push queue full, dropping push message");
                }
                // Nobody listening once the client is gone
                Err(TrySendError::Disconnected(_)) => {}
            }
            continue;
        }

        if let ResponseValue::ClosingError(message) = &response.value {
            tracing::warn!("Engine closed the connection: {}", message);
            return Err(message.clone());
        }

        let callback_idx = response.callback_idx;
        if !registry.complete(callback_idx, Ok(response)) {
            tracing::warn!(callback_idx, "Response for unknown callback index");
        }
    }
}
