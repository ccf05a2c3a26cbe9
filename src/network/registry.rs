//! Callback Registry
//!
//! Tracks requests awaiting a response, keyed by callback index.

use std::collections::{HashMap, HashSet};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{BridgeError, Result};
use crate::protocol::Response;

/// Delivery slot for one pending request
pub type ResponseReceiver = Receiver<Result<Response>>;

struct RegistryState {
    /// Next never-used callback index
    next_idx: u32,

    /// Released indices, reused before minting new ones
    free: Vec<u32>,

    /// Senders for requests still waiting on a response
    pending: HashMap<u32, Sender<Result<Response>>>,

    /// Indices whose caller gave up; held back until the late response lands
    abandoned: HashSet<u32>,

    /// Set once the connection is gone; no new registrations
    closed: Option<String>,
}

/// Pending-request table shared by callers and the reader thread
pub struct CallbackRegistry {
    state: Mutex<RegistryState>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next_idx: 0,
                free: Vec::new(),
                pending: HashMap::new(),
                abandoned: HashSet::new(),
                closed: None,
            }),
        }
    }

    /// Allocate a callback index and the channel its response arrives on
    pub fn register(&self) -> Result<(u32, ResponseReceiver)> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.closed {
            return Err(BridgeError::Closing(reason.clone()));
        }

        let idx = match state.free.pop() {
            Some(idx) => idx,
            None => {
                let idx = state.next_idx;
                state.next_idx = state.next_idx.wrapping_add(1);
                idx
            }
        };

        let (tx, rx) = channel::bounded(1);
        state.pending.insert(idx, tx);
        Ok((idx, rx))
    }

    /// Deliver a response to its waiting request
    ///
    /// Returns false if the index was never handed out or already completed.
    /// A late response for a cancelled request is swallowed and frees the
    /// index.
    pub fn complete(&self, idx: u32, response: Result<Response>) -> bool {
        let sender = {
            let mut state = self.state.lock();
            match state.pending.remove(&idx) {
                Some(tx) => {
                    state.free.push(idx);
                    tx
                }
                None => {
                    if state.abandoned.remove(&idx) {
                        state.free.push(idx);
                        return true;
                    }
                    return false;
                }
            }
        };

        // The receiver lives until the caller stops waiting
        let _ = sender.send(response);
        true
    }

    /// Stop waiting on a request
    ///
    /// The index is not reused until the engine answers it, so a late
    /// response cannot be mistaken for a newer request's.
    pub fn cancel(&self, idx: u32) {
        let mut state = self.state.lock();
        if state.pending.remove(&idx).is_some() {
            state.abandoned.insert(idx);
        }
    }

    /// Drop a request the engine never saw (e.g. the write failed)
    pub fn release(&self, idx: u32) {
        let mut state = self.state.lock();
        if state.pending.remove(&idx).is_some() {
            state.free.push(idx);
        }
    }

    /// Fail every pending request and refuse new ones
    pub fn fail_all(&self, reason: &str) {
        let pending: Vec<_> = {
            let mut state = self.state.lock();
            if state.closed.is_none() {
                state.closed = Some(reason.to_string());
            }
            state.abandoned.clear();
            state.pending.drain().collect()
        };

        for (_, tx) in pending {
            let _ = tx.send(Err(BridgeError::Closing(reason.to_string())));
        }
    }

    /// Number of requests awaiting a response
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Reason the registry was closed, if it was
    pub fn closed_reason(&self) -> Option<String> {
        self.state.lock().closed.clone()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
