//! Pending-call registry.
//!
//! Correlates outgoing commands with their eventual responses. Every call
//! gets a fresh id and a oneshot resolver; a response with no matching id
//! is reported back to the caller as unmatched and otherwise ignored. The
//! registry holds no timers itself; the caller owns the timeout and
//! discards the record when it fires, so a late response cannot resurrect
//! a cancelled wait.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use serde_json::Value;
use tokio::sync::oneshot;

/// Registry of in-flight calls, keyed by correlation id.
#[derive(Debug, Default)]
pub struct PendingCalls {
    next_id: AtomicU64,
    inflight: Mutex<HashMap<u64, oneshot::Sender<Value>>>,
}

impl PendingCalls {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new call and return its id with the response receiver.
    ///
    /// Ids are unique among all calls this registry ever issued, which
    /// makes them trivially unique among the outstanding ones.
    pub fn register(&self) -> (u64, oneshot::Receiver<Value>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.lock().insert(id, tx);
        (id, rx)
    }

    /// Deliver a response to the matching call.
    ///
    /// Returns `false` when no call with this id is outstanding, either
    /// because it already timed out or because the message is stray.
    pub fn complete(&self, id: u64, response: Value) -> bool {
        let Some(tx) = self.lock().remove(&id) else {
            return false;
        };
        // A dropped receiver means the caller gave up between our lookup
        // and the send; the response is discarded either way.
        tx.send(response).is_ok()
    }

    /// Drop the record for a call whose timeout fired.
    pub fn discard(&self, id: u64) {
        self.lock().remove(&id);
    }

    /// Fail every outstanding call.
    ///
    /// Dropping the senders wakes all waiting callers with a channel-closed
    /// error, which the client surfaces as a connection-closed failure
    /// distinct from a timeout.
    pub fn abort_all(&self) {
        self.lock().clear();
    }

    /// Number of calls currently outstanding.
    pub fn outstanding(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, oneshot::Sender<Value>>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
