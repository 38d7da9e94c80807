//! Recording event sink.

use std::sync::{Mutex, PoisonError};

use tideway_client::{ConnectionDetails, EventSink};

/// One observed runtime event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// A connection was established to a network with this id.
    Connected(u32),
    /// Every candidate endpoint failed.
    ConnectionProblem,
    /// A transaction submission was announced.
    SubmitTransaction {
        /// The signed blob being pushed.
        tx_blob: String,
        /// Caller-supplied hash, when known up front.
        hash: Option<String>,
        /// Endpoint the submission was bound for.
        node: String,
    },
}

/// Sink that records every event for later assertion.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything observed so far, in order.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// How many times an event matching `predicate` was observed.
    pub fn count(&self, predicate: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }

    fn record(&self, event: SinkEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

impl EventSink for RecordingSink {
    fn connected(&self, network_id: u32) {
        self.record(SinkEvent::Connected(network_id));
    }

    fn connection_problem(&self) {
        self.record(SinkEvent::ConnectionProblem);
    }

    fn submit_transaction(&self, tx_blob: &str, hash: Option<&str>, details: &ConnectionDetails) {
        self.record(SinkEvent::SubmitTransaction {
            tx_blob: tx_blob.to_owned(),
            hash: hash.map(str::to_owned),
            node: details.node.clone(),
        });
    }
}
