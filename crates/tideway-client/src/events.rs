//! Injected event sink and external lifecycle signals.
//!
//! The runtime never reaches into UI or storage; it reports the few things
//! the embedding application cares about through an [`EventSink`] the
//! application hands it at construction. All methods have empty default
//! bodies so sinks implement only what they observe.

use crate::client::ConnectionDetails;

/// Observer for runtime events.
///
/// Implementations must be cheap and non-blocking; they are called from the
/// runtime's own tasks.
pub trait EventSink: Send + Sync {
    /// A connection was established. Fired exactly once per successful
    /// establishment, before any post-connect traffic, so dependents know
    /// when it is safe to subscribe to ledger-close events.
    fn connected(&self, _network_id: u32) {}

    /// Every candidate endpoint failed. Fired at most once per failure
    /// episode; the latch rearms on the next successful connect or network
    /// switch.
    fn connection_problem(&self) {}

    /// A transaction is about to be submitted. Carries the network and node
    /// identity in effect at send time so external logging correlates
    /// submissions even if the network changes moments later.
    fn submit_transaction(&self, _tx_blob: &str, _hash: Option<&str>, _details: &ConnectionDetails) {
    }
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

/// Application lifecycle signal from the embedding platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// App is in the foreground and interactive.
    Active,
    /// App is transitioning away from the foreground.
    Inactive,
    /// App is fully backgrounded.
    Background,
}

/// Device network-reachability signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetState {
    /// The device has connectivity.
    Connected,
    /// The device lost connectivity.
    Disconnected,
}
