//! Connection session state machine.
//!
//! One consolidated state machine replaces the overlapping close/destroy/
//! reinstate operations that tend to accrete around long-lived client
//! connections. The runtime drives it; the machine itself performs no I/O.
//!
//! # State machine
//!
//! ```text
//!                begin_connect          established
//! ┌──────────────┐ ─────────> ┌────────────┐ ─────────> ┌───────────┐
//! │ Disconnected │            │ Connecting │            │ Connected │
//! └──────────────┘ <───────── └────────────┘            └───────────┘
//!        ^          exhausted                                 │
//!        └────────────────────────── closed ──────────────────┘
//! ```
//!
//! # The connection-problem latch
//!
//! Exhausting every candidate endpoint is the only condition surfaced to
//! the user, and it is surfaced once per failure episode: [`Session::exhausted`]
//! reports `true` the first time after a successful connect (or an explicit
//! reset on network switch) and `false` until the latch is cleared again.

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live connection.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// A connection is established and healthy.
    Connected,
}

/// Connection session state with the problem latch.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    problem_latched: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// New session, disconnected, latch clear.
    pub fn new() -> Self {
        Self { state: SessionState::Disconnected, problem_latched: false }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True when a connection is established.
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Start a connect attempt.
    ///
    /// Returns `false` unless the session is disconnected: concurrent
    /// connect requests collapse into one, and a live connection is never
    /// doubled up.
    pub fn begin_connect(&mut self) -> bool {
        if self.state != SessionState::Disconnected {
            return false;
        }
        self.state = SessionState::Connecting;
        true
    }

    /// A connection was established. Clears the problem latch.
    pub fn established(&mut self) {
        self.state = SessionState::Connected;
        self.problem_latched = false;
    }

    /// The live connection closed (peer close, offline, explicit teardown).
    pub fn closed(&mut self) {
        self.state = SessionState::Disconnected;
    }

    /// Every candidate endpoint failed.
    ///
    /// Moves to `Disconnected` and returns `true` exactly once per failure
    /// episode; callers raise the user-facing connectivity signal only on
    /// `true`.
    pub fn exhausted(&mut self) -> bool {
        self.state = SessionState::Disconnected;
        if self.problem_latched {
            return false;
        }
        self.problem_latched = true;
        true
    }

    /// Clear the problem latch, e.g. when switching to a fresh network.
    pub fn reset_latch(&mut self) {
        self.problem_latched = false;
    }
}
