//! Ledger connectivity and transaction-lifecycle runtime.
//!
//! This crate maintains one live session against a multi-endpoint ledger
//! network and provides two reliable primitives on top of it: paginated
//! state queries and submit-then-verify transaction delivery.
//!
//! The session logic itself (endpoint ordering, the connection state
//! machine, trust-line translation) lives in `tideway-core`, decoupled from
//! I/O. This crate supplies the effects: a WebSocket transport, timers, the
//! pending-call registry, and the tasks that keep them coordinated.
//!
//! # Components
//!
//! - [`Client`]: the connection manager and typed operation surface
//! - [`transport`]: transport seam (production WebSocket impl included)
//! - [`registry`]: pending-call correlation with per-call timeouts
//! - [`paginate`]: marker-following pagination combinator
//! - [`events`]: injected event sink and lifecycle signals
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
pub mod events;
pub mod paginate;
pub mod registry;
mod submit;
pub mod transport;

mod queries;

pub use client::{Client, ConnectionConfig, ConnectionDetails};
pub use error::CallError;
pub use tideway_core::{Network, NetworkType, Reserve, SessionState};
pub use events::{AppState, EventSink, NetState, NullSink};
pub use submit::{SubmissionResult, VerificationResult};
pub use transport::{Transport, TransportConnection, WebSocketTransport};
