//! Pure session and ledger-state logic for the Tideway runtime.
//!
//! Everything in this crate is deterministic and isolated from I/O, time,
//! and scheduling. The runtime crate supplies external effects; this crate
//! owns the decisions: which endpoints to dial and in what order, how the
//! session state machine moves, and how a raw bidirectional ledger balance
//! entry becomes a one-sided trust-line view.
//!
//! # Components
//!
//! - [`network`]: Network identity (key, id, reserves, node list)
//! - [`endpoints`]: Candidate ordering and endpoint normalization
//! - [`session`]: Consolidated connection state machine with the
//!   connection-problem latch
//! - [`ripple_state`]: Ripple-state entry to trust-line translation
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod endpoints;
pub mod network;
pub mod ripple_state;
pub mod session;

pub use endpoints::{EndpointPolicy, candidates};
pub use network::{Network, NetworkType, Reserve};
pub use ripple_state::{IssuedAmount, RippleState, TrustLine, trust_line};
pub use session::{Session, SessionState};
