//! Test doubles for the Tideway runtime.
//!
//! A scripted in-process network stands in for real WebSocket endpoints:
//! each endpoint is either unreachable, silent, or backed by a [`MockNode`]
//! whose replies the test scripts. A [`RecordingSink`] captures every
//! runtime event for assertion.
//!
//! Nothing here touches a socket; scripted connections are channel pairs,
//! so tests composed from them run deterministically under paused time.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod script;
mod sink;

pub use script::{MockNode, NodeScript, ScriptedConnection, ScriptedNetwork};
pub use sink::{RecordingSink, SinkEvent};

use tideway_core::{Network, NetworkType, Reserve};

/// A main-type network over the given nodes, preferring the first.
///
/// # Panics
///
/// Panics when `nodes` is empty.
pub fn test_network(key: &str, network_id: u32, nodes: &[&str]) -> Network {
    Network {
        key: key.to_owned(),
        network_id,
        network_type: NetworkType::Main,
        reserve: Reserve { base: 10.0, owner: 2.0 },
        nodes: nodes.iter().map(|&node| node.to_owned()).collect(),
        preferred_node: nodes[0].to_owned(),
    }
}
