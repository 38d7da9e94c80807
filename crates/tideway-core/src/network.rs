//! Network identity.
//!
//! A [`Network`] names the chain a session targets: a stable key, the
//! numeric chain id, reserve values in the native unit, and the candidate
//! node list with one designated preferred endpoint. It is immutable for
//! the lifetime of a session and replaced wholesale on a network switch.

use serde::{Deserialize, Serialize};

/// Kind of network, which drives endpoint selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// A production chain; every listed node is used for redundancy.
    Main,
    /// A public test chain; treated like `Main` for failover.
    Test,
    /// A user-configured chain with a single node, dialed through the
    /// custom-node proxy.
    Custom,
}

/// Base and per-object owner reserve, in the chain's native unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reserve {
    /// Minimum balance every account must retain.
    pub base: f64,
    /// Additional reserve per owned ledger object.
    pub owner: f64,
}

/// Identity of the chain/session being targeted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Stable key naming this network, e.g. `"mainnet"`.
    pub key: String,
    /// Numeric chain identifier.
    pub network_id: u32,
    /// Network kind.
    pub network_type: NetworkType,
    /// Reserve values last known for this network.
    pub reserve: Reserve,
    /// Candidate node endpoints, in configuration order.
    pub nodes: Vec<String>,
    /// The endpoint to try first.
    pub preferred_node: String,
}

impl Network {
    /// Whether switching to `other` would be a no-op.
    ///
    /// A switch request targeting the same key with the same preferred node
    /// must not tear down the live connection.
    pub fn is_same_target(&self, other: &Network) -> bool {
        self.key == other.key
            && self.network_id == other.network_id
            && self.preferred_node == other.preferred_node
    }
}
