//! Candidate endpoint ordering and normalization.
//!
//! Given a [`Network`], produce the ordered list of endpoints the runtime
//! will dial. Production networks use every configured node for redundancy;
//! custom networks route their single node through a constant proxy. The
//! preferred endpoint always sorts first; the rest keep configuration order.

use crate::network::{Network, NetworkType};

/// Endpoint rewriting policy.
///
/// Injected rather than read from a global so alternative deployments (and
/// tests) can carry their own cluster list and proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPolicy {
    /// Managed cluster endpoints that get the telemetry origin suffix.
    pub cluster_endpoints: Vec<String>,
    /// Origin suffix appended to cluster endpoints.
    pub origin: String,
    /// Proxy prefix for custom-network nodes.
    pub custom_proxy: String,
}

impl Default for EndpointPolicy {
    fn default() -> Self {
        Self {
            cluster_endpoints: vec!["wss://cluster.tideway.network".to_owned()],
            origin: "/tideway/client".to_owned(),
            custom_proxy: "wss://custom-proxy.tideway.network".to_owned(),
        }
    }
}

/// Ordered, normalized candidate endpoints for a network.
///
/// The preferred endpoint is first; remaining nodes keep their insertion
/// order (stable sort). Custom networks yield exactly one candidate.
pub fn candidates(network: &Network, policy: &EndpointPolicy) -> Vec<String> {
    let mut nodes: Vec<&str> = match network.network_type {
        NetworkType::Custom => vec![network.preferred_node.as_str()],
        NetworkType::Main | NetworkType::Test => {
            network.nodes.iter().map(String::as_str).collect()
        }
    };

    nodes.sort_by_key(|node| *node != network.preferred_node);

    nodes.into_iter().map(|node| normalize(node, network, policy)).collect()
}

/// Rewrite one endpoint according to the policy.
fn normalize(endpoint: &str, network: &Network, policy: &EndpointPolicy) -> String {
    if policy.cluster_endpoints.iter().any(|cluster| cluster == endpoint) {
        return format!("{endpoint}{}", policy.origin);
    }

    if network.network_type == NetworkType::Custom {
        let bare = endpoint
            .strip_prefix("wss://")
            .or_else(|| endpoint.strip_prefix("ws://"))
            .unwrap_or(endpoint);
        return format!("{}/{bare}", policy.custom_proxy);
    }

    endpoint.to_owned()
}

#[cfg(test)]
mod tests {
    use crate::network::Reserve;

    use super::*;

    fn network(network_type: NetworkType, nodes: &[&str], preferred: &str) -> Network {
        Network {
            key: "test".to_owned(),
            network_id: 1,
            network_type,
            reserve: Reserve { base: 10.0, owner: 2.0 },
            nodes: nodes.iter().map(|&n| n.to_owned()).collect(),
            preferred_node: preferred.to_owned(),
        }
    }

    #[test]
    fn preferred_sorts_first_others_keep_order() {
        let net = network(
            NetworkType::Main,
            &["wss://a.example.net", "wss://b.example.net", "wss://c.example.net"],
            "wss://b.example.net",
        );

        let ordered = candidates(&net, &EndpointPolicy::default());
        assert_eq!(
            ordered,
            vec!["wss://b.example.net", "wss://a.example.net", "wss://c.example.net"]
        );
    }

    #[test]
    fn cluster_endpoints_get_origin_suffix() {
        let policy = EndpointPolicy::default();
        let cluster = policy.cluster_endpoints[0].clone();
        let net = network(NetworkType::Main, &[cluster.as_str(), "wss://a.example.net"], &cluster);

        let ordered = candidates(&net, &policy);
        assert_eq!(ordered[0], format!("{cluster}{}", policy.origin));
        assert_eq!(ordered[1], "wss://a.example.net");
    }

    #[test]
    fn custom_network_routes_single_node_through_proxy() {
        let policy = EndpointPolicy::default();
        let net = network(
            NetworkType::Custom,
            &["wss://my-node.local:6006", "wss://ignored.example.net"],
            "wss://my-node.local:6006",
        );

        let ordered = candidates(&net, &policy);
        assert_eq!(ordered, vec![format!("{}/my-node.local:6006", policy.custom_proxy)]);
    }

    #[test]
    fn custom_network_strips_insecure_scheme_too() {
        let policy = EndpointPolicy::default();
        let net = network(NetworkType::Custom, &["ws://node.local"], "ws://node.local");

        let ordered = candidates(&net, &policy);
        assert_eq!(ordered, vec![format!("{}/node.local", policy.custom_proxy)]);
    }
}
