//! Tagged command variants, one per RPC method.
//!
//! Serializing a `Command` produces the node's expected request object with
//! a `command` discriminator, e.g. `{"command": "account_info", ...}`. The
//! correlation id is injected separately by [`request_payload`] so command
//! values stay id-free and reusable.

use serde::Serialize;
use serde_json::Value;

use crate::response::Marker;

/// Ledger index selector accepted by most read queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LedgerIndex {
    /// A symbolic ledger: `"validated"` or `"current"`.
    Symbolic(Symbolic),
    /// A specific ledger sequence number.
    Sequence(u32),
}

/// Symbolic ledger names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbolic {
    /// The latest ledger validated by consensus.
    Validated,
    /// The in-progress open ledger.
    Current,
}

impl LedgerIndex {
    /// The latest validated ledger, the default for read queries.
    pub const VALIDATED: Self = LedgerIndex::Symbolic(Symbolic::Validated);
}

/// Lookup key for a ripple-state entry shared by two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RippleStateLookup {
    /// The two accounts sharing the entry, in either order.
    pub accounts: Vec<String>,
    /// Currency code of the trust line.
    pub currency: String,
}

/// One side of an AMM pool: the native asset or an issued one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetSpec {
    /// Currency code.
    pub currency: String,
    /// Issuer address; absent for the native asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// A request to the connected node.
///
/// One variant per supported RPC method. Fields that the node treats as
/// optional are `Option` and skipped when unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Account root entry: balance, sequence, flags, optional signer lists.
    AccountInfo {
        /// Account address to look up.
        account: String,
        /// Which ledger to read from.
        ledger_index: LedgerIndex,
        /// Include the account's signer lists.
        signer_lists: bool,
    },

    /// Ledger objects owned by an account, paginated via marker.
    AccountObjects {
        /// Owner account address.
        account: String,
        /// Narrow the listing to one object type, e.g. `"state"`.
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        object_type: Option<String>,
        /// Page size hint.
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        /// Continuation marker from the previous page.
        #[serde(skip_serializing_if = "Option::is_none")]
        marker: Option<Marker>,
    },

    /// Transactions that affected an account, paginated via marker.
    AccountTx {
        /// Account address.
        account: String,
        /// Page size hint.
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        /// Return decoded JSON rather than binary blobs.
        binary: bool,
        /// Continuation marker from the previous page.
        #[serde(skip_serializing_if = "Option::is_none")]
        marker: Option<Marker>,
    },

    /// Non-fungible tokens held by an account, paginated via marker.
    AccountNfts {
        /// Account address.
        account: String,
        /// Page size hint.
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        /// Continuation marker from the previous page.
        #[serde(skip_serializing_if = "Option::is_none")]
        marker: Option<Marker>,
    },

    /// Issuer obligations and hot-wallet balances.
    GatewayBalances {
        /// Issuer account address.
        account: String,
        /// Operational addresses excluded from obligations.
        #[serde(skip_serializing_if = "Option::is_none")]
        hotwallet: Option<Vec<String>>,
    },

    /// Single transaction lookup by hash.
    Tx {
        /// Transaction hash.
        transaction: String,
        /// Return decoded JSON rather than a binary blob.
        binary: bool,
    },

    /// Submit a signed transaction blob.
    Submit {
        /// Hex-encoded signed transaction.
        tx_blob: String,
        /// Reject rather than retry on provisional failure.
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        fail_hard: bool,
    },

    /// Node status, including validated-ledger reserve values.
    ServerInfo,

    /// Raw ledger entry lookup, by index or by ripple-state pair.
    LedgerEntry {
        /// Entry index (hash) to fetch.
        #[serde(skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        /// Ripple-state pair lookup.
        #[serde(skip_serializing_if = "Option::is_none")]
        ripple_state: Option<RippleStateLookup>,
        /// Which ledger to read from.
        ledger_index: LedgerIndex,
    },

    /// AMM pool info for an asset pair.
    AmmInfo {
        /// First pool asset.
        asset: AssetSpec,
        /// Second pool asset.
        asset2: AssetSpec,
    },

    /// Current fee levels, in drops of the native asset.
    Fee,

    /// Subscribe to server streams and/or account event feeds.
    Subscribe {
        /// Stream names, e.g. `"ledger"`.
        #[serde(skip_serializing_if = "Option::is_none")]
        streams: Option<Vec<String>>,
        /// Account addresses to stream transactions for.
        #[serde(skip_serializing_if = "Option::is_none")]
        accounts: Option<Vec<String>>,
    },

    /// Undo a previous subscription.
    Unsubscribe {
        /// Stream names to drop.
        #[serde(skip_serializing_if = "Option::is_none")]
        streams: Option<Vec<String>>,
        /// Account addresses to drop.
        #[serde(skip_serializing_if = "Option::is_none")]
        accounts: Option<Vec<String>>,
    },
}

impl Command {
    /// The RPC method name this command serializes to.
    pub fn method(&self) -> &'static str {
        match self {
            Command::AccountInfo { .. } => "account_info",
            Command::AccountObjects { .. } => "account_objects",
            Command::AccountTx { .. } => "account_tx",
            Command::AccountNfts { .. } => "account_nfts",
            Command::GatewayBalances { .. } => "gateway_balances",
            Command::Tx { .. } => "tx",
            Command::Submit { .. } => "submit",
            Command::ServerInfo => "server_info",
            Command::LedgerEntry { .. } => "ledger_entry",
            Command::AmmInfo { .. } => "amm_info",
            Command::Fee => "fee",
            Command::Subscribe { .. } => "subscribe",
            Command::Unsubscribe { .. } => "unsubscribe",
        }
    }
}

/// Serialize a command with the given correlation id injected.
///
/// # Errors
///
/// Returns a serialization error if the command cannot be encoded, which
/// indicates a programming error in the command definition itself.
pub fn request_payload(command: &Command, id: u64) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(command)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("id".to_owned(), Value::from(id));
    }
    serde_json::to_string(&value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn account_info_shape() {
        let cmd = Command::AccountInfo {
            account: "rAlice".into(),
            ledger_index: LedgerIndex::VALIDATED,
            signer_lists: true,
        };

        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            value,
            json!({
                "command": "account_info",
                "account": "rAlice",
                "ledger_index": "validated",
                "signer_lists": true,
            })
        );
    }

    #[test]
    fn optional_fields_are_omitted() {
        let cmd = Command::AccountObjects {
            account: "rAlice".into(),
            object_type: None,
            limit: None,
            marker: None,
        };

        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value, json!({ "command": "account_objects", "account": "rAlice" }));
    }

    #[test]
    fn marker_round_trips_opaquely() {
        let marker = Marker(json!({ "ledger": 7, "seq": 21 }));
        let cmd = Command::AccountTx {
            account: "rAlice".into(),
            limit: Some(20),
            binary: false,
            marker: Some(marker.clone()),
        };

        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["marker"], marker.0);
    }

    #[test]
    fn submit_omits_default_fail_hard() {
        let cmd = Command::Submit { tx_blob: "DEADBEEF".into(), fail_hard: false };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value, json!({ "command": "submit", "tx_blob": "DEADBEEF" }));

        let cmd = Command::Submit { tx_blob: "DEADBEEF".into(), fail_hard: true };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["fail_hard"], json!(true));
    }

    #[test]
    fn request_payload_injects_id() {
        let payload = request_payload(&Command::ServerInfo, 42).unwrap();
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value, json!({ "command": "server_info", "id": 42 }));
    }

    #[test]
    fn method_names_match_wire_tags() {
        let cmd = Command::Fee;
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["command"], cmd.method());
    }
}
