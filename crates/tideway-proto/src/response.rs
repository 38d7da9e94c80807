//! Response envelope and typed result payloads.
//!
//! Every reply from the node is an [`Envelope`]: the echoed correlation id,
//! a status, and either a `result` object or error diagnostics. Typed
//! payload structs deserialize from the `result` field; unknown fields are
//! preserved where callers need the full record and dropped elsewhere.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ApiError;

/// Opaque pagination marker.
///
/// The server's continuation token is echoed back verbatim to fetch the
/// next page. Compared only for equality; its structure is meaningless to
/// the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marker(pub Value);

/// Generic reply envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Echoed correlation id.
    pub id: Option<u64>,
    /// `"success"` or `"error"`.
    pub status: Option<String>,
    /// Result payload on success.
    pub result: Option<Value>,
    /// Error code on failure.
    pub error: Option<String>,
    /// Human-readable error description.
    pub error_message: Option<String>,
    /// Exception detail, present on some validation failures.
    pub error_exception: Option<String>,
}

impl Envelope {
    /// True when the envelope reports a protocol-level error.
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error") || self.error.is_some()
    }

    /// Build the typed error for an error envelope, if it is one.
    pub fn api_error(&self) -> Option<ApiError> {
        if !self.is_error() {
            return None;
        }
        let code = self.error.clone().unwrap_or_else(|| "unknownError".to_owned());
        let message = self
            .error_message
            .clone()
            .or_else(|| self.error_exception.clone())
            .unwrap_or_default();
        Some(ApiError { code, message })
    }

    /// Extract the result payload, mapping error envelopes to [`ApiError`].
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self.api_error() {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// A ledger-close notification from the `ledger` stream.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerClosed {
    /// Sequence number of the closed ledger.
    pub ledger_index: u64,
    /// Hash of the closed ledger, when the server provides it.
    #[serde(default)]
    pub ledger_hash: Option<String>,
}

/// `account_info` result.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    /// The account root entry.
    pub account_data: AccountData,
    /// True when read from a validated ledger.
    #[serde(default)]
    pub validated: bool,
}

/// Account root fields the runtime cares about; the rest is preserved.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountData {
    /// Account address.
    #[serde(rename = "Account")]
    pub account: String,
    /// Balance in drops of the native asset.
    #[serde(rename = "Balance")]
    pub balance: String,
    /// Next transaction sequence number.
    #[serde(rename = "Sequence")]
    pub sequence: u32,
    /// Number of owned ledger objects, for reserve accounting.
    #[serde(rename = "OwnerCount")]
    pub owner_count: u32,
    /// Account flag bits.
    #[serde(rename = "Flags")]
    pub flags: u32,
    /// Remaining account root fields.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One page of `account_objects`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountObjectsPage {
    /// Raw ledger objects owned by the account.
    pub account_objects: Vec<Value>,
    /// Continuation marker, absent on the last page.
    #[serde(default)]
    pub marker: Option<Marker>,
}

/// One page of `account_tx`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountTxPage {
    /// Transactions with metadata.
    pub transactions: Vec<Value>,
    /// Continuation marker, absent on the last page.
    #[serde(default)]
    pub marker: Option<Marker>,
}

/// One page of `account_nfts`.
#[derive(Debug, Clone, Deserialize)]
pub struct NftPage {
    /// Tokens held by the account.
    pub account_nfts: Vec<Value>,
    /// Continuation marker, absent on the last page.
    #[serde(default)]
    pub marker: Option<Marker>,
}

/// `gateway_balances` result.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayBalances {
    /// Issuer account.
    pub account: String,
    /// Total issued per currency.
    #[serde(default)]
    pub obligations: Option<Map<String, Value>>,
    /// Balances held by the listed hot wallets.
    #[serde(default)]
    pub balances: Option<Map<String, Value>>,
    /// Assets the issuer itself holds.
    #[serde(default)]
    pub assets: Option<Map<String, Value>>,
}

/// A transaction record returned by the `tx` method.
#[derive(Debug, Clone, Deserialize)]
pub struct TxRecord {
    /// True once the transaction is in a validated ledger.
    #[serde(default)]
    pub validated: bool,
    /// Transaction hash.
    #[serde(default)]
    pub hash: Option<String>,
    /// Metadata, present once applied to a ledger.
    #[serde(default)]
    pub meta: Option<TxMeta>,
    /// All remaining transaction fields.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl TxRecord {
    /// The applied engine-result code, if metadata is present.
    pub fn result_code(&self) -> Option<&str> {
        self.meta.as_ref().map(|meta| meta.transaction_result.as_str())
    }
}

/// Transaction metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct TxMeta {
    /// Final engine-result code recorded in the ledger.
    #[serde(rename = "TransactionResult")]
    pub transaction_result: String,
    /// Remaining metadata fields.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// `submit` result payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOutcome {
    /// Immediate engine classification of the submission.
    #[serde(default)]
    pub engine_result: Option<String>,
    /// Human-readable counterpart of the engine result.
    #[serde(default)]
    pub engine_result_message: Option<String>,
    /// The decoded transaction as the node understood it.
    #[serde(default)]
    pub tx_json: Option<Value>,
}

impl SubmitOutcome {
    /// Transaction hash reported by the node, if any.
    pub fn hash(&self) -> Option<&str> {
        self.tx_json.as_ref()?.get("hash")?.as_str()
    }
}

/// `server_info` result.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    /// The `info` object.
    pub info: ServerState,
}

/// Server state fields the runtime consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerState {
    /// Most recent validated ledger, with reserve values.
    #[serde(default)]
    pub validated_ledger: Option<ValidatedLedger>,
    /// Node software version.
    #[serde(default)]
    pub build_version: Option<String>,
}

/// Validated-ledger summary from `server_info`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatedLedger {
    /// Ledger sequence number.
    pub seq: u64,
    /// Base reserve in the native unit.
    #[serde(rename = "reserve_base_xrp")]
    pub reserve_base: f64,
    /// Per-object owner reserve in the native unit.
    #[serde(rename = "reserve_inc_xrp")]
    pub reserve_owner: f64,
}

/// `ledger_entry` result.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEntryResult {
    /// Entry index (hash).
    pub index: Option<String>,
    /// The decoded ledger entry.
    pub node: Option<Value>,
}

/// `fee` result.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeInfo {
    /// Fee levels in drops.
    pub drops: FeeDrops,
}

/// Fee levels in drops of the native asset.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeDrops {
    /// Minimum cost to relay.
    pub base_fee: String,
    /// Median cost over the recent window.
    #[serde(default)]
    pub median_fee: Option<String>,
    /// Minimum cost for the current open ledger.
    #[serde(default)]
    pub minimum_fee: Option<String>,
    /// Cost to enter the current open ledger.
    #[serde(default)]
    pub open_ledger_fee: Option<String>,
}

/// `amm_info` result.
#[derive(Debug, Clone, Deserialize)]
pub struct AmmInfo {
    /// The pool description object.
    pub amm: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_envelope_yields_result() {
        let envelope: Envelope = serde_json::from_value(json!({
            "id": 7,
            "status": "success",
            "result": { "x": 1 },
        }))
        .unwrap();

        assert!(!envelope.is_error());
        assert_eq!(envelope.into_result().unwrap(), json!({ "x": 1 }));
    }

    #[test]
    fn error_envelope_yields_api_error() {
        let envelope: Envelope = serde_json::from_value(json!({
            "id": 7,
            "status": "error",
            "error": "actNotFound",
            "error_message": "Account not found.",
        }))
        .unwrap();

        let err = envelope.into_result().unwrap_err();
        assert_eq!(err.code, "actNotFound");
        assert_eq!(err.message, "Account not found.");
    }

    #[test]
    fn error_exception_backfills_message() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "error",
            "error": "invalidTransaction",
            "error_exception": "fails local checks",
        }))
        .unwrap();

        let err = envelope.api_error().unwrap();
        assert_eq!(err.message, "fails local checks");
    }

    #[test]
    fn tx_record_exposes_result_code() {
        let record: TxRecord = serde_json::from_value(json!({
            "validated": true,
            "hash": "ABC",
            "meta": { "TransactionResult": "tesSUCCESS", "TransactionIndex": 2 },
            "Account": "rAlice",
        }))
        .unwrap();

        assert!(record.validated);
        assert_eq!(record.result_code(), Some("tesSUCCESS"));
        assert_eq!(record.rest["Account"], "rAlice");
    }

    #[test]
    fn submit_outcome_extracts_hash() {
        let outcome: SubmitOutcome = serde_json::from_value(json!({
            "engine_result": "tesSUCCESS",
            "engine_result_message": "applied",
            "tx_json": { "hash": "FACE" },
        }))
        .unwrap();

        assert_eq!(outcome.hash(), Some("FACE"));
    }

    #[test]
    fn validated_ledger_reserves() {
        let info: ServerInfo = serde_json::from_value(json!({
            "info": {
                "build_version": "2.0.0",
                "validated_ledger": {
                    "seq": 1000,
                    "reserve_base_xrp": 10.0,
                    "reserve_inc_xrp": 2.0,
                },
            },
        }))
        .unwrap();

        let ledger = info.info.validated_ledger.unwrap();
        assert_eq!(ledger.reserve_base, 10.0);
        assert_eq!(ledger.reserve_owner, 2.0);
    }
}
