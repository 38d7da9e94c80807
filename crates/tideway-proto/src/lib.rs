//! Wire surface for the Tideway ledger runtime.
//!
//! Commands are a closed set of tagged variants, one per RPC method, so a
//! request can never be assembled with a missing or misspelled field at the
//! call site. Responses arrive as a generic envelope carrying a correlation
//! id; typed payloads are deserialized out of the envelope's `result` field.
//!
//! Nothing in this crate performs I/O. The runtime crate owns transport and
//! timing; this crate owns shapes and classification.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod engine;
pub mod errors;
pub mod response;

pub use command::{AssetSpec, Command, LedgerIndex, RippleStateLookup, request_payload};
pub use engine::{
    ENGINE_SUCCESS, EngineResultClass, GENERIC_FAILURE, classify, is_immediate_reject, is_success,
};
pub use errors::ApiError;
pub use response::{
    AccountInfo, AccountObjectsPage, AccountTxPage, AmmInfo, Envelope, FeeDrops, FeeInfo,
    GatewayBalances, LedgerClosed, LedgerEntryResult, Marker, NftPage, ServerInfo, SubmitOutcome,
    TxRecord, ValidatedLedger,
};
