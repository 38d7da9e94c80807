//! Engine-result classification.
//!
//! The node answers every submission with a short result code whose three
//! letter prefix names a family. Only the `tem` family (malformed) is a
//! terminal rejection at submit time; every other family means the node has
//! accepted the transaction for relay and the true outcome is only knowable
//! from a validated ledger.

/// The canonical success code recorded in validated metadata.
pub const ENGINE_SUCCESS: &str = "tesSUCCESS";

/// Generic code reported when the submit call itself failed locally.
pub const GENERIC_FAILURE: &str = "telFAILED";

/// Engine-result families, by code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineResultClass {
    /// `tes` — applied to the current open ledger.
    Success,
    /// `tec` — failed, but a fee was claimed and the transaction was
    /// included in a ledger.
    ClaimedCostOnly,
    /// `ter` — not applied yet; retryable in a later ledger.
    Retry,
    /// `tel` — local node error; the network never saw it.
    LocalError,
    /// `tem` — malformed; can never succeed on any node.
    Malformed,
    /// `tef` — failed and cannot apply to the current state.
    Failure,
    /// Anything with an unrecognized prefix.
    Unknown,
}

/// Classify a raw engine-result code by its prefix.
pub fn classify(code: &str) -> EngineResultClass {
    match code.get(..3) {
        Some("tes") => EngineResultClass::Success,
        Some("tec") => EngineResultClass::ClaimedCostOnly,
        Some("ter") => EngineResultClass::Retry,
        Some("tel") => EngineResultClass::LocalError,
        Some("tem") => EngineResultClass::Malformed,
        Some("tef") => EngineResultClass::Failure,
        _ => EngineResultClass::Unknown,
    }
}

/// True for codes that can never succeed, no matter how long we wait.
pub fn is_immediate_reject(code: &str) -> bool {
    classify(code) == EngineResultClass::Malformed
}

/// True for the canonical validated success code.
pub fn is_success(code: &str) -> bool {
    code == ENGINE_SUCCESS
}
