//! Transaction submission and confirmation.
//!
//! Submission is two-phase. [`Client::submit`] pushes a signed blob and
//! classifies the node's immediate engine verdict; anything short of an
//! immediate reject is only tentative. [`Client::verify`] then watches
//! ledger closes until the transaction appears in a validated ledger or the
//! confirmation window lapses. A lapsed window is inconclusive, not a
//! failure: the transaction may still validate later.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use tideway_proto::{Command, GENERIC_FAILURE, TxRecord, is_immediate_reject, is_success};

use crate::{client::Client, transport::Transport};

/// Outcome of pushing a signed transaction to the node.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// True when the engine did not reject the transaction outright. Only
    /// tentative; confirmation requires [`Client::verify`].
    pub success: bool,
    /// Engine-result code, or a transport error stand-in.
    pub engine_result: String,
    /// Human-readable detail accompanying the result.
    pub message: String,
    /// Transaction hash, from the caller or recovered from the node's echo.
    pub hash: Option<String>,
    /// The network the submission went to.
    pub network: crate::client::ConnectionDetails,
}

/// Outcome of waiting for ledger confirmation.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// True when the transaction validated with a success code.
    pub success: bool,
    /// The validated transaction record, absent when the window lapsed.
    pub transaction: Option<TxRecord>,
}

impl<T: Transport> Client<T> {
    /// Submit a signed transaction blob.
    ///
    /// The returned result is the engine's immediate verdict. Transport and
    /// protocol failures map to a failed result with [`GENERIC_FAILURE`] or
    /// the protocol error code rather than an `Err`, so callers always get
    /// a uniform record of what the network said.
    pub async fn submit(
        &self,
        tx_blob: &str,
        hash: Option<&str>,
        fail_hard: bool,
    ) -> SubmissionResult {
        let network = self.connection_details();
        self.event_sink().submit_transaction(tx_blob, hash, &network);

        let command = Command::Submit { tx_blob: tx_blob.to_owned(), fail_hard };
        let envelope = match self.send(command).await {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(%error, "submission never reached the node");
                return SubmissionResult {
                    success: false,
                    engine_result: GENERIC_FAILURE.to_owned(),
                    message: error.to_string(),
                    hash: hash.map(str::to_owned),
                    network,
                };
            }
        };

        if let Some(api) = envelope.api_error() {
            warn!(code = %api.code, "node rejected the submission");
            return SubmissionResult {
                success: false,
                engine_result: api.code,
                message: api.message,
                hash: hash.map(str::to_owned),
                network,
            };
        }

        let outcome: tideway_proto::SubmitOutcome =
            match envelope.into_result().ok().map(serde_json::from_value).and_then(Result::ok) {
                Some(outcome) => outcome,
                None => {
                    warn!("submission reply carried no usable result");
                    return SubmissionResult {
                        success: false,
                        engine_result: GENERIC_FAILURE.to_owned(),
                        message: "malformed submission reply".to_owned(),
                        hash: hash.map(str::to_owned),
                        network,
                    };
                }
            };

        let engine_result =
            outcome.engine_result.clone().unwrap_or_else(|| GENERIC_FAILURE.to_owned());
        let message = outcome.engine_result_message.clone().unwrap_or_default();
        let resolved_hash =
            hash.map(str::to_owned).or_else(|| outcome.hash().map(str::to_owned));

        // Only an immediate reject is final here. Provisional and retry
        // codes still leave room for the transaction to apply, so they
        // stay tentative successes pending verification.
        let success = !is_immediate_reject(&engine_result);
        info!(engine_result, success, "submission acknowledged");

        SubmissionResult { success, engine_result, message, hash: resolved_hash, network }
    }

    /// Wait for the transaction to land in a validated ledger.
    ///
    /// Checks the transaction after each ledger close until the
    /// confirmation window lapses. On lapse the result carries no record
    /// and `success` is false, which means unconfirmed, not failed.
    pub async fn verify(&self, hash: &str) -> VerificationResult {
        // Subscribe before anything else so no close slips past between
        // the submission and the watch.
        let mut closes = self.ledger_closes();
        let mut stream_open = true;

        let deadline = sleep(self.config().verify_timeout);
        tokio::pin!(deadline);

        debug!(hash, "watching ledger closes for confirmation");

        loop {
            tokio::select! {
                () = &mut deadline => {
                    warn!(hash, "confirmation window lapsed, outcome unknown");
                    return VerificationResult { success: false, transaction: None };
                }
                notice = closes.recv(), if stream_open => match notice {
                    Ok(closed) => {
                        debug!(hash, ledger_index = closed.ledger_index, "checking after close");
                        match self.tx(hash).await {
                            Ok(record) if record.validated => {
                                let success =
                                    record.result_code().is_some_and(is_success);
                                info!(hash, success, "transaction validated");
                                return VerificationResult {
                                    success,
                                    transaction: Some(record),
                                };
                            }
                            // Not validated yet: wait for the next close.
                            Ok(_) => {}
                            Err(error) => debug!(hash, %error, "lookup failed, will retry"),
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(hash, missed, "close stream lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        stream_open = false;
                    }
                },
            }
        }
    }
}
