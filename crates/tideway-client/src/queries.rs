//! Typed read queries over the live connection.
//!
//! Thin wrappers around [`Client::send`]: each builds the command, runs the
//! call, and deserializes the result. Paged queries go through
//! [`collect_pages`] and return everything the node handed over before any
//! failure.

use serde_json::Value;
use tracing::debug;

use tideway_core::{RippleState, TrustLine, trust_line};
use tideway_proto::{
    AccountInfo, AccountObjectsPage, AccountTxPage, AmmInfo, AssetSpec, Command, FeeInfo,
    GatewayBalances, LedgerEntryResult, LedgerIndex, NftPage, RippleStateLookup, ServerInfo,
    TxRecord,
};

use crate::{
    client::Client,
    error::CallError,
    paginate::{Page, collect_pages},
    transport::Transport,
};

const PAGE_LIMIT: u32 = 200;

impl<T: Transport> Client<T> {
    /// Account root entry from the validated ledger, with signer lists.
    ///
    /// # Errors
    ///
    /// Fails on connection loss, timeout, or a protocol error such as
    /// `actNotFound`.
    pub async fn account_info(&self, account: &str) -> Result<AccountInfo, CallError> {
        self.call(Command::AccountInfo {
            account: account.to_owned(),
            ledger_index: LedgerIndex::VALIDATED,
            signer_lists: true,
        })
        .await
    }

    /// Every ledger object owned by `account`, optionally narrowed to one
    /// object type. Partial on mid-pagination failure.
    pub async fn account_objects(&self, account: &str, object_type: Option<&str>) -> Vec<Value> {
        collect_pages(|marker| {
            let command = Command::AccountObjects {
                account: account.to_owned(),
                object_type: object_type.map(str::to_owned),
                limit: Some(PAGE_LIMIT),
                marker,
            };
            async move {
                let page: AccountObjectsPage = self.call(command).await?;
                Ok(Page { items: page.account_objects, marker: page.marker })
            }
        })
        .await
    }

    /// Transactions that affected `account`, newest first as the node
    /// orders them. Partial on mid-pagination failure.
    pub async fn account_transactions(&self, account: &str) -> Vec<Value> {
        collect_pages(|marker| {
            let command = Command::AccountTx {
                account: account.to_owned(),
                limit: Some(PAGE_LIMIT),
                binary: false,
                marker,
            };
            async move {
                let page: AccountTxPage = self.call(command).await?;
                Ok(Page { items: page.transactions, marker: page.marker })
            }
        })
        .await
    }

    /// Non-fungible tokens held by `account`. Partial on mid-pagination
    /// failure.
    pub async fn account_nfts(&self, account: &str) -> Vec<Value> {
        collect_pages(|marker| {
            let command = Command::AccountNfts {
                account: account.to_owned(),
                limit: Some(PAGE_LIMIT),
                marker,
            };
            async move {
                let page: NftPage = self.call(command).await?;
                Ok(Page { items: page.account_nfts, marker: page.marker })
            }
        })
        .await
    }

    /// Issuer obligations and balances held by the listed hot wallets.
    ///
    /// # Errors
    ///
    /// Fails on connection loss, timeout, or a protocol error.
    pub async fn gateway_balances(
        &self,
        account: &str,
        hotwallet: Option<Vec<String>>,
    ) -> Result<GatewayBalances, CallError> {
        self.call(Command::GatewayBalances { account: account.to_owned(), hotwallet }).await
    }

    /// Single transaction lookup by hash.
    ///
    /// # Errors
    ///
    /// Fails on connection loss, timeout, or `txnNotFound` when the node
    /// has never seen the hash.
    pub async fn tx(&self, hash: &str) -> Result<TxRecord, CallError> {
        self.call(Command::Tx { transaction: hash.to_owned(), binary: false }).await
    }

    /// Node status, including reserve values from the validated ledger.
    ///
    /// # Errors
    ///
    /// Fails on connection loss or timeout.
    pub async fn server_info(&self) -> Result<ServerInfo, CallError> {
        self.call(Command::ServerInfo).await
    }

    /// Raw ledger entry by index (hash), read from the validated ledger.
    ///
    /// # Errors
    ///
    /// Fails on connection loss, timeout, or `entryNotFound`.
    pub async fn ledger_entry(&self, index: &str) -> Result<LedgerEntryResult, CallError> {
        self.call(Command::LedgerEntry {
            index: Some(index.to_owned()),
            ripple_state: None,
            ledger_index: LedgerIndex::VALIDATED,
        })
        .await
    }

    /// AMM pool info for an asset pair.
    ///
    /// # Errors
    ///
    /// Fails on connection loss, timeout, or when no pool exists for the
    /// pair.
    pub async fn amm_info(&self, asset: AssetSpec, asset2: AssetSpec) -> Result<AmmInfo, CallError> {
        self.call(Command::AmmInfo { asset, asset2 }).await
    }

    /// Current fee levels in drops.
    ///
    /// # Errors
    ///
    /// Fails on connection loss or timeout.
    pub async fn fee(&self) -> Result<FeeInfo, CallError> {
        self.call(Command::Fee).await
    }

    /// Stream transactions for the given accounts over the live connection.
    ///
    /// # Errors
    ///
    /// Fails on connection loss or timeout.
    pub async fn subscribe_accounts(&self, accounts: Vec<String>) -> Result<(), CallError> {
        self.call::<Value>(Command::Subscribe { streams: None, accounts: Some(accounts) }).await?;
        Ok(())
    }

    /// Stop streaming transactions for the given accounts.
    ///
    /// # Errors
    ///
    /// Fails on connection loss or timeout.
    pub async fn unsubscribe_accounts(&self, accounts: Vec<String>) -> Result<(), CallError> {
        self.call::<Value>(Command::Unsubscribe { streams: None, accounts: Some(accounts) })
            .await?;
        Ok(())
    }

    /// All trust lines of `account`, from its owned ripple-state entries.
    ///
    /// Entries still in their default state from this account's side, and
    /// objects that fail to decode as ripple-state entries, are skipped.
    pub async fn trust_lines(&self, account: &str) -> Vec<TrustLine> {
        self.account_objects(account, Some("state"))
            .await
            .into_iter()
            .filter_map(|object| {
                match serde_json::from_value::<RippleState>(object) {
                    Ok(entry) => trust_line(&entry, account),
                    Err(error) => {
                        debug!(%error, "skipping undecodable ripple-state object");
                        None
                    }
                }
            })
            .collect()
    }

    /// One trust line between `account` and `counterpart` in `currency`.
    ///
    /// `Ok(None)` when no such entry exists in the ledger, or when it is
    /// still in its default state from this account's side.
    ///
    /// # Errors
    ///
    /// Fails on connection loss, timeout, or a protocol error other than
    /// `entryNotFound`.
    pub async fn trust_line(
        &self,
        account: &str,
        counterpart: &str,
        currency: &str,
    ) -> Result<Option<TrustLine>, CallError> {
        let command = Command::LedgerEntry {
            index: None,
            ripple_state: Some(RippleStateLookup {
                accounts: vec![account.to_owned(), counterpart.to_owned()],
                currency: currency.to_owned(),
            }),
            ledger_index: LedgerIndex::VALIDATED,
        };

        let entry: LedgerEntryResult = match self.call(command).await {
            Ok(entry) => entry,
            Err(CallError::Api(error)) if error.code == "entryNotFound" => return Ok(None),
            Err(error) => return Err(error),
        };

        let Some(node) = entry.node else { return Ok(None) };
        let state: RippleState = serde_json::from_value(node)?;
        Ok(trust_line(&state, account))
    }
}
