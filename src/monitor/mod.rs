//! Transaction sources for a watched account
//!
//! Two channels feed the watchdog: a periodic poll of recent signatures
//! (`getSignaturesForAddress`) and a push subscription (`logsSubscribe`).
//! Both only announce signatures; full records are resolved separately with
//! `getTransaction`. The channels may overlap and may miss transactions, so
//! the consumer deduplicates.

mod rpc;
pub mod subscription;
pub mod transaction;
#[cfg(test)]
mod tests;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use tokio::sync::mpsc;

use crate::config::WatchdogConfig;
use crate::errors::{ErrorContext, ErrorExt, WatchdogError, WatchdogResult};
use crate::models::TransactionRecord;

pub use self::transaction::parse_transaction;

/// Where the watchdog gets transactions from.
///
/// Implementations must be safe to share between the poller, the push
/// reader and the record processor of a watch.
#[async_trait]
pub trait TransactionSource: Send + Sync + 'static {
    /// Most recent signatures mentioning `account`, newest first.
    async fn list_recent(&self, account: &Pubkey, limit: usize) -> WatchdogResult<Vec<String>>;

    /// Full record for `signature`, or `None` when the ledger does not have
    /// it (yet).
    async fn resolve(&self, signature: &str) -> WatchdogResult<Option<TransactionRecord>>;

    /// Push signatures of new transactions mentioning `account` into `sink`
    /// until the subscription ends.
    ///
    /// `Ok(())` is a clean close, `Err` a failure; callers reconnect in both
    /// cases.
    async fn subscribe(&self, account: &Pubkey, sink: mpsc::Sender<String>) -> WatchdogResult<()>;
}

/// [`TransactionSource`] backed by a Solana RPC node
pub struct SolanaRpcSource {
    client: RpcClient,
    ws_url: String,
}

impl SolanaRpcSource {
    /// Create a source for the endpoints in `config`.
    ///
    /// Every HTTP call is bounded by the configured fetch timeout.
    pub fn new(config: &WatchdogConfig) -> Self {
        Self::with_timeout(&config.rpc_http_url, &config.rpc_ws_url, config.fetch_timeout)
    }

    pub fn with_timeout(http_url: &str, ws_url: &str, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout(http_url.to_string(), timeout),
            ws_url: ws_url.to_string(),
        }
    }
}

#[async_trait]
impl TransactionSource for SolanaRpcSource {
    async fn list_recent(&self, account: &Pubkey, limit: usize) -> WatchdogResult<Vec<String>> {
        let signatures = rpc::get_signatures_for_address(&self.client, account, limit).await?;
        debug!("Poll returned {} signatures for {}", signatures.len(), account);
        Ok(signatures)
    }

    async fn resolve(&self, signature: &str) -> WatchdogResult<Option<TransactionRecord>> {
        let parsed = Signature::from_str(signature)
            .map_err(|e| WatchdogError::MalformedRecord(format!("{}: {}", signature, e)))?;
        match rpc::get_transaction(&self.client, &parsed).await? {
            Some(tx) => parse_transaction(signature, &tx)
                .with_context(ErrorContext::new("parser", "parse_transaction").details(signature))
                .map(Some),
            None => Ok(None),
        }
    }

    async fn subscribe(&self, account: &Pubkey, sink: mpsc::Sender<String>) -> WatchdogResult<()> {
        subscription::logs_subscribe(&self.ws_url, &account.to_string(), &sink).await
    }
}
