//! RPC client interactions for the watched account

use std::str::FromStr;

use log::debug;
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_commitment_config::CommitmentConfig;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};

use crate::errors::{ErrorContext, ErrorExt, WatchdogResult};

/// Fetch the most recent signatures that mention `account`, newest first.
///
/// Entries that are not valid transaction signatures are dropped.
pub async fn get_signatures_for_address(
    client: &RpcClient,
    account: &Pubkey,
    limit: usize,
) -> WatchdogResult<Vec<String>> {
    let config = GetConfirmedSignaturesForAddress2Config {
        limit: Some(limit),
        commitment: Some(CommitmentConfig::confirmed()),
        ..Default::default()
    };
    let entries = client
        .get_signatures_for_address_with_config(account, config)
        .await
        .with_context(ErrorContext::new("rpc", "getSignaturesForAddress").account(account.to_string()))?;

    let signatures = entries
        .into_iter()
        .filter_map(|entry| match Signature::from_str(&entry.signature) {
            Ok(_) => Some(entry.signature),
            Err(_) => {
                debug!("Skipping malformed signature from poll: {}", entry.signature);
                None
            }
        })
        .collect();

    Ok(signatures)
}

/// Fetch a transaction in `jsonParsed` encoding.
///
/// Returns `Ok(None)` while the node does not know the transaction yet. The
/// request goes through `send` rather than `get_transaction_with_config`,
/// which reports a `null` result as a deserialization error.
pub async fn get_transaction(
    client: &RpcClient,
    signature: &Signature,
) -> WatchdogResult<Option<EncodedConfirmedTransactionWithStatusMeta>> {
    let config = RpcTransactionConfig {
        encoding: Some(UiTransactionEncoding::JsonParsed),
        commitment: Some(CommitmentConfig::confirmed()),
        max_supported_transaction_version: Some(0),
    };
    client
        .send::<Option<EncodedConfirmedTransactionWithStatusMeta>>(
            RpcRequest::GetTransaction,
            json!([signature.to_string(), config]),
        )
        .await
        .with_context(ErrorContext::new("rpc", "getTransaction").details(signature.to_string()))
}
