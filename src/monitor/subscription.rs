//! `logsSubscribe` over the PubSub websocket

use std::str::FromStr;

use futures::{SinkExt, StreamExt};
use log::{debug, info};
use serde_json::{json, Value};
use solana_signature::Signature;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::constants::programs::COMMITMENT;
use crate::errors::{ErrorContext, ErrorExt, WatchdogError, WatchdogResult};

/// A decoded PubSub text frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PubsubMessage {
    /// Subscription confirmed with this id
    Subscribed(u64),
    /// A transaction mentioning the account was confirmed
    Notification(String),
    /// Anything else (notifications without a usable signature included)
    Ignored,
}

/// Stream signatures of transactions that mention `account` into `sink`.
///
/// Runs until the server closes the connection (`Ok`) or the transport
/// fails (`Err`). Dropping the returned future closes the socket.
pub async fn logs_subscribe(
    ws_url: &str,
    account: &str,
    sink: &mpsc::Sender<String>,
) -> WatchdogResult<()> {
    let context = || ErrorContext::new("subscription", "logsSubscribe").account(account);

    let (mut ws, _) = connect_async(ws_url).await.with_context(context())?;

    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "logsSubscribe",
        "params": [
            { "mentions": [account] },
            { "commitment": COMMITMENT }
        ]
    });
    ws.send(Message::Text(request.to_string()))
        .await
        .with_context(context())?;

    while let Some(frame) = ws.next().await {
        match frame.with_context(context())? {
            Message::Text(text) => match parse_message(&text)? {
                PubsubMessage::Subscribed(id) => {
                    info!("✅ Subscription {} confirmed for {}", id, account);
                }
                PubsubMessage::Notification(signature) => {
                    if sink.send(signature).await.is_err() {
                        // Nobody is consuming any more; the watch is gone
                        return Ok(());
                    }
                }
                PubsubMessage::Ignored => {}
            },
            Message::Ping(data) => {
                ws.send(Message::Pong(data)).await.with_context(context())?;
            }
            Message::Close(frame) => {
                debug!("Server closed subscription for {}: {:?}", account, frame);
                return Ok(());
            }
            _ => {}
        }
    }

    Ok(())
}

/// Decode one PubSub text frame.
///
/// An error object from the server is a subscription failure; frames that
/// are not JSON or do not carry a valid signature are ignored.
pub fn parse_message(text: &str) -> WatchdogResult<PubsubMessage> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            debug!("Ignoring non-JSON PubSub frame: {}", e);
            return Ok(PubsubMessage::Ignored);
        }
    };

    if let Some(error) = value.get("error") {
        return Err(WatchdogError::Subscription(format!("server rejected subscription: {}", error)));
    }

    if value.get("method").and_then(Value::as_str) == Some("logsNotification") {
        let signature = value
            .pointer("/params/result/value/signature")
            .and_then(Value::as_str)
            .filter(|s| Signature::from_str(s).is_ok());
        return Ok(match signature {
            Some(signature) => PubsubMessage::Notification(signature.to_string()),
            None => {
                debug!("Ignoring notification without a valid signature");
                PubsubMessage::Ignored
            }
        });
    }

    if let Some(id) = value.get("result").and_then(Value::as_u64) {
        return Ok(PubsubMessage::Subscribed(id));
    }

    Ok(PubsubMessage::Ignored)
}
