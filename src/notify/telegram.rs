//! Telegram Bot API delivery

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::Notifier;
use crate::constants::defaults::TELEGRAM_API_URL;
use crate::errors::{ErrorContext, ErrorExt, WatchdogError, WatchdogResult};
use crate::models::ReplyTarget;

/// Sends messages with the Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, timeout: Duration) -> WatchdogResult<Self> {
        Self::with_api_url(TELEGRAM_API_URL, bot_token, timeout)
    }

    /// Point the notifier at another Bot API server.
    pub fn with_api_url(api_url: &str, bot_token: &str, timeout: Duration) -> WatchdogResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .with_simple_context("notify", "build_client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), bot_token),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, reply_to: &ReplyTarget, text: &str) -> WatchdogResult<()> {
        let context = || ErrorContext::new("notify", "sendMessage").details(format!("chat {}", reply_to));

        let body = json!({
            "chat_id": reply_to.as_str(),
            "text": text,
            "disable_web_page_preview": true,
        });

        // Errors are built from the response only; the endpoint embeds the token
        let response: Value = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| WatchdogError::Notification(format!("{}: {}", context(), e.without_url())))?
            .json()
            .await
            .map_err(|e| WatchdogError::Notification(format!("{}: {}", context(), e.without_url())))?;

        if response.get("ok").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            let description = response
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("no description");
            Err(WatchdogError::Notification(format!("{}: {}", context(), description)))
        }
    }
}
