//! The account under observation and where its alerts go

use std::fmt;
use std::str::FromStr;

use solana_pubkey::Pubkey;

use crate::errors::{WatchdogError, WatchdogResult};

/// Opaque handle used to route outbound messages (a chat id for Telegram).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplyTarget(String);

impl ReplyTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReplyTarget {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ReplyTarget {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An account selected for watching, together with its reply target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pubkey: Pubkey,
    account: String,
    reply_to: ReplyTarget,
}

impl WatchTarget {
    /// Build a target from a base58 account address.
    ///
    /// Fails with [`WatchdogError::InvalidAccount`] when the address does not
    /// decode to a public key.
    pub fn new(account: &str, reply_to: ReplyTarget) -> WatchdogResult<Self> {
        let account = account.trim();
        let pubkey = Pubkey::from_str(account)
            .map_err(|e| WatchdogError::InvalidAccount(format!("{}: {}", account, e)))?;

        Ok(Self {
            pubkey,
            account: pubkey.to_string(),
            reply_to,
        })
    }

    pub fn pubkey(&self) -> &Pubkey {
        &self.pubkey
    }

    /// Base58 form of the account, as it appears in parsed instructions
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn reply_to(&self) -> &ReplyTarget {
        &self.reply_to
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account)
    }
}
