//! Error handling for the wallet watchdog.
//!
//! Every fallible operation in the crate returns [`WatchdogResult`]. Most of
//! these errors are absorbed by the running watchdog (a failed fetch skips a
//! record, a dropped subscription is reconnected, a failed delivery is only
//! logged); only configuration and account-selection errors reach a caller.

use std::fmt;
use thiserror::Error;

/// Main error type for the watchdog.
#[derive(Error, Debug)]
pub enum WatchdogError {
    /// Invalid or missing configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested watch target could not be parsed or is not allowed.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// JSON-RPC call failed or returned an error object.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The push subscription failed to open or broke while streaming.
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// A fetched transaction did not have the expected shape.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A bounded call did not complete in time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Outbound message delivery failed.
    #[error("Notification error: {0}")]
    Notification(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fallback for other errors that don't fit into the above categories.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias for the watchdog.
pub type WatchdogResult<T> = Result<T, WatchdogError>;

/// Context information for errors.
///
/// Records which account was being watched, and which component and
/// operation were running when the error happened.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Account being watched, if applicable.
    pub account: Option<String>,

    /// Component where the error occurred (e.g., "rpc").
    pub component: String,

    /// Operation being performed (e.g., "getTransaction").
    pub operation: String,

    /// Additional details, such as a signature.
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            account: None,
            component: component.to_string(),
            operation: operation.to_string(),
            details: None,
        }
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "In {} while {}", self.component, self.operation)?;
        if let Some(account) = &self.account {
            write!(f, " for account {}", account)?;
        }
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorExt<T> {
    /// Add context to an error, converting it into a [`WatchdogError`].
    ///
    /// Errors that already are a `WatchdogError` keep their variant and gain
    /// the context in their message; foreign errors are classified by the
    /// component that produced them.
    fn with_context(self, context: ErrorContext) -> WatchdogResult<T>;

    /// Add component and operation context to an error.
    fn with_simple_context(self, component: &str, operation: &str) -> WatchdogResult<T>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context(self, context: ErrorContext) -> WatchdogResult<T> {
        self.map_err(|e| {
            let error_msg = format!("{}: {}", context, e);
            let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
            match boxed.downcast::<WatchdogError>() {
                Ok(inner) => inner.prepend(&context),
                Err(_) => match context.component.as_str() {
                    "rpc" => WatchdogError::Rpc(error_msg),
                    "subscription" => WatchdogError::Subscription(error_msg),
                    "notify" => WatchdogError::Notification(error_msg),
                    "parser" => WatchdogError::MalformedRecord(error_msg),
                    "config" => WatchdogError::Config(error_msg),
                    _ => WatchdogError::Unknown(error_msg),
                },
            }
        })
    }

    fn with_simple_context(self, component: &str, operation: &str) -> WatchdogResult<T> {
        self.with_context(ErrorContext::new(component, operation))
    }
}

impl WatchdogError {
    /// Prefix the message of a string-carrying variant with `context`.
    fn prepend(self, context: &ErrorContext) -> Self {
        let wrap = |msg: String| format!("{}: {}", context, msg);
        match self {
            WatchdogError::Config(m) => WatchdogError::Config(wrap(m)),
            WatchdogError::InvalidAccount(m) => WatchdogError::InvalidAccount(wrap(m)),
            WatchdogError::Rpc(m) => WatchdogError::Rpc(wrap(m)),
            WatchdogError::Subscription(m) => WatchdogError::Subscription(wrap(m)),
            WatchdogError::MalformedRecord(m) => WatchdogError::MalformedRecord(wrap(m)),
            WatchdogError::Timeout(m) => WatchdogError::Timeout(wrap(m)),
            WatchdogError::Notification(m) => WatchdogError::Notification(wrap(m)),
            WatchdogError::Unknown(m) => WatchdogError::Unknown(wrap(m)),
            other => other,
        }
    }

    /// Whether retrying the same request later may succeed.
    ///
    /// A malformed record stays malformed, so it is not transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WatchdogError::Rpc(_) | WatchdogError::Timeout(_) | WatchdogError::Http(_) | WatchdogError::Json(_)
        )
    }
}
