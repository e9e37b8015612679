//! Qualifying transfers derived from a transaction

use std::fmt;

use serde::Serialize;

use crate::constants::LAMPORTS_PER_SOL;

/// Direction of a transfer relative to the watched account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// A transfer that met the direction and size criteria of the watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifyingTransfer {
    pub signature: String,
    pub direction: Direction,
    /// The other side of the transfer
    pub counterparty: String,
    pub lamports: u64,
    /// Block time of the transaction (unix seconds), if known
    pub observed_at: Option<i64>,
}

impl QualifyingTransfer {
    /// Amount in SOL
    pub fn sol(&self) -> f64 {
        self.lamports as f64 / LAMPORTS_PER_SOL as f64
    }
}
