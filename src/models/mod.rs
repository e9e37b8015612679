//! Data model for the watched account and the records observed for it

pub mod target;
pub mod transaction;
pub mod transfer;
#[cfg(test)]
mod tests;

pub use self::target::{ReplyTarget, WatchTarget};
pub use self::transaction::{Instruction, SystemTransfer, TransactionRecord};
pub use self::transfer::{Direction, QualifyingTransfer};
