//! Ledger transactions as seen by the classifier

/// A fetched transaction.
///
/// Immutable once built; produced by the source adapter and consumed within
/// a single processing step.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// First signature of the transaction
    pub signature: String,
    /// Top-level instructions
    pub instructions: Vec<Instruction>,
    /// Inner instruction groups, one per invoking top-level instruction
    pub inner_instructions: Vec<Vec<Instruction>>,
    /// Block time (unix seconds), when the node reports one
    pub block_time: Option<i64>,
    /// The transaction executed with an error; none of its transfers happened
    pub failed: bool,
}

impl TransactionRecord {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            instructions: Vec::new(),
            inner_instructions: Vec::new(),
            block_time: None,
            failed: false,
        }
    }

    /// Every instruction of the transaction, top-level first, then each
    /// inner group in order.
    pub fn all_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .chain(self.inner_instructions.iter().flatten())
    }
}

/// A single instruction, tagged by the program that runs it.
///
/// Only system transfers carry data the watchdog uses; every other program
/// is kept as [`Instruction::Other`] so new kinds can be added without
/// touching dedup or timer logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    SystemTransfer(SystemTransfer),
    Other { program: String },
}

/// Lamports moved by the System program from `source` to `destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTransfer {
    pub source: String,
    pub destination: String,
    pub lamports: u64,
}

impl SystemTransfer {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, lamports: u64) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            lamports,
        }
    }
}
