//! Constants used throughout the watchdog

pub mod defaults;
pub mod programs;

/// Number of lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
