//! Program names and instruction types as reported by `jsonParsed` encoding

/// Program name the RPC node uses for the native System program
pub const SYSTEM_PROGRAM: &str = "system";

/// Parsed instruction types that move lamports between two accounts
pub const SYSTEM_TRANSFER_TYPES: &[&str] = &["transfer", "transferWithSeed"];

/// Commitment used for PubSub requests
pub const COMMITMENT: &str = "confirmed";
