//! Conversion of `jsonParsed` transactions into [`TransactionRecord`]s

use serde::Deserialize;
use solana_sdk_ids::system_program;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInnerInstructions, UiInstruction,
    UiMessage, UiParsedInstruction,
};

use crate::constants::programs::{SYSTEM_PROGRAM, SYSTEM_TRANSFER_TYPES};
use crate::errors::{WatchdogError, WatchdogResult};
use crate::models::{Instruction, SystemTransfer, TransactionRecord};

/// `info` object of a parsed System transfer
#[derive(Debug, Deserialize)]
struct TransferInfo {
    source: String,
    destination: String,
    lamports: u64,
}

/// Parse the result of a `getTransaction` call.
///
/// A record is either parsed completely or rejected: a system transfer with
/// a missing field or a non-integer amount fails the whole record, so the
/// classifier never sees a partial transaction.
pub fn parse_transaction(
    signature: &str,
    tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> WatchdogResult<TransactionRecord> {
    let instructions = match &tx.transaction.transaction {
        EncodedTransaction::Json(ui) => match &ui.message {
            UiMessage::Parsed(message) => &message.instructions,
            UiMessage::Raw(_) => return Err(malformed(signature, "message is not jsonParsed")),
        },
        _ => return Err(malformed(signature, "transaction is not JSON encoded")),
    };

    let meta = tx.transaction.meta.as_ref();
    let failed = meta.map_or(false, |m| m.err.is_some());
    let inner: Vec<UiInnerInstructions> = meta
        .and_then(|m| Option::<Vec<UiInnerInstructions>>::from(m.inner_instructions.clone()))
        .unwrap_or_default();

    build_record(signature, instructions, &inner, failed, tx.block_time)
}

/// Assemble a record from already decoded parts.
pub fn build_record(
    signature: &str,
    instructions: &[UiInstruction],
    inner: &[UiInnerInstructions],
    failed: bool,
    block_time: Option<i64>,
) -> WatchdogResult<TransactionRecord> {
    let mut record = TransactionRecord::new(signature);
    record.instructions = parse_instructions(signature, instructions)?;
    for group in inner {
        record
            .inner_instructions
            .push(parse_instructions(signature, &group.instructions)?);
    }
    record.failed = failed;
    record.block_time = block_time;
    Ok(record)
}

fn parse_instructions(signature: &str, raw: &[UiInstruction]) -> WatchdogResult<Vec<Instruction>> {
    raw.iter().map(|ix| parse_instruction(signature, ix)).collect()
}

fn parse_instruction(signature: &str, ix: &UiInstruction) -> WatchdogResult<Instruction> {
    let parsed = match ix {
        UiInstruction::Parsed(UiParsedInstruction::Parsed(parsed)) => parsed,
        UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(decoded)) => {
            return Ok(Instruction::Other {
                program: decoded.program_id.clone(),
            });
        }
        UiInstruction::Compiled(_) => {
            return Ok(Instruction::Other {
                program: "unknown".to_string(),
            });
        }
    };

    let is_system = parsed.program == SYSTEM_PROGRAM || parsed.program_id == system_program::ID.to_string();
    let kind = parsed.parsed.get("type").and_then(|t| t.as_str()).unwrap_or_default();
    if is_system && SYSTEM_TRANSFER_TYPES.contains(&kind) {
        let info = parsed
            .parsed
            .get("info")
            .cloned()
            .ok_or_else(|| malformed(signature, "transfer without info"))?;
        let info: TransferInfo = serde_json::from_value(info)
            .map_err(|e| malformed(signature, &format!("bad transfer info: {}", e)))?;
        return Ok(Instruction::SystemTransfer(SystemTransfer::new(
            info.source,
            info.destination,
            info.lamports,
        )));
    }

    Ok(Instruction::Other {
        program: parsed.program.clone(),
    })
}

fn malformed(signature: &str, reason: &str) -> WatchdogError {
    WatchdogError::MalformedRecord(format!("{}: {}", signature, reason))
}
