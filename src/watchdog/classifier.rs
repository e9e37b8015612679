//! Extraction of qualifying transfers from a transaction

use crate::config::{WatchDirection, WatchdogConfig};
use crate::models::{Direction, Instruction, QualifyingTransfer, TransactionRecord, WatchTarget};

/// Direction and size criteria for a qualifying transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFilter {
    pub threshold_lamports: u64,
    pub direction: WatchDirection,
}

impl TransferFilter {
    pub fn new(threshold_lamports: u64, direction: WatchDirection) -> Self {
        Self {
            threshold_lamports,
            direction,
        }
    }

    pub fn from_config(config: &WatchdogConfig) -> Self {
        Self::new(config.threshold_lamports, config.direction)
    }

    /// All qualifying transfers of `record` for `target`.
    ///
    /// Scans top-level instructions and every inner group, so transfers made
    /// through another program are found too. A transfer from the target to
    /// itself counts as outbound. Failed transactions yield nothing.
    pub fn classify(&self, record: &TransactionRecord, target: &WatchTarget) -> Vec<QualifyingTransfer> {
        if record.failed {
            return Vec::new();
        }

        let account = target.account();
        record
            .all_instructions()
            .filter_map(|ix| match ix {
                Instruction::SystemTransfer(transfer) => Some(transfer),
                Instruction::Other { .. } => None,
            })
            .filter_map(|transfer| {
                let (direction, counterparty) = if transfer.source == account {
                    (Direction::Outbound, &transfer.destination)
                } else if transfer.destination == account {
                    (Direction::Inbound, &transfer.source)
                } else {
                    return None;
                };

                if !self.direction.includes(direction) || transfer.lamports < self.threshold_lamports {
                    return None;
                }

                Some(QualifyingTransfer {
                    signature: record.signature.clone(),
                    direction,
                    counterparty: counterparty.clone(),
                    lamports: transfer.lamports,
                    observed_at: record.block_time,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReplyTarget, SystemTransfer};

    const WALLET: &str = "9B1fR2Z38ggjqmFuhYBEsa7fXaBR1dkC7BamixjmWZb4";
    const OTHER: &str = "dUJNHh9Nm9rsn7ykTViG7N7BJuaoJJD9H635B8BVifa";
    const THIRD: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
    const HALF_SOL: u64 = 500_000_000;

    fn target() -> WatchTarget {
        WatchTarget::new(WALLET, ReplyTarget::new("chat")).unwrap()
    }

    fn transfer(source: &str, destination: &str, lamports: u64) -> Instruction {
        Instruction::SystemTransfer(SystemTransfer::new(source, destination, lamports))
    }

    fn record_with(instructions: Vec<Instruction>) -> TransactionRecord {
        let mut record = TransactionRecord::new("sig");
        record.instructions = instructions;
        record
    }

    #[test]
    fn test_threshold_boundary() {
        let filter = TransferFilter::new(HALF_SOL, WatchDirection::Both);

        let exact = record_with(vec![transfer(WALLET, OTHER, HALF_SOL)]);
        assert_eq!(filter.classify(&exact, &target()).len(), 1);

        let below = record_with(vec![transfer(WALLET, OTHER, HALF_SOL - 1)]);
        assert!(filter.classify(&below, &target()).is_empty());
    }

    #[test]
    fn test_direction() {
        let filter = TransferFilter::new(HALF_SOL, WatchDirection::Both);

        let out = filter.classify(&record_with(vec![transfer(WALLET, OTHER, HALF_SOL)]), &target());
        assert_eq!(out[0].direction, Direction::Outbound);
        assert_eq!(out[0].counterparty, OTHER);

        let inbound = filter.classify(&record_with(vec![transfer(OTHER, WALLET, HALF_SOL)]), &target());
        assert_eq!(inbound[0].direction, Direction::Inbound);
        assert_eq!(inbound[0].counterparty, OTHER);

        let unrelated = filter.classify(&record_with(vec![transfer(OTHER, THIRD, HALF_SOL * 10)]), &target());
        assert!(unrelated.is_empty());
    }

    #[test]
    fn test_direction_filter() {
        let outbound_only = TransferFilter::new(HALF_SOL, WatchDirection::Outbound);
        let inbound = record_with(vec![transfer(OTHER, WALLET, HALF_SOL)]);
        assert!(outbound_only.classify(&inbound, &target()).is_empty());

        let inbound_only = TransferFilter::new(HALF_SOL, WatchDirection::Inbound);
        assert_eq!(inbound_only.classify(&inbound, &target()).len(), 1);
    }

    #[test]
    fn test_nested_transfer_detected() {
        let filter = TransferFilter::new(HALF_SOL, WatchDirection::Both);
        let mut record = record_with(vec![Instruction::Other { program: THIRD.to_string() }]);
        record.inner_instructions = vec![vec![transfer(WALLET, OTHER, HALF_SOL * 2)]];
        record.block_time = Some(1_700_000_000);

        let found = filter.classify(&record, &target());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].lamports, HALF_SOL * 2);
        assert_eq!(found[0].observed_at, Some(1_700_000_000));
    }

    #[test]
    fn test_batched_payout_yields_many() {
        let filter = TransferFilter::new(HALF_SOL, WatchDirection::Outbound);
        let record = record_with(vec![
            transfer(WALLET, OTHER, HALF_SOL),
            transfer(WALLET, THIRD, HALF_SOL / 2),
            transfer(WALLET, THIRD, HALF_SOL * 3),
        ]);
        let found = filter.classify(&record, &target());
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.signature == "sig"));
    }

    #[test]
    fn test_failed_transaction_never_qualifies() {
        let filter = TransferFilter::new(0, WatchDirection::Both);
        let mut record = record_with(vec![transfer(WALLET, OTHER, HALF_SOL)]);
        record.failed = true;
        assert!(filter.classify(&record, &target()).is_empty());
    }

    #[test]
    fn test_self_transfer_is_outbound() {
        let filter = TransferFilter::new(0, WatchDirection::Both);
        let found = filter.classify(&record_with(vec![transfer(WALLET, WALLET, 1)]), &target());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].direction, Direction::Outbound);
    }
}
