#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::errors::WatchdogError;

    const WALLET: &str = "9B1fR2Z38ggjqmFuhYBEsa7fXaBR1dkC7BamixjmWZb4";

    #[test]
    fn test_watch_target_parses_base58() {
        let target = WatchTarget::new(&format!("  {}\n", WALLET), ReplyTarget::new("42")).unwrap();
        assert_eq!(target.account(), WALLET);
        assert_eq!(target.reply_to().as_str(), "42");
        assert_eq!(target.pubkey().to_string(), WALLET);
    }

    #[test]
    fn test_watch_target_rejects_garbage() {
        let result = WatchTarget::new("not-a-wallet", ReplyTarget::new("42"));
        assert!(matches!(result, Err(WatchdogError::InvalidAccount(_))));
    }

    #[test]
    fn test_all_instructions_walks_inner_groups() {
        let mut record = TransactionRecord::new("sig");
        record.instructions.push(Instruction::Other { program: "spl-token".to_string() });
        record.inner_instructions.push(vec![Instruction::SystemTransfer(SystemTransfer::new(
            "a", "b", 7,
        ))]);
        record.inner_instructions.push(vec![Instruction::Other { program: "vote".to_string() }]);

        let all: Vec<_> = record.all_instructions().collect();
        assert_eq!(all.len(), 3);
        assert!(matches!(all[1], Instruction::SystemTransfer(t) if t.lamports == 7));
    }

    #[test]
    fn test_transfer_sol_conversion() {
        let transfer = QualifyingTransfer {
            signature: "sig".to_string(),
            direction: Direction::Outbound,
            counterparty: "b".to_string(),
            lamports: 1_500_000_000,
            observed_at: None,
        };
        assert!((transfer.sol() - 1.5).abs() < f64::EPSILON);
        assert_eq!(transfer.direction.to_string(), "outbound");
    }
}
