#[cfg(test)]
mod tests {
    use super::super::subscription::{parse_message, PubsubMessage};
    use super::super::transaction::build_record;
    use super::super::*;
    use crate::errors::WatchdogError;
    use crate::models::{Instruction, SystemTransfer};
    use serde_json::json;
    use solana_transaction_status::{
        EncodedConfirmedTransactionWithStatusMeta, UiInnerInstructions, UiInstruction,
    };

    const WALLET: &str = "9B1fR2Z38ggjqmFuhYBEsa7fXaBR1dkC7BamixjmWZb4";
    const OTHER: &str = "dUJNHh9Nm9rsn7ykTViG7N7BJuaoJJD9H635B8BVifa";
    const SIG: &str =
        "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

    fn transfer_ix(source: &str, destination: &str, lamports: serde_json::Value) -> serde_json::Value {
        json!({
            "program": "system",
            "programId": "11111111111111111111111111111111",
            "parsed": {
                "type": "transfer",
                "info": { "source": source, "destination": destination, "lamports": lamports }
            },
            "stackHeight": null
        })
    }

    fn instructions(raw: serde_json::Value) -> Vec<UiInstruction> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_build_record_with_inner_instructions() {
        let top = instructions(json!([
            { "programId": "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4", "accounts": [], "data": "3Bxs" },
            transfer_ix(OTHER, WALLET, json!(5))
        ]));
        let inner: Vec<UiInnerInstructions> = serde_json::from_value(json!([
            { "index": 0, "instructions": [transfer_ix(WALLET, OTHER, json!(2_000_000_000u64))] }
        ]))
        .unwrap();

        let record = build_record(SIG, &top, &inner, false, Some(1_700_000_000)).unwrap();
        assert_eq!(record.signature, SIG);
        assert_eq!(record.block_time, Some(1_700_000_000));
        assert!(!record.failed);
        assert_eq!(
            record.instructions,
            vec![
                Instruction::Other { program: "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4".to_string() },
                Instruction::SystemTransfer(SystemTransfer::new(OTHER, WALLET, 5)),
            ]
        );
        assert_eq!(
            record.inner_instructions,
            vec![vec![Instruction::SystemTransfer(SystemTransfer::new(WALLET, OTHER, 2_000_000_000))]]
        );
    }

    #[test]
    fn test_other_system_instructions_are_not_transfers() {
        let top = instructions(json!([{
            "program": "system",
            "programId": "11111111111111111111111111111111",
            "parsed": { "type": "createAccount", "info": { "lamports": 10 } }
        }]));
        let record = build_record(SIG, &top, &[], false, None).unwrap();
        assert_eq!(record.instructions, vec![Instruction::Other { program: "system".to_string() }]);
    }

    #[test]
    fn test_transfer_with_seed_is_a_transfer() {
        let top = instructions(json!([{
            "program": "system",
            "programId": "11111111111111111111111111111111",
            "parsed": {
                "type": "transferWithSeed",
                "info": { "source": WALLET, "sourceBase": WALLET, "sourceSeed": "s",
                          "sourceOwner": OTHER, "destination": OTHER, "lamports": 9 }
            }
        }]));
        let record = build_record(SIG, &top, &[], false, None).unwrap();
        assert_eq!(
            record.instructions,
            vec![Instruction::SystemTransfer(SystemTransfer::new(WALLET, OTHER, 9))]
        );
    }

    #[test]
    fn test_malformed_transfer_rejects_whole_record() {
        let negative = instructions(json!([
            transfer_ix(WALLET, OTHER, json!(1_000_000_000u64)),
            transfer_ix(WALLET, OTHER, json!(-4))
        ]));
        assert!(matches!(
            build_record(SIG, &negative, &[], false, None),
            Err(WatchdogError::MalformedRecord(_))
        ));

        let missing_source = instructions(json!([{
            "program": "system",
            "programId": "11111111111111111111111111111111",
            "parsed": { "type": "transfer", "info": { "destination": OTHER, "lamports": 1 } }
        }]));
        assert!(matches!(
            build_record(SIG, &missing_source, &[], false, None),
            Err(WatchdogError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_parse_full_rpc_result() {
        let raw = json!({
            "slot": 5208469,
            "blockTime": 1_700_000_000,
            "meta": {
                "err": { "InstructionError": [0, "InvalidArgument"] },
                "status": { "Err": { "InstructionError": [0, "InvalidArgument"] } },
                "fee": 5000,
                "preBalances": [],
                "postBalances": [],
                "innerInstructions": [
                    { "index": 0, "instructions": [transfer_ix(WALLET, OTHER, json!(7))] }
                ]
            },
            "transaction": {
                "signatures": [SIG],
                "message": {
                    "accountKeys": [],
                    "recentBlockhash": "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N",
                    "instructions": [transfer_ix(OTHER, WALLET, json!(3))]
                }
            }
        });
        let tx: EncodedConfirmedTransactionWithStatusMeta = serde_json::from_value(raw).unwrap();

        let record = parse_transaction(SIG, &tx).unwrap();
        assert!(record.failed);
        assert_eq!(record.block_time, Some(1_700_000_000));
        assert_eq!(record.instructions.len(), 1);
        assert_eq!(record.inner_instructions.len(), 1);
    }

    #[test]
    fn test_pubsub_subscription_confirmation() {
        let msg = parse_message(r#"{"jsonrpc":"2.0","result":24040,"id":1}"#).unwrap();
        assert_eq!(msg, PubsubMessage::Subscribed(24040));
    }

    #[test]
    fn test_pubsub_logs_notification() {
        let text = json!({
            "jsonrpc": "2.0",
            "method": "logsNotification",
            "params": {
                "result": {
                    "context": { "slot": 5208469 },
                    "value": { "signature": SIG, "err": null, "logs": [] }
                },
                "subscription": 24040
            }
        })
        .to_string();
        assert_eq!(parse_message(&text).unwrap(), PubsubMessage::Notification(SIG.to_string()));
    }

    #[test]
    fn test_pubsub_bad_signature_ignored() {
        let text = json!({
            "method": "logsNotification",
            "params": { "result": { "value": { "signature": "nope" } } }
        })
        .to_string();
        assert_eq!(parse_message(&text).unwrap(), PubsubMessage::Ignored);
        assert_eq!(parse_message("not json").unwrap(), PubsubMessage::Ignored);
    }

    #[test]
    fn test_pubsub_error_is_subscription_failure() {
        let text = r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid params"},"id":1}"#;
        assert!(matches!(parse_message(text), Err(WatchdogError::Subscription(_))));
    }
}
