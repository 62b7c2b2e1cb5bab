//! Decoding of the ledger's JSON-RPC `jsonParsed` responses into raw records.

use serde_json::Value;

use crate::error::Error;
use crate::types::{RawInstruction, RawStakeAccount, RawTransactionRecord, RewardEntry, value_as_u64};

/// Owner of every stake account.
pub const STAKE_PROGRAM_ID: &str = "Stake11111111111111111111111111111111111111";

/// Byte offset of the withdraw authority in stake account data, used as the
/// `memcmp` filter when listing accounts owned by an address.
pub const STAKE_WITHDRAWER_OFFSET: usize = 44;

fn payload_err(reason: impl Into<String>) -> Error {
    Error::Payload {
        reason: reason.into(),
    }
}

/// Decodes one element of a `getParsedProgramAccounts` result.
pub fn parse_stake_account(value: &Value) -> Result<RawStakeAccount, Error> {
    let pubkey = value
        .get("pubkey")
        .and_then(Value::as_str)
        .ok_or_else(|| payload_err("stake account missing pubkey"))?
        .to_string();
    let account = value
        .get("account")
        .ok_or_else(|| payload_err(format!("stake account {pubkey} missing account")))?;
    let lamports = account
        .get("lamports")
        .and_then(Value::as_u64)
        .ok_or_else(|| payload_err(format!("stake account {pubkey} missing lamports")))?;
    let rent_epoch = account.get("rentEpoch").and_then(value_as_u64);
    let activation_epoch = account
        .pointer("/data/parsed/info/stake/delegation/activationEpoch")
        .and_then(value_as_u64);

    Ok(RawStakeAccount {
        pubkey,
        activation_epoch,
        rent_epoch,
        lamports,
    })
}

/// Decodes a program-accounts array; malformed elements are logged and skipped.
pub fn parse_stake_accounts(value: &Value) -> Result<Vec<RawStakeAccount>, Error> {
    let arr = value
        .as_array()
        .ok_or_else(|| payload_err("program accounts is not an array"))?;

    Ok(arr
        .iter()
        .filter_map(|item| match parse_stake_account(item) {
            Ok(account) => Some(account),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed stake account");
                None
            }
        })
        .collect())
}

/// Decodes one `getParsedTransaction` result. JSON `null` decodes to `None`.
pub fn parse_transaction(value: &Value) -> Result<Option<RawTransactionRecord>, Error> {
    if value.is_null() {
        return Ok(None);
    }

    let slot = value
        .get("slot")
        .and_then(Value::as_u64)
        .ok_or_else(|| payload_err("transaction missing slot"))?;
    let block_time = value.get("blockTime").and_then(Value::as_i64);
    let err = value
        .pointer("/meta/err")
        .filter(|e| !e.is_null())
        .cloned();
    let instructions = value
        .pointer("/transaction/message/instructions")
        .and_then(Value::as_array)
        .ok_or_else(|| payload_err(format!("transaction at slot {slot} missing instructions")))?
        .iter()
        .map(parse_instruction)
        .collect();

    Ok(Some(RawTransactionRecord {
        slot,
        block_time,
        instructions,
        err,
    }))
}

/// Decodes a batch of transactions, positionally. Malformed entries become `None`.
pub fn parse_transaction_history(value: &Value) -> Result<Vec<Option<RawTransactionRecord>>, Error> {
    let arr = value
        .as_array()
        .ok_or_else(|| payload_err("transaction history is not an array"))?;

    Ok(arr
        .iter()
        .map(|item| {
            parse_transaction(item).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "skipping malformed transaction");
                None
            })
        })
        .collect())
}

/// Parsed instructions carry `{type, info}` under `parsed`; some programs
/// (e.g. memo) put a bare string there, and unparsed ones have no `parsed`.
fn parse_instruction(value: &Value) -> RawInstruction {
    let program_id = value
        .get("programId")
        .and_then(Value::as_str)
        .map(String::from);
    let parsed = value.get("parsed").filter(|p| p.is_object());
    RawInstruction {
        program_id,
        kind: parsed
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
            .map(String::from),
        info: parsed.and_then(|p| p.get("info")).cloned(),
    }
}

/// Decodes a `getInflationReward` result: one reward-or-null per requested address.
pub fn parse_inflation_rewards(value: &Value) -> Result<Vec<Option<RewardEntry>>, Error> {
    let arr = value
        .as_array()
        .ok_or_else(|| payload_err("inflation rewards is not an array"))?;

    arr.iter()
        .map(|item| -> Result<Option<RewardEntry>, Error> {
            if item.is_null() {
                Ok(None)
            } else {
                Ok(Some(serde_json::from_value(item.clone())?))
            }
        })
        .collect()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn stake_json(pubkey: &str, lamports: u64) -> Value {
        serde_json::json!({
            "pubkey": pubkey,
            "account": {
                "lamports": lamports,
                "owner": STAKE_PROGRAM_ID,
                "rentEpoch": 18_446_744_073_709_551_615_u64,
                "executable": false,
                "space": 200,
                "data": {
                    "program": "stake",
                    "space": 200,
                    "parsed": {
                        "type": "delegated",
                        "info": {
                            "meta": {
                                "rentExemptReserve": "2282880",
                                "authorized": {"staker": "owner", "withdrawer": "owner"}
                            },
                            "stake": {
                                "delegation": {
                                    "voter": "vote",
                                    "stake": "1997717120",
                                    "activationEpoch": "512",
                                    "deactivationEpoch": "18446744073709551615"
                                },
                                "creditsObserved": 1
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn decodes_delegated_stake_account() {
        let account = parse_stake_account(&stake_json("A", 2_000_000_000)).unwrap();
        assert_eq!(
            account,
            RawStakeAccount {
                pubkey: "A".to_string(),
                activation_epoch: Some(512),
                rent_epoch: Some(u64::MAX),
                lamports: 2_000_000_000,
            }
        );
    }

    #[test]
    fn initialized_stake_has_no_activation_epoch() {
        let value = serde_json::json!({
            "pubkey": "I",
            "account": {"lamports": 5, "data": {"parsed": {"type": "initialized", "info": {}}}}
        });
        let account = parse_stake_account(&value).unwrap();
        assert_eq!(account.activation_epoch, None);
        assert_eq!(account.rent_epoch, None);
    }

    #[test]
    fn stake_list_skips_malformed_entries() {
        let value = serde_json::json!([
            stake_json("A", 1),
            {"pubkey": "B"},
            {"account": {"lamports": 3}},
            stake_json("C", 2)
        ]);
        let accounts = parse_stake_accounts(&value).unwrap();
        let keys: Vec<&str> = accounts.iter().map(|a| a.pubkey.as_str()).collect();
        assert_eq!(keys, vec!["A", "C"]);
        assert!(parse_stake_accounts(&serde_json::json!({})).is_err());
    }

    #[test]
    fn decodes_parsed_transaction() {
        let value = serde_json::json!({
            "slot": 250_000_000_u64,
            "blockTime": 1_700_000_000_i64,
            "meta": {"err": null, "fee": 5000},
            "transaction": {
                "signatures": ["sig"],
                "message": {
                    "instructions": [
                        {
                            "program": "system",
                            "programId": "11111111111111111111111111111111",
                            "parsed": {
                                "type": "createAccount",
                                "info": {"newAccount": "A", "lamports": 1_000, "source": "me"}
                            }
                        },
                        {
                            "program": "spl-memo",
                            "programId": "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr",
                            "parsed": "hello"
                        },
                        {
                            "programId": "Vote111111111111111111111111111111111111111",
                            "accounts": [],
                            "data": "3Bxs"
                        }
                    ]
                }
            }
        });
        let tx = parse_transaction(&value).unwrap().unwrap();
        assert_eq!(tx.slot, 250_000_000);
        assert_eq!(tx.block_time, Some(1_700_000_000));
        assert!(!tx.is_failed());
        assert_eq!(tx.instructions.len(), 3);
        assert_eq!(tx.instructions[0].kind(), Some("createAccount"));
        assert_eq!(
            tx.instructions[0].info_field("newAccount").and_then(Value::as_str),
            Some("A")
        );
        assert_eq!(tx.instructions[1].kind(), None);
        assert_eq!(tx.instructions[2].info, None);
    }

    #[test]
    fn failed_transaction_keeps_err() {
        let value = serde_json::json!({
            "slot": 1,
            "blockTime": null,
            "meta": {"err": {"InstructionError": [0, {"Custom": 1}]}},
            "transaction": {"message": {"instructions": []}}
        });
        let tx = parse_transaction(&value).unwrap().unwrap();
        assert!(tx.is_failed());
        assert_eq!(tx.block_time, None);
    }

    #[test]
    fn history_maps_nulls_and_malformed_to_none() {
        let value = serde_json::json!([
            null,
            {"slot": 1, "transaction": {"message": {"instructions": []}}},
            {"blockTime": 4}
        ]);
        let history = parse_transaction_history(&value).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[0].is_none());
        assert!(history[1].is_some());
        assert!(history[2].is_none());
    }

    #[test]
    fn decodes_inflation_rewards() {
        let value = serde_json::json!([
            {"epoch": 600, "effectiveSlot": 259_200_000_u64, "amount": 2_500_000, "postBalance": 2_002_500_000_u64, "commission": 8},
            null
        ]);
        let rewards = parse_inflation_rewards(&value).unwrap();
        assert_eq!(
            rewards,
            vec![
                Some(RewardEntry {
                    epoch: 600,
                    effective_slot: 259_200_000,
                    amount: 2_500_000,
                    post_balance: 2_002_500_000,
                    commission: Some(8),
                }),
                None
            ]
        );
    }

    #[test]
    fn malformed_reward_is_an_error() {
        let value = serde_json::json!([{"epoch": "six hundred"}]);
        assert!(matches!(parse_inflation_rewards(&value), Err(Error::Json(_))));
    }
}
