use serde::Serialize;

use crate::types::{RawInstruction, RawTransactionRecord, value_as_u64};

pub const TRANSFER_KIND: &str = "transfer";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// Which field a transfer volume was read from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum VolumeUnit {
    /// System transfer `lamports`.
    Lamports,
    /// SPL token transfer `amount`, in the mint's base units.
    TokenBaseUnits,
}

/// A transfer seen from the tracked address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    /// Amount moved, in `volume_unit`; negative when outgoing.
    /// `None` when the payload carried no usable amount.
    pub signed_volume: Option<i64>,
    /// Set exactly when `signed_volume` is.
    pub volume_unit: Option<VolumeUnit>,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub status: TransactionStatus,
}

/// Builds the transfer ledger for `tracked_address`.
///
/// Each transaction is represented by its first `transfer` instruction. Transactions
/// without one are dropped. Output order follows input order.
pub fn classify_transactions(
    transactions: &[Option<RawTransactionRecord>],
    tracked_address: &str,
) -> Vec<NormalizedTransaction> {
    transactions
        .iter()
        .flatten()
        .filter_map(|tx| classify_transaction(tx, tracked_address))
        .collect()
}

pub fn classify_transaction(
    tx: &RawTransactionRecord,
    tracked_address: &str,
) -> Option<NormalizedTransaction> {
    let transfer = tx
        .instructions
        .iter()
        .find(|ix| ix.kind() == Some(TRANSFER_KIND))?;

    let status = if tx.is_failed() {
        TransactionStatus::Failed
    } else {
        TransactionStatus::Success
    };
    let volume = signed_volume(transfer, tracked_address);

    Some(NormalizedTransaction {
        signed_volume: volume.map(|(amount, _)| amount),
        volume_unit: volume.map(|(_, unit)| unit),
        slot: tx.slot,
        block_time: tx.block_time,
        status,
    })
}

/// Transfer amount signed relative to `tracked_address`: positive when the
/// tracked address is the destination, negative otherwise.
pub fn signed_volume(
    transfer: &RawInstruction,
    tracked_address: &str,
) -> Option<(i64, VolumeUnit)> {
    let (amount, unit) = transfer_amount(transfer)?;
    let amount = i64::try_from(amount).unwrap_or(i64::MAX);
    let incoming = transfer
        .info_field("destination")
        .and_then(|v| v.as_str())
        == Some(tracked_address);
    Some((if incoming { amount } else { -amount }, unit))
}

/// `lamports` for system transfers, else the string-encoded `amount` of token
/// transfers. Zero and unparseable amounts count as absent.
pub fn transfer_amount(transfer: &RawInstruction) -> Option<(u64, VolumeUnit)> {
    let lamports = transfer
        .info_field("lamports")
        .and_then(value_as_u64)
        .filter(|v| *v != 0);
    if let Some(lamports) = lamports {
        return Some((lamports, VolumeUnit::Lamports));
    }
    transfer
        .info_field("amount")
        .and_then(value_as_u64)
        .filter(|v| *v != 0)
        .map(|amount| (amount, VolumeUnit::TokenBaseUnits))
}

/// Newest first; transactions with unknown block time go last. Stable.
pub fn sort_by_block_time_desc(ledger: &mut [NormalizedTransaction]) {
    ledger.sort_by(|a, b| b.block_time.cmp(&a.block_time));
}

/// Net signed SOL flow in lamports. Token transfers and unknown amounts are
/// left out.
pub fn net_transfer_volume(ledger: &[NormalizedTransaction]) -> i64 {
    let sum: i128 = ledger
        .iter()
        .filter(|t| t.volume_unit == Some(VolumeUnit::Lamports))
        .filter_map(|t| t.signed_volume)
        .map(i128::from)
        .sum();
    i64::try_from(sum).unwrap_or(if sum < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    const ME: &str = "Me11111111111111111111111111111111111111111";
    const THEM: &str = "Them111111111111111111111111111111111111111";

    fn ix(kind: &str, info: serde_json::Value) -> RawInstruction {
        RawInstruction {
            program_id: None,
            kind: Some(kind.to_string()),
            info: Some(info),
        }
    }

    fn sol_transfer(source: &str, destination: &str, lamports: u64) -> RawInstruction {
        ix(
            "transfer",
            serde_json::json!({
                "source": source,
                "destination": destination,
                "lamports": lamports,
            }),
        )
    }

    fn tx(slot: u64, block_time: Option<i64>, instructions: Vec<RawInstruction>) -> RawTransactionRecord {
        RawTransactionRecord {
            slot,
            block_time,
            instructions,
            err: None,
        }
    }

    #[test]
    fn status_roundtrip() {
        assert_eq!(
            "Success".parse::<TransactionStatus>().ok(),
            Some(TransactionStatus::Success)
        );
        assert_eq!(TransactionStatus::Failed.to_string(), "Failed");
        assert_eq!("Pending".parse::<TransactionStatus>().ok(), None);
    }

    #[test]
    fn incoming_transfer_is_positive() {
        let t = tx(1, Some(10), vec![sol_transfer(THEM, ME, 5_000)]);
        let out = classify_transaction(&t, ME).unwrap();
        assert_eq!(out.signed_volume, Some(5_000));
        assert_eq!(out.volume_unit, Some(VolumeUnit::Lamports));
        assert_eq!(out.status, TransactionStatus::Success);
    }

    #[test]
    fn outgoing_transfer_is_negative() {
        let t = tx(1, Some(10), vec![sol_transfer(ME, THEM, 5_000)]);
        let out = classify_transaction(&t, ME).unwrap();
        assert_eq!(out.signed_volume, Some(-5_000));
    }

    #[test]
    fn missing_destination_counts_as_outgoing() {
        let t = tx(1, None, vec![ix("transfer", serde_json::json!({"lamports": 7}))]);
        assert_eq!(classify_transaction(&t, ME).unwrap().signed_volume, Some(-7));
    }

    #[test]
    fn token_amount_string_is_coerced() {
        let t = tx(
            1,
            None,
            vec![ix(
                "transfer",
                serde_json::json!({"destination": ME, "amount": "12345", "authority": THEM}),
            )],
        );
        let out = classify_transaction(&t, ME).unwrap();
        assert_eq!(out.signed_volume, Some(12_345));
        assert_eq!(out.volume_unit, Some(VolumeUnit::TokenBaseUnits));
    }

    #[test]
    fn unusable_amount_fails_closed() {
        let cases = [
            serde_json::json!({"destination": ME}),
            serde_json::json!({"destination": ME, "amount": "lots"}),
            serde_json::json!({"destination": ME, "amount": "1.5"}),
            serde_json::json!({"destination": ME, "lamports": 0}),
        ];
        for info in cases {
            let t = tx(1, None, vec![ix("transfer", info.clone())]);
            let out = classify_transaction(&t, ME).unwrap();
            assert_eq!(out.signed_volume, None, "info {info}");
            assert_eq!(out.volume_unit, None, "info {info}");
        }
    }

    #[test]
    fn transactions_without_transfer_are_dropped() {
        let txs = vec![
            Some(tx(1, None, vec![ix("createAccount", serde_json::json!({}))])),
            Some(tx(2, None, vec![])),
            None,
            Some(tx(3, None, vec![RawInstruction::default()])),
            Some(tx(4, None, vec![ix("transferChecked", serde_json::json!({}))])),
        ];
        assert!(classify_transactions(&txs, ME).is_empty());
    }

    #[test]
    fn first_transfer_instruction_is_used() {
        let t = tx(
            1,
            None,
            vec![
                ix("createAccount", serde_json::json!({"lamports": 99})),
                sol_transfer(THEM, ME, 1),
                sol_transfer(ME, THEM, 1_000),
            ],
        );
        assert_eq!(classify_transaction(&t, ME).unwrap().signed_volume, Some(1));
    }

    #[test]
    fn failed_status_comes_from_err() {
        let mut t = tx(1, None, vec![sol_transfer(THEM, ME, 1)]);
        t.err = Some(serde_json::json!({"InstructionError": [0, "Custom"]}));
        assert_eq!(classify_transaction(&t, ME).unwrap().status, TransactionStatus::Failed);

        t.err = Some(serde_json::Value::Null);
        assert_eq!(classify_transaction(&t, ME).unwrap().status, TransactionStatus::Success);
    }

    #[test]
    fn classification_preserves_order_and_sort_is_newest_first() {
        let txs = vec![
            Some(tx(1, Some(100), vec![sol_transfer(THEM, ME, 1)])),
            Some(tx(2, None, vec![sol_transfer(THEM, ME, 2)])),
            Some(tx(3, Some(300), vec![sol_transfer(THEM, ME, 3)])),
        ];
        let mut ledger = classify_transactions(&txs, ME);
        let slots: Vec<u64> = ledger.iter().map(|t| t.slot).collect();
        assert_eq!(slots, vec![1, 2, 3]);

        sort_by_block_time_desc(&mut ledger);
        let slots: Vec<u64> = ledger.iter().map(|t| t.slot).collect();
        assert_eq!(slots, vec![3, 1, 2]);
    }

    #[test]
    fn net_volume_skips_unknown_amounts() {
        let ledger = vec![
            NormalizedTransaction {
                signed_volume: Some(10),
                volume_unit: Some(VolumeUnit::Lamports),
                slot: 1,
                block_time: None,
                status: TransactionStatus::Success,
            },
            NormalizedTransaction {
                signed_volume: None,
                volume_unit: None,
                slot: 2,
                block_time: None,
                status: TransactionStatus::Success,
            },
            NormalizedTransaction {
                signed_volume: Some(-4),
                volume_unit: Some(VolumeUnit::Lamports),
                slot: 3,
                block_time: None,
                status: TransactionStatus::Failed,
            },
        ];
        assert_eq!(net_transfer_volume(&ledger), 6);
    }

    #[test]
    fn net_volume_counts_only_lamport_transfers() {
        let token_in = ix(
            "transfer",
            serde_json::json!({"source": THEM, "destination": ME, "amount": "5000000000"}),
        );
        let txs = vec![
            Some(tx(1, Some(10), vec![sol_transfer(THEM, ME, 1_000_000_000)])),
            Some(tx(2, Some(20), vec![token_in])),
            Some(tx(3, Some(30), vec![sol_transfer(ME, THEM, 250_000_000)])),
        ];
        let ledger = classify_transactions(&txs, ME);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger[1].signed_volume, Some(5_000_000_000));
        assert_eq!(net_transfer_volume(&ledger), 750_000_000);
    }
}
