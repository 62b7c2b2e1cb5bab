use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;

use crate::types::{RawInstruction, RawTransactionRecord, value_as_u64};

/// Substring matched against the parsed instruction type. Also matches
/// `createAccountWithSeed`.
pub const CREATE_ACCOUNT_KIND: &str = "createAccount";

/// The account-creation instruction that established an account's principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingEvent {
    pub created_account: String,
    pub amount_lamports: u64,
    pub block_time: Option<i64>,
}

/// Lookup from created-account identity to its funding event.
///
/// Built once per reconciliation pass. When several instructions create the
/// same identity, the first one in transaction order is kept.
#[derive(Debug, Clone, Default)]
pub struct FundingIndex {
    events: HashMap<String, FundingEvent>,
}

impl FundingIndex {
    pub fn build(transactions: &[Option<RawTransactionRecord>]) -> Self {
        let mut events = HashMap::new();

        let tagged = transactions.iter().flatten().flat_map(|tx| {
            tx.instructions
                .iter()
                .map(move |ix| (ix, tx.block_time, tx.slot))
        });

        for (ix, block_time, slot) in tagged {
            if !ix.kind().is_some_and(|k| k.contains(CREATE_ACCOUNT_KIND)) {
                continue;
            }
            let Some(event) = funding_event_from(ix, block_time) else {
                tracing::warn!(
                    slot,
                    kind = ix.kind().unwrap_or_default(),
                    "skipping createAccount instruction with malformed info"
                );
                continue;
            };
            match events.entry(event.created_account.clone()) {
                Entry::Vacant(slot_entry) => {
                    slot_entry.insert(event);
                }
                Entry::Occupied(existing) => {
                    tracing::debug!(
                        account = %existing.key(),
                        slot,
                        "duplicate createAccount ignored, earlier funding kept"
                    );
                }
            }
        }

        Self { events }
    }

    pub fn get(&self, account: &str) -> Option<&FundingEvent> {
        self.events.get(account)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn funding_event_from(ix: &RawInstruction, block_time: Option<i64>) -> Option<FundingEvent> {
    let created_account = ix.info_field("newAccount")?.as_str()?.to_string();
    let amount_lamports = value_as_u64(ix.info_field("lamports")?)?;
    Some(FundingEvent {
        created_account,
        amount_lamports,
        block_time,
    })
}
