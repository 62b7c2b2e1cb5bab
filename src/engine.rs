use serde::Serialize;

use crate::ledger::{self, NormalizedTransaction};
use crate::portfolio::PortfolioTotals;
use crate::stake::{self, EnrichedStakeRecord, FundingIndex};
use crate::types::{RawStakeAccount, RawTransactionRecord};

/// Everything the dashboard derives from one stake fetch plus one history fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// One per input stake account, in input order.
    pub stakes: Vec<EnrichedStakeRecord>,
    /// Transfer ledger, in input order.
    pub transactions: Vec<NormalizedTransaction>,
    pub totals: PortfolioTotals,
}

impl Reconciliation {
    /// Re-sorts both tables newest first for presentation. Totals are unaffected.
    pub fn sorted_for_display(mut self) -> Self {
        stake::sort_by_block_time_desc(&mut self.stakes);
        ledger::sort_by_block_time_desc(&mut self.transactions);
        self
    }

    pub fn net_transfer_volume(&self) -> i64 {
        ledger::net_transfer_volume(&self.transactions)
    }
}

/// Runs the full pipeline: index funding instructions once, join stakes, classify
/// transfers, fold totals.
///
/// Nothing is retained between calls; a rerun with fresher inputs replaces the
/// previous result entirely.
pub fn reconcile(
    raw_stakes: &[RawStakeAccount],
    raw_transactions: &[Option<RawTransactionRecord>],
    tracked_address: &str,
) -> Reconciliation {
    let index = FundingIndex::build(raw_transactions);
    let stakes = stake::reconcile_stakes(raw_stakes, &index);
    let transactions = ledger::classify_transactions(raw_transactions, tracked_address);
    let totals = PortfolioTotals::from_records(&stakes);

    tracing::debug!(
        stakes = stakes.len(),
        funded = index.len(),
        transfers = transactions.len(),
        total_stake = totals.total_stake,
        "reconciliation complete"
    );

    Reconciliation {
        stakes,
        transactions,
        totals,
    }
}
