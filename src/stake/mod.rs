pub mod funding;

use serde::Serialize;

use crate::types::RawStakeAccount;
use crate::units;

pub use funding::{FundingEvent, FundingIndex};

/// Initial principal of a stake account.
///
/// Kept as a tagged optional so that "no funding instruction was found" stays
/// distinguishable from "funded with this amount", even though totals collapse
/// the unknown case to the current balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "lamports", rename_all = "camelCase")]
pub enum InitStake {
    Funded(u64),
    Unknown,
}

impl InitStake {
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Funded(lamports) => Some(lamports),
            Self::Unknown => None,
        }
    }

    /// The principal to use in arithmetic: the funded amount, or `fallback`.
    pub fn resolve(self, fallback: u64) -> u64 {
        self.known().unwrap_or(fallback)
    }
}

/// A stake account joined with its funding event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedStakeRecord {
    pub pubkey: String,
    pub init_stake: InitStake,
    pub current_stake: u64,
    /// `current_stake - init_stake`, or 0 when the principal is unknown.
    pub reward: i64,
    pub activation_epoch: Option<u64>,
    pub rent_epoch: Option<u64>,
    /// Block time of the funding transaction.
    pub block_time: Option<i64>,
}

impl EnrichedStakeRecord {
    pub fn new(raw: &RawStakeAccount, funding: Option<&FundingEvent>) -> Self {
        let init_stake = funding.map_or(InitStake::Unknown, |f| InitStake::Funded(f.amount_lamports));
        Self {
            pubkey: raw.pubkey.clone(),
            init_stake,
            current_stake: raw.lamports,
            reward: reward_lamports(raw.lamports, init_stake),
            activation_epoch: raw.activation_epoch,
            rent_epoch: raw.rent_epoch,
            block_time: funding.and_then(|f| f.block_time),
        }
    }

    pub fn resolved_init_stake(&self) -> u64 {
        self.init_stake.resolve(self.current_stake)
    }

    /// Reward as a percentage of the resolved principal; `None` for a zero principal.
    pub fn reward_pct(&self) -> Option<f64> {
        let init = self.resolved_init_stake();
        (init != 0).then(|| self.reward as f64 / init as f64 * 100.0)
    }

    /// Whole days since the funding transaction, if its block time is known.
    pub fn duration_days(&self, now_unix: i64) -> Option<u64> {
        self.block_time.map(|t| units::elapsed_days(t, now_unix))
    }
}

pub fn reward_lamports(current: u64, init: InitStake) -> i64 {
    let diff = i128::from(current) - i128::from(init.resolve(current));
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

/// Joins stake accounts against a prebuilt funding index.
///
/// One record per input, in input order; lookups are by the stake account's own
/// address.
pub fn reconcile_stakes(
    accounts: &[RawStakeAccount],
    index: &FundingIndex,
) -> Vec<EnrichedStakeRecord> {
    accounts
        .iter()
        .map(|raw| {
            let funding = index.get(&raw.pubkey);
            if funding.is_none() {
                tracing::debug!(
                    pubkey = %raw.pubkey,
                    "no funding instruction found, principal unknown"
                );
            }
            EnrichedStakeRecord::new(raw, funding)
        })
        .collect()
}

/// Newest funding first; records with unknown block time go last. Stable.
pub fn sort_by_block_time_desc(records: &mut [EnrichedStakeRecord]) {
    records.sort_by(|a, b| b.block_time.cmp(&a.block_time));
}
