use serde::Serialize;

use crate::stake::EnrichedStakeRecord;
use crate::units::{lamports_to_sol, signed_lamports_to_sol};

/// Portfolio-level sums over a reconciled stake set, in lamports.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_stake: u64,
    pub total_init_stake: u64,
    pub total_reward: i64,
    /// `None` when `total_init_stake` is zero.
    pub total_return_pct: Option<f64>,
}

impl PortfolioTotals {
    /// Folds a record set. Unknown principals count as their current balance.
    pub fn from_records(records: &[EnrichedStakeRecord]) -> Self {
        let (stake, init, reward) =
            records
                .iter()
                .fold((0_u128, 0_u128, 0_i128), |(stake, init, reward), r| {
                    (
                        stake + u128::from(r.current_stake),
                        init + u128::from(r.resolved_init_stake()),
                        reward + i128::from(r.reward),
                    )
                });

        let total_init_stake = u64::try_from(init).unwrap_or(u64::MAX);
        let total_reward = i64::try_from(reward).unwrap_or(if reward < 0 { i64::MIN } else { i64::MAX });

        Self {
            total_stake: u64::try_from(stake).unwrap_or(u64::MAX),
            total_init_stake,
            total_reward,
            total_return_pct: return_pct(total_reward, total_init_stake),
        }
    }

    pub fn in_sol(&self) -> PortfolioTotalsSol {
        PortfolioTotalsSol {
            total_stake: lamports_to_sol(self.total_stake),
            total_init_stake: lamports_to_sol(self.total_init_stake),
            total_reward: signed_lamports_to_sol(self.total_reward),
            total_return_pct: self.total_return_pct,
        }
    }
}

/// Display view of [`PortfolioTotals`] denominated in SOL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotalsSol {
    pub total_stake: f64,
    pub total_init_stake: f64,
    pub total_reward: f64,
    pub total_return_pct: Option<f64>,
}

fn return_pct(reward: i64, init: u64) -> Option<f64> {
    if init == 0 {
        return None;
    }
    let pct = reward as f64 / init as f64 * 100.0;
    pct.is_finite().then_some(pct)
}
