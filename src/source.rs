//! Contract of the ledger-query client and the drivers that feed the pure core.
//!
//! Implementations own transport, retries and timeouts. Listing stake accounts
//! is expected to filter the stake program ([`crate::rpc::STAKE_PROGRAM_ID`]) by
//! withdrawer at [`crate::rpc::STAKE_WITHDRAWER_OFFSET`].

use serde::Serialize;

use crate::engine::{self, Reconciliation};
use crate::error::Error;
use crate::rewards::{EpochSchedule, RewardAccumulator};
use crate::types::{RawStakeAccount, RawTransactionRecord, RewardEntry};
use crate::units;

pub trait LedgerSource {
    fn stake_accounts(&self, owner: &str) -> Result<Vec<RawStakeAccount>, Error>;

    /// Most recent transactions first; entries the node could not return are `None`.
    fn transaction_history(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Option<RawTransactionRecord>>, Error>;

    /// One reward-or-null per address, positionally aligned with `addresses`.
    fn inflation_rewards(
        &self,
        addresses: &[String],
        epoch: u64,
    ) -> Result<Vec<Option<RewardEntry>>, Error>;

    fn account_balance(&self, address: &str) -> Result<u64, Error>;

    fn current_epoch(&self) -> Result<u64, Error>;
}

/// Default history depth requested by [`refresh_portfolio`] callers.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Epochs looked back from the current one when charting rewards.
pub const DEFAULT_REWARD_LOOKBACK: u64 = 200;

/// Distance between charted reward epochs.
pub const DEFAULT_REWARD_STEP: u64 = 5;

/// Wallet balance plus the reconciled stake and transfer tables for one owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Lamports held by the owner account itself.
    pub balance: u64,
    #[serde(flatten)]
    pub reconciliation: Reconciliation,
}

impl PortfolioSnapshot {
    /// Balance in SOL, floored to two places.
    pub fn balance_sol(&self) -> Option<f64> {
        units::floor_to(units::lamports_to_sol(self.balance), 2)
    }
}

/// Fetches balance, stakes and history for `owner` and reconciles them.
pub fn refresh_portfolio(
    source: &dyn LedgerSource,
    owner: &str,
    history_limit: usize,
) -> Result<PortfolioSnapshot, Error> {
    crate::types::validate_address(owner)?;
    let balance = source.account_balance(owner)?;
    let stakes = source.stake_accounts(owner)?;
    let history = source.transaction_history(owner, history_limit)?;
    Ok(PortfolioSnapshot {
        balance,
        reconciliation: engine::reconcile(&stakes, &history, owner),
    })
}

/// Fetches every scheduled epoch and merges it into `accumulator`.
///
/// A failed epoch is logged and skipped. Returns the number of epochs merged.
pub fn collect_rewards(
    source: &dyn LedgerSource,
    addresses: &[String],
    schedule: EpochSchedule,
    accumulator: &RewardAccumulator,
) -> usize {
    if addresses.is_empty() {
        return 0;
    }

    let mut merged = 0;
    for epoch in schedule.epochs() {
        match source.inflation_rewards(addresses, epoch) {
            Ok(batch) => {
                accumulator.merge_batch(addresses, &batch);
                merged += 1;
            }
            Err(e) => {
                tracing::warn!(epoch, error = %e, "reward fetch failed, epoch skipped");
            }
        }
    }
    merged
}

/// Reads the current epoch and collects the trailing window before it,
/// `lookback` epochs deep at `step` spacing.
///
/// Fails only when the current epoch cannot be read; individual epochs are
/// skipped as in [`collect_rewards`].
pub fn collect_trailing_rewards(
    source: &dyn LedgerSource,
    addresses: &[String],
    lookback: u64,
    step: u64,
    accumulator: &RewardAccumulator,
) -> Result<usize, Error> {
    let current_epoch = source.current_epoch()?;
    let schedule = EpochSchedule::trailing(current_epoch, lookback, step);
    tracing::debug!(
        current_epoch,
        start = schedule.start,
        end = schedule.end,
        step,
        "collecting trailing rewards"
    );
    Ok(collect_rewards(source, addresses, schedule, accumulator))
}
