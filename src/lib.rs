#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod engine;
pub mod error;
pub mod ledger;
pub mod portfolio;
pub mod rewards;
pub mod rpc;
pub mod source;
pub mod stake;
pub mod types;
pub mod units;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use engine::{Reconciliation, reconcile};
pub use error::Error;
pub use ledger::{NormalizedTransaction, TransactionStatus, VolumeUnit, classify_transactions};
pub use portfolio::{PortfolioTotals, PortfolioTotalsSol};
pub use rewards::{EpochSchedule, RewardAccumulator, SeriesConfig, SeriesPoint, build_series};
pub use source::{
    LedgerSource, PortfolioSnapshot, collect_rewards, collect_trailing_rewards, refresh_portfolio,
};
pub use stake::{EnrichedStakeRecord, FundingEvent, FundingIndex, InitStake, reconcile_stakes};
pub use types::{RawInstruction, RawStakeAccount, RawTransactionRecord, RewardEntry};
