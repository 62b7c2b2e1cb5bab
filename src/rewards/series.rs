use serde::{Deserialize, Serialize};

use crate::types::RewardEntry;
use crate::units::{LAMPORTS_PER_SOL, floor_to};

/// Projection settings for chart values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesConfig {
    /// Decimal places kept (floored) in each point's value.
    pub precision: i32,
    /// Base units per displayed unit.
    pub lamports_per_unit: u64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            precision: 4,
            lamports_per_unit: LAMPORTS_PER_SOL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub epoch: u64,
    pub value: f64,
}

/// Maps reward entries to chart points, skipping epochs without a reward.
///
/// The value is the post-reward balance in display units, floored to
/// `config.precision`. Input order is preserved.
pub fn build_series<'a>(
    entries: impl IntoIterator<Item = Option<&'a RewardEntry>>,
    config: &SeriesConfig,
) -> Vec<SeriesPoint> {
    entries
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            let value = floor_to(
                entry.post_balance as f64 / config.lamports_per_unit as f64,
                config.precision,
            );
            if value.is_none() {
                tracing::warn!(
                    epoch = entry.epoch,
                    lamports_per_unit = config.lamports_per_unit,
                    "reward value not representable, point dropped"
                );
            }
            value.map(|value| SeriesPoint {
                epoch: entry.epoch,
                value,
            })
        })
        .collect()
}
