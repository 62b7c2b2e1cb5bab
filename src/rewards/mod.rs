pub mod series;

use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::types::RewardEntry;

pub use series::{SeriesConfig, SeriesPoint, build_series};

/// Per-address reward history fed by independently resolving epoch fetches.
///
/// Each address owns its own slot; a merge locks only that slot's shard. Entries
/// are kept sorted by epoch with at most one entry per epoch, so batches can be
/// merged in any order and still produce the same state. If two batches carry
/// different entries for the same epoch, the greater entry (by `Ord`) is kept.
#[derive(Debug, Default)]
pub struct RewardAccumulator {
    slots: DashMap<String, Vec<RewardEntry>>,
}

impl RewardAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one `getInflationReward` result, positionally aligned with `addresses`.
    ///
    /// `None` entries register the address but add nothing. Returns the number of
    /// entries that changed the accumulated state.
    pub fn merge_batch(&self, addresses: &[String], batch: &[Option<RewardEntry>]) -> usize {
        if addresses.len() != batch.len() {
            tracing::warn!(
                addresses = addresses.len(),
                rewards = batch.len(),
                "reward batch not aligned with addresses, merging common prefix"
            );
        }

        let mut changed = 0;
        for (address, entry) in addresses.iter().zip(batch) {
            let mut slot = self.slots.entry(address.clone()).or_default();
            if let Some(entry) = entry
                && insert_by_epoch(&mut slot, entry)
            {
                changed += 1;
            }
        }
        changed
    }

    /// Snapshot of one address's entries, ordered by epoch.
    pub fn entries(&self, address: &str) -> Vec<RewardEntry> {
        self.slots
            .get(address)
            .map(|slot| slot.value().clone())
            .unwrap_or_default()
    }

    pub fn addresses(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.slots.iter().map(|slot| slot.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Projects every address to its chart series.
    pub fn series(&self, config: &SeriesConfig) -> BTreeMap<String, Vec<SeriesPoint>> {
        self.slots
            .iter()
            .map(|slot| {
                let points = build_series(slot.value().iter().map(Some), config);
                (slot.key().clone(), points)
            })
            .collect()
    }
}

fn insert_by_epoch(slot: &mut Vec<RewardEntry>, entry: &RewardEntry) -> bool {
    match slot.binary_search_by_key(&entry.epoch, |e| e.epoch) {
        Ok(pos) => {
            if *entry > slot[pos] {
                slot[pos] = entry.clone();
                true
            } else {
                false
            }
        }
        Err(pos) => {
            slot.insert(pos, entry.clone());
            true
        }
    }
}

/// Descending epoch walk used to request reward batches.
///
/// Yields `end, end - step, ...` while the epoch stays above `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochSchedule {
    pub start: u64,
    pub end: u64,
    pub step: u64,
}

impl EpochSchedule {
    /// Window of `lookback` epochs ending just before `current_epoch`.
    pub fn trailing(current_epoch: u64, lookback: u64, step: u64) -> Self {
        Self {
            start: current_epoch.saturating_sub(lookback),
            end: current_epoch.saturating_sub(1),
            step,
        }
    }

    pub fn epochs(&self) -> impl Iterator<Item = u64> + use<> {
        let Self { start, end, step } = *self;
        let first = (step > 0 && end > start).then_some(end);
        std::iter::successors(first, move |epoch| {
            epoch.checked_sub(step).filter(|next| *next > start)
        })
    }
}

impl Default for EpochSchedule {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            step: 5,
        }
    }
}
