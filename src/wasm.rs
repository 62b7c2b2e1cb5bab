use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::engine;
use crate::rewards::{EpochSchedule, RewardAccumulator, SeriesConfig, build_series};
use crate::rpc;
use crate::units;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js(value: &serde_json::Value) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

fn error_result(msg: &str) -> JsValue {
    let obj = serde_json::json!({"error": msg});
    to_js(&obj)
}

/// Plain objects instead of JS `Map`s for map-shaped output.
fn to_js_compatible<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn parse_json(json: &str) -> Result<serde_json::Value, JsValue> {
    serde_json::from_str(json).map_err(|_| error_result("Invalid JSON"))
}

fn series_config(precision: Option<i32>) -> SeriesConfig {
    SeriesConfig {
        precision: precision.unwrap_or(SeriesConfig::default().precision),
        ..SeriesConfig::default()
    }
}

/// Reconcile raw `getParsedProgramAccounts` and `getParsedTransactions` results
/// for `tracked_address`. Tables come back newest first.
#[wasm_bindgen]
pub fn reconcile_json(stakes_json: &str, transactions_json: &str, tracked_address: &str) -> JsValue {
    let stakes_value = match parse_json(stakes_json) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let history_value = match parse_json(transactions_json) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let stakes = match rpc::parse_stake_accounts(&stakes_value) {
        Ok(s) => s,
        Err(e) => return error_result(&e.to_string()),
    };
    let history = match rpc::parse_transaction_history(&history_value) {
        Ok(h) => h,
        Err(e) => return error_result(&e.to_string()),
    };

    let result = engine::reconcile(&stakes, &history, tracked_address).sorted_for_display();
    let net = result.net_transfer_volume();
    let totals_sol = result.totals.in_sol();
    match serde_json::to_value(&result) {
        Ok(mut obj) => {
            if let Some(map) = obj.as_object_mut() {
                map.insert(
                    "totalsSol".to_string(),
                    serde_json::to_value(totals_sol).unwrap_or_default(),
                );
                map.insert("netTransferVolume".to_string(), net.into());
            }
            to_js(&obj)
        }
        Err(e) => error_result(&e.to_string()),
    }
}

/// Chart points for one address's accumulated `getInflationReward` entries.
#[wasm_bindgen]
pub fn build_reward_series(rewards_json: &str, precision: Option<i32>) -> JsValue {
    let value = match parse_json(rewards_json) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let entries = match rpc::parse_inflation_rewards(&value) {
        Ok(r) => r,
        Err(e) => return error_result(&e.to_string()),
    };
    let points = build_series(entries.iter().map(Option::as_ref), &series_config(precision));
    to_js_compatible(&points)
}

/// Epochs to request, newest first, for the trailing window before `current_epoch`.
#[wasm_bindgen]
pub fn reward_epochs(current_epoch: u32, lookback: u32, step: u32) -> Vec<u32> {
    EpochSchedule::trailing(current_epoch.into(), lookback.into(), step.into())
        .epochs()
        .filter_map(|e| u32::try_from(e).ok())
        .collect()
}

/// Browser-side reward accumulator; each resolved epoch fetch is merged as it lands.
#[wasm_bindgen]
#[derive(Default)]
pub struct RewardTracker {
    inner: RewardAccumulator,
}

#[wasm_bindgen]
impl RewardTracker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one batch; returns the number of entries that changed state, or -1
    /// when either payload is malformed.
    pub fn merge(&self, addresses_json: &str, rewards_json: &str) -> i32 {
        let Ok(addresses) = serde_json::from_str::<Vec<String>>(addresses_json) else {
            return -1;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(rewards_json) else {
            return -1;
        };
        match rpc::parse_inflation_rewards(&value) {
            Ok(batch) => i32::try_from(self.inner.merge_batch(&addresses, &batch)).unwrap_or(i32::MAX),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting malformed reward batch");
                -1
            }
        }
    }

    /// `{ address: [{epoch, value}] }` for every tracked address.
    pub fn series(&self, precision: Option<i32>) -> JsValue {
        let series = self.inner.series(&series_config(precision));
        to_js_compatible(&series)
    }
}

/// Lamports to SOL, floored to `precision` places; `undefined` for non-finite input.
#[wasm_bindgen]
pub fn floor_sol(lamports: f64, precision: i32) -> Option<f64> {
    units::floor_to(lamports / units::LAMPORTS_PER_SOL as f64, precision)
}

#[wasm_bindgen]
pub fn short_pubkey(pubkey: &str, keep: usize) -> String {
    units::short_pubkey(pubkey, keep)
}
