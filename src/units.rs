//! Lamport conversion and fixed-precision display helpers.

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub const SECONDS_PER_DAY: i64 = 86_400;

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Signed variant for rewards and transfer volumes.
pub fn signed_lamports_to_sol(lamports: i64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Truncates toward negative infinity at `precision` decimal places.
///
/// Negative precision floors to tens, hundreds, and so on; it does not switch
/// to rounding, so `1250.0` at `-2` gives `1200.0`. The shift is done
/// through the decimal representation so that `0.29` floors to `0.29`, not
/// `0.28`. Returns `None` for NaN and infinities.
pub fn floor_to(value: f64, precision: i32) -> Option<f64> {
    shift_apply(value, precision, f64::floor)
}

/// Rounds half away from zero at `precision` decimal places.
pub fn round_to(value: f64, precision: i32) -> Option<f64> {
    shift_apply(value, precision, f64::round)
}

fn shift_apply(value: f64, precision: i32, op: fn(f64) -> f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let shifted: f64 = format!("{value}e{precision}").parse().ok()?;
    let applied = op(shifted);
    let restored: f64 = format!("{applied}e{}", -precision).parse().ok()?;
    restored.is_finite().then_some(restored)
}

/// `"AbCd...WxYz"` style abbreviation keeping `keep` characters on each side.
pub fn short_pubkey(pubkey: &str, keep: usize) -> String {
    if pubkey.len() <= keep.saturating_mul(2) {
        return pubkey.to_string();
    }
    match (pubkey.get(..keep), pubkey.get(pubkey.len() - keep..)) {
        (Some(head), Some(tail)) => format!("{head}...{tail}"),
        _ => pubkey.to_string(),
    }
}

/// Whole days elapsed between `since` and `now` (both unix seconds), never negative.
pub fn elapsed_days(since: i64, now: i64) -> u64 {
    (now.saturating_sub(since) / SECONDS_PER_DAY).max(0) as u64
}
