//! Fee-rate conversion and fallback policy.

use swap_types::{Fee, FeeEstimate};

/// Smallest units per whole coin.
const COIN: f64 = 1e8;
/// Bytes per node-reported kilobyte of transaction weight.
const KB: f64 = 1024.0;

/// Converts a node-reported rate in coin-per-kilobyte into a per-byte rate
/// in the smallest unit, rounding up so the paid rate never undershoots the
/// estimate. Absent or non-positive rates signal the default, not an error.
pub fn fee_estimate_from_rate(rate: Option<f64>) -> FeeEstimate {
	match rate {
		Some(rate) if rate > 0.0 => {
			let per_byte = (rate * COIN / KB).ceil() as u64;
			FeeEstimate::Estimated(Fee::new(per_byte))
		}
		_ => FeeEstimate::UseDefault,
	}
}
