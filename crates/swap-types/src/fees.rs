//! Fee types and the estimate-or-default contract.

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee rate in the chain's smallest fee unit per byte. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fee(u64);

impl Fee {
	pub const fn new(rate: u64) -> Self {
		Self(rate)
	}

	pub const fn value(&self) -> u64 {
		self.0
	}
}

impl fmt::Display for Fee {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Outcome of asking the node for a fee estimate.
///
/// Fee estimation failing is an expected condition, not an exceptional one,
/// so it is modelled as a value rather than an error: `UseDefault` tells the
/// caller to apply its configured default rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeEstimate {
	Estimated(Fee),
	UseDefault,
}

/// Fee estimation contract every chain adapter satisfies.
#[async_trait]
pub trait FeeCapability: Send + Sync {
	/// Fee applied when the node cannot produce a usable estimate.
	fn default_fee_per_byte(&self) -> Fee;

	/// Asks the node for a rate targeting inclusion within
	/// `confirmation_target` blocks. Absent or non-positive node estimates
	/// yield [`FeeEstimate::UseDefault`], not an error.
	async fn estimate_fee(&self, confirmation_target: u32) -> Result<FeeEstimate>;

	/// Current fee rate, falling back to the configured default whenever the
	/// node estimate is unusable or the estimation call itself fails.
	async fn get_fee_per_byte(&self, confirmation_target: u32) -> Result<Fee> {
		match self.estimate_fee(confirmation_target).await {
			Ok(FeeEstimate::Estimated(fee)) => Ok(fee),
			Ok(FeeEstimate::UseDefault) | Err(_) => Ok(self.default_fee_per_byte()),
		}
	}
}
