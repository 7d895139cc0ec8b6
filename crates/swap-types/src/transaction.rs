//! Generic transaction and block shapes shared by all chain adapters.

use crate::common::TxHash;
use serde::{Deserialize, Serialize};

/// Result of looking up a transaction or receipt in a chain view.
///
/// Replaces null-versus-exception control flow at the adapter boundary:
/// `Missing` is terminal for the queried hash, `Pending` is retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
	Found(T),
	/// Not yet queryable: not indexed, not confirmed, or the fetch timed
	/// out. A timed-out fetch is always pending, never missing.
	Pending,
	/// Confirmed absent from the queried chain view.
	Missing,
}

impl<T> Lookup<T> {
	pub fn found(self) -> Option<T> {
		match self {
			Lookup::Found(value) => Some(value),
			_ => None,
		}
	}
}

/// Normalized transaction as returned from read queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
	pub hash: TxHash,
	/// Total transferred value in the chain's base unit.
	pub value: u64,
	/// Blocks mined since inclusion; 0 while unconfirmed.
	pub confirmations: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub block_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub block_number: Option<u64>,
	/// Chain-specific payload, carried opaquely for debugging.
	#[serde(default)]
	pub raw: serde_json::Value,
}

/// Normalized block header plus the hashes of its transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
	pub hash: String,
	pub number: u64,
	/// Chain-native timestamp; the only clock expiration may be compared
	/// against.
	pub timestamp: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_hash: Option<String>,
	#[serde(default)]
	pub difficulty: f64,
	#[serde(default)]
	pub size: u64,
	#[serde(default)]
	pub nonce: u64,
	#[serde(default)]
	pub confirmations: u64,
	/// Ordered transaction hashes; callers expand to full transactions via
	/// `get_transaction` when they need more than the hash.
	#[serde(default)]
	pub transactions: Vec<TxHash>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_found_unwraps_only_found() {
		assert_eq!(Lookup::Found(5).found(), Some(5));
		assert_eq!(Lookup::<u32>::Pending.found(), None);
		assert_eq!(Lookup::<u32>::Missing.found(), None);
	}
}
