//! Common identifier types shared across chain families.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account, contract, or script address in the chain's canonical string
/// encoding. Kept opaque; nothing above the adapter boundary parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
	pub fn new(address: impl Into<String>) -> Self {
		Self(address.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Address {
	fn from(address: &str) -> Self {
		Self(address.to_string())
	}
}

impl From<String> for Address {
	fn from(address: String) -> Self {
		Self(address)
	}
}

/// Transaction hash in the chain's canonical string encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
	pub fn new(hash: impl Into<String>) -> Self {
		Self(hash.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TxHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TxHash {
	fn from(hash: &str) -> Self {
		Self(hash.to_string())
	}
}

impl From<String> for TxHash {
	fn from(hash: String) -> Self {
		Self(hash)
	}
}

/// Timestamp in the chain's native clock units.
pub type Timestamp = u64;

/// Strips a leading `0x` from hex strings that carry one.
pub fn remove_0x(s: &str) -> &str {
	s.strip_prefix("0x").unwrap_or(s)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn remove_0x_strips_prefix_only_when_present() {
		assert_eq!(remove_0x("0xabcd"), "abcd");
		assert_eq!(remove_0x("abcd"), "abcd");
		assert_eq!(remove_0x(""), "");
	}

	#[test]
	fn address_display_matches_inner() {
		let address = Address::new("htlc-abc-1");
		assert_eq!(address.to_string(), "htlc-abc-1");
		assert!(!address.is_empty());
		assert!(Address::new("").is_empty());
	}
}
