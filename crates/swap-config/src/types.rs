//! Configuration schema.

use serde::{Deserialize, Serialize};
use swap_types::Fee;

/// Top-level client configuration, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub chain: ChainConfig,
}

/// Connection and policy settings for the chain adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
	/// JSON-RPC endpoint of the node.
	pub rpc_url: String,

	#[serde(default)]
	pub rpc_user: Option<String>,

	#[serde(default)]
	pub rpc_password: Option<String>,

	/// Blocks within which fee estimates should land a transaction.
	#[serde(default = "default_confirmation_target")]
	pub confirmation_target: u32,

	/// Fee rate applied when the node cannot produce a usable estimate.
	#[serde(default = "default_fee_per_byte")]
	pub default_fee_per_byte: Fee,

	/// Canonical fingerprint of the swap contract on this chain.
	pub swap_code_hash: String,

	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}

fn default_confirmation_target() -> u32 {
	1
}

fn default_fee_per_byte() -> Fee {
	Fee::new(3)
}

fn default_request_timeout_secs() -> u64 {
	30
}
