//! Error taxonomy for the swap client.
//!
//! The split that matters operationally: `Validation` failures are local and
//! never retried, `TxNotFound` is terminal for the queried hash, and
//! `PendingTx` means the caller may retry with backoff. Transport failures
//! are carried as `Network`/`Rpc` and never reinterpreted into domain errors.

use crate::common::TxHash;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Capability groups a provider can expose on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
	Chain,
	Swap,
	Wallet,
	Fee,
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Capability::Chain => "chain",
			Capability::Swap => "swap",
			Capability::Wallet => "wallet",
			Capability::Fee => "fee",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Error)]
pub enum ClientError {
	/// Precondition checkable without network access failed. Never retried.
	#[error("Invalid swap parameters: {0}")]
	Validation(String),

	/// The queried chain view definitely does not contain the hash.
	#[error("Transaction not found: {hash}")]
	TxNotFound { hash: TxHash },

	/// Evidence not yet available; the caller may retry with backoff.
	#[error("Transaction receipt is not available: {hash}")]
	PendingTx { hash: TxHash },

	/// The transaction exists but carries no embedded swap secret, so it
	/// cannot have been a claim.
	#[error("Transaction carries no swap secret: {hash}")]
	SwapSecretMissing { hash: TxHash },

	/// No provider in the stack implements the requested capability.
	#[error("No provider implements the {0} capability")]
	NoProvider(Capability),

	#[error("Unsupported operation: {0}")]
	Unsupported(&'static str),

	/// Adapter-origin transport failure, propagated unchanged.
	#[error("Network error: {0}")]
	Network(String),

	/// Node-reported RPC error, propagated unchanged.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("Configuration error: {0}")]
	Config(String),
}
