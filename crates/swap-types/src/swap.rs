//! Swap parameters, secrets, and the normalized swap-transaction view.

use crate::common::{remove_0x, Address, Timestamp, TxHash};
use crate::errors::{ClientError, Result};
use crate::transaction::Transaction;
use async_trait::async_trait;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of secrets and secret hashes.
pub const SECRET_LEN: usize = 32;

/// Preimage of a swap's hash lock.
///
/// Known only to the initiator until claim time. Exists only transiently in
/// memory until it is embedded in a claim transaction, after which it is
/// derivable from chain state.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
	pub const fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
		&self.0
	}

	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl fmt::Debug for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Keep the preimage out of debug logs.
		f.write_str("Secret(..)")
	}
}

impl fmt::Display for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl FromStr for Secret {
	type Err = ClientError;

	fn from_str(s: &str) -> Result<Self> {
		Ok(Self(decode_digest(s, "secret")?))
	}
}

impl Serialize for Secret {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_hex())
	}
}

impl<'de> Deserialize<'de> for Secret {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

/// SHA-256 commitment to a [`Secret`], published at initiation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretHash([u8; SECRET_LEN]);

impl SecretHash {
	pub const fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
		Self(bytes)
	}

	/// Digest of the preimage. A secret is valid for a swap only if this
	/// equals the swap's stored hash exactly.
	pub fn from_secret(secret: &Secret) -> Self {
		let digest = Sha256::digest(secret.as_bytes());
		Self(digest.into())
	}

	pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
		&self.0
	}

	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}

	/// Equality without early exit, so the comparison structure does not
	/// depend on where the first mismatching byte sits.
	pub fn constant_time_eq(&self, other: &SecretHash) -> bool {
		let mut diff = 0u8;
		for (a, b) in self.0.iter().zip(other.0.iter()) {
			diff |= a ^ b;
		}
		diff == 0
	}
}

impl fmt::Display for SecretHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl FromStr for SecretHash {
	type Err = ClientError;

	fn from_str(s: &str) -> Result<Self> {
		Ok(Self(decode_digest(s, "secret hash")?))
	}
}

impl Serialize for SecretHash {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_hex())
	}
}

impl<'de> Deserialize<'de> for SecretHash {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(de::Error::custom)
	}
}

fn decode_digest(s: &str, what: &str) -> Result<[u8; SECRET_LEN]> {
	let bytes = hex::decode(remove_0x(s))
		.map_err(|e| ClientError::Validation(format!("{} is not valid hex: {}", what, e)))?;
	bytes.try_into().map_err(|_| {
		ClientError::Validation(format!("{} must be {} bytes of hex", what, SECRET_LEN))
	})
}

/// Parameters both counterparties agree on out-of-band before a swap begins.
/// Immutable once the negotiation starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
	/// Escrowed amount in the chain's base unit.
	pub value: u64,
	/// Party entitled to the funds on secret reveal.
	pub recipient_address: Address,
	/// Party the funds return to after expiration.
	pub refund_address: Address,
	pub secret_hash: SecretHash,
	/// Absolute expiration in the chain's native timestamp units.
	pub expiration: Timestamp,
}

/// Swap record embedded in a swap-related transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDetails {
	pub recipient: Address,
	pub secret_hash: SecretHash,
	pub expiration: Timestamp,
	/// Present on claim transactions only; the revealed preimage.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret: Option<Secret>,
}

/// Normalized view of a blockchain transaction or receipt as the verifier
/// sees it. Produced fresh on every query; never cached across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapTransaction {
	pub hash: TxHash,
	pub sender: Address,
	/// Escrow account or contract the transaction executed against.
	pub to: Address,
	pub value: u64,
	/// Fingerprint of the code deployed or executed by the transaction.
	pub code_hash: String,
	/// Adapter-reported execution success flag. Adapters translate their
	/// chain's success convention into this boolean; no sentinel values
	/// cross the adapter boundary.
	pub success: bool,
	/// Present when the transaction is swap-related.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub swap: Option<SwapDetails>,
	/// Chain-specific payload, carried opaquely for debugging and never
	/// interpreted by the verifier.
	#[serde(default)]
	pub raw: serde_json::Value,
}

/// The swap lifecycle operations exposed to callers.
///
/// Implementations are stateless between calls and safe to invoke
/// concurrently; sequencing within one swap is the caller's responsibility
/// beyond the precondition checks each operation documents.
#[async_trait]
pub trait SwapCapability: Send + Sync {
	/// Constructs and broadcasts the transaction that escrows
	/// `params.value` under the hash lock and time lock. Does not wait for
	/// confirmation.
	async fn initiate_swap(&self, params: &SwapParams) -> Result<Transaction>;

	/// Sends the funding transaction on chains where funding is a separate
	/// step. `None` means funding is implicit in initiation and the swap is
	/// already satisfied, not a failure.
	async fn fund_swap(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
	) -> Result<Option<Transaction>>;

	/// Locates the funding transaction where one exists; `None` on chains
	/// where initiation funds the escrow by construction.
	async fn find_fund_swap_transaction(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
	) -> Result<Option<Transaction>>;

	/// Claims the escrow by revealing `secret`. Fails fast with a validation
	/// error, before any network call, when the secret does not hash to
	/// `params.secret_hash`.
	async fn claim_swap(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
		secret: &Secret,
	) -> Result<Transaction>;

	/// Sends the refund transaction. The escrow contract enforces that the
	/// time lock has passed; the engine only refuses obviously premature
	/// submissions when the chain clock is cheaply observable.
	async fn refund_swap(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
	) -> Result<Transaction>;

	/// Checks that the transaction behind `initiation_tx_hash` is the
	/// legitimate on-chain initiation of `params`. A mismatch is a `false`
	/// return, never an error, so callers can poll.
	async fn verify_initiate_swap_transaction(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
	) -> Result<bool>;

	/// Extracts the secret revealed by a claim transaction, enabling the
	/// counterparty to claim the mirror-image escrow on the other chain.
	async fn get_swap_secret(&self, claim_tx_hash: &TxHash) -> Result<Secret>;
}
