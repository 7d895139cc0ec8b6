//! Chain access capability: the generic read/send surface every adapter
//! implements.

use crate::common::{Address, Timestamp, TxHash};
use crate::errors::Result;
use crate::swap::{Secret, SecretHash, SwapTransaction};
use crate::transaction::{Block, Lookup, Transaction};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Chain-neutral action a transaction should perform.
///
/// This is the tagged union at the adapter boundary: adapters serialize each
/// variant into their chain's native transaction format, and nothing above
/// the boundary ever branches on chain identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TxPayload {
	/// Plain value transfer.
	Transfer,
	/// Deploy-and-initialize an HTLC escrow binding the hash lock, the
	/// recipient, and the time lock into its durable state.
	HtlcInitiate {
		recipient: Address,
		secret_hash: SecretHash,
		expiration: Timestamp,
	},
	/// Invoke the escrow's claim path with the revealed secret.
	HtlcClaim { secret: Secret },
	/// Invoke the escrow's refund path after expiration.
	HtlcRefund,
}

/// Normalized transaction request handed to a chain adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
	/// Destination account; for HTLC payloads, the escrow identifier.
	pub to: Option<Address>,
	/// Transferred amount in the chain's base unit.
	pub value: u64,
	pub payload: TxPayload,
}

impl SendRequest {
	pub fn transfer(to: Address, value: u64) -> Self {
		Self {
			to: Some(to),
			value,
			payload: TxPayload::Transfer,
		}
	}
}

/// Read/send operations against one blockchain's node or API.
///
/// Adapters normalize results into the shared data model and distinguish
/// "definitely absent" from transport failures; they must never mask a
/// network error as a missing transaction.
#[async_trait]
pub trait ChainCapability: Send + Sync {
	/// Broadcasts a transaction and returns a handle to it. Broadcast
	/// failures surface as errors, never as a silently dropped send.
	async fn send_transaction(&self, request: SendRequest) -> Result<Transaction>;

	/// Fetches the receipt of a potentially swap-related transaction.
	/// Transport timeouts map to [`Lookup::Pending`]; a chain view that
	/// definitely does not contain the hash maps to [`Lookup::Missing`].
	async fn find_transaction_receipt(&self, hash: &TxHash) -> Result<Lookup<SwapTransaction>>;

	/// Fetches a transaction in the generic normalized shape.
	async fn get_transaction(&self, hash: &TxHash) -> Result<Lookup<Transaction>>;

	async fn get_block_by_hash(&self, hash: &str) -> Result<Option<Block>>;

	async fn get_block_by_number(&self, number: u64) -> Result<Option<Block>>;

	async fn get_block_height(&self) -> Result<u64>;

	/// Timestamp of the chain tip in chain-native units, where the chain
	/// exposes one. Expiration comparisons use this, never the local clock.
	async fn latest_block_timestamp(&self) -> Result<Option<Timestamp>>;

	/// Canonical fingerprint of the swap contract for this chain. On-chain
	/// evidence whose code fingerprint differs is not an initiation, no
	/// matter what else matches.
	fn swap_code_hash(&self) -> &str;
}
