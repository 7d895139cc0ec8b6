//! JSON-RPC chain adapter.
//!
//! Targets account-model nodes whose receipt endpoint reports executed
//! escrows: the receipt carries the executed code fingerprint, an explicit
//! success flag, and an embedded swap record when the transaction touched
//! an HTLC escrow. Block and transaction queries follow the Bitcoin-Core
//! RPC shapes (`getblock`, `getblockhash`, `getblockcount`).

use crate::fees::fee_estimate_from_rate;
use crate::transport::{JsonRpcTransport, TransportError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use swap_client::Provider;
use swap_types::{
	Address, Block, ChainCapability, ClientError, Fee, FeeCapability, FeeEstimate, Lookup, Result,
	SendRequest, SwapDetails, SwapTransaction, Timestamp, Transaction, TxHash,
};
use tracing::{debug, info};

/// Node error code for a transaction or block the node does not know.
const RPC_NOT_FOUND: i64 = -5;

/// Chain adapter speaking JSON-RPC to a single node.
pub struct JsonRpcChainProvider {
	transport: Arc<dyn JsonRpcTransport>,
	default_fee_per_byte: Fee,
	swap_code_hash: String,
}

impl JsonRpcChainProvider {
	pub fn new(
		transport: Arc<dyn JsonRpcTransport>,
		default_fee_per_byte: Fee,
		swap_code_hash: impl Into<String>,
	) -> Self {
		Self {
			transport,
			default_fee_per_byte,
			swap_code_hash: swap_code_hash.into(),
		}
	}
}

// Wire shapes, converted to the shared model immediately after decoding.

#[derive(Deserialize)]
struct RawReceipt {
	hash: String,
	sender: String,
	receiver: String,
	#[serde(default)]
	value: u64,
	#[serde(default)]
	code_hash: String,
	status: RawStatus,
	#[serde(default)]
	swap: Option<RawSwap>,
}

#[derive(Deserialize)]
struct RawStatus {
	success: bool,
}

#[derive(Deserialize)]
struct RawSwap {
	recipient: String,
	secret_hash: String,
	expiration: u64,
	#[serde(default)]
	secret: Option<String>,
}

#[derive(Deserialize)]
struct RawTransaction {
	hash: String,
	#[serde(default)]
	value: u64,
	#[serde(default)]
	confirmations: u64,
	#[serde(default)]
	blockhash: Option<String>,
	#[serde(default)]
	blockheight: Option<u64>,
}

#[derive(Deserialize)]
struct RawBlock {
	hash: String,
	height: u64,
	time: u64,
	#[serde(default)]
	previousblockhash: Option<String>,
	#[serde(default)]
	difficulty: f64,
	#[serde(default)]
	size: u64,
	#[serde(default)]
	nonce: u64,
	#[serde(default)]
	confirmations: u64,
	#[serde(default)]
	tx: Vec<String>,
}

fn parse_receipt(value: &Value) -> Result<SwapTransaction> {
	let raw: RawReceipt = serde_json::from_value(value.clone())
		.map_err(|e| ClientError::Network(format!("malformed receipt: {}", e)))?;

	let swap = raw
		.swap
		.map(|swap| -> Result<SwapDetails> {
			Ok(SwapDetails {
				recipient: Address::new(swap.recipient),
				secret_hash: swap.secret_hash.parse()?,
				expiration: swap.expiration,
				secret: swap.secret.map(|s| s.parse()).transpose()?,
			})
		})
		.transpose()?;

	Ok(SwapTransaction {
		hash: TxHash::new(raw.hash),
		sender: Address::new(raw.sender),
		to: Address::new(raw.receiver),
		value: raw.value,
		code_hash: raw.code_hash,
		success: raw.status.success,
		swap,
		raw: value.clone(),
	})
}

fn normalize_transaction(value: &Value) -> Result<Transaction> {
	let raw: RawTransaction = serde_json::from_value(value.clone())
		.map_err(|e| ClientError::Network(format!("malformed transaction: {}", e)))?;

	// Block linkage is only trustworthy once the node reports confirmations.
	let confirmed = raw.confirmations > 0;
	Ok(Transaction {
		hash: TxHash::new(raw.hash),
		value: raw.value,
		confirmations: raw.confirmations,
		block_hash: if confirmed { raw.blockhash } else { None },
		block_number: if confirmed { raw.blockheight } else { None },
		raw: value.clone(),
	})
}

fn normalize_block(value: &Value) -> Result<Block> {
	let raw: RawBlock = serde_json::from_value(value.clone())
		.map_err(|e| ClientError::Network(format!("malformed block: {}", e)))?;

	Ok(Block {
		hash: raw.hash,
		number: raw.height,
		timestamp: raw.time,
		parent_hash: raw.previousblockhash,
		difficulty: raw.difficulty,
		size: raw.size,
		nonce: raw.nonce,
		confirmations: raw.confirmations,
		transactions: raw.tx.into_iter().map(TxHash::new).collect(),
	})
}

fn map_transport(error: TransportError) -> ClientError {
	match error {
		TransportError::Rpc { code, message } => ClientError::Rpc { code, message },
		other => ClientError::Network(other.to_string()),
	}
}

#[async_trait]
impl ChainCapability for JsonRpcChainProvider {
	async fn send_transaction(&self, request: SendRequest) -> Result<Transaction> {
		let params = json!([{
			"to": request.to.as_ref().map(Address::as_str),
			"value": request.value,
			"payload": request.payload,
		}]);

		let result = self
			.transport
			.request("sendtransaction", params)
			.await
			.map_err(map_transport)?;

		let hash = result.as_str().ok_or_else(|| {
			ClientError::Network("sendtransaction returned no transaction hash".to_string())
		})?;

		info!(hash, "broadcast transaction");
		Ok(Transaction {
			hash: TxHash::new(hash),
			value: request.value,
			confirmations: 0,
			block_hash: None,
			block_number: None,
			raw: result.clone(),
		})
	}

	async fn find_transaction_receipt(&self, hash: &TxHash) -> Result<Lookup<SwapTransaction>> {
		match self
			.transport
			.request("gettransactionreceipt", json!([hash.as_str()]))
			.await
		{
			Ok(Value::Null) => Ok(Lookup::Missing),
			Ok(value) => Ok(Lookup::Found(parse_receipt(&value)?)),
			Err(TransportError::Timeout) => {
				debug!(%hash, "receipt fetch timed out, treating as pending");
				Ok(Lookup::Pending)
			}
			Err(TransportError::Rpc { code, .. }) if code == RPC_NOT_FOUND => Ok(Lookup::Missing),
			Err(error) => Err(map_transport(error)),
		}
	}

	async fn get_transaction(&self, hash: &TxHash) -> Result<Lookup<Transaction>> {
		match self
			.transport
			.request("gettransaction", json!([hash.as_str()]))
			.await
		{
			Ok(Value::Null) => Ok(Lookup::Missing),
			Ok(value) => Ok(Lookup::Found(normalize_transaction(&value)?)),
			Err(TransportError::Timeout) => Ok(Lookup::Pending),
			Err(TransportError::Rpc { code, .. }) if code == RPC_NOT_FOUND => Ok(Lookup::Missing),
			Err(error) => Err(map_transport(error)),
		}
	}

	async fn get_block_by_hash(&self, hash: &str) -> Result<Option<Block>> {
		match self.transport.request("getblock", json!([hash])).await {
			Ok(Value::Null) => Ok(None),
			Ok(value) => Ok(Some(normalize_block(&value)?)),
			Err(TransportError::Rpc { code, .. }) if code == RPC_NOT_FOUND => Ok(None),
			Err(error) => Err(map_transport(error)),
		}
	}

	async fn get_block_by_number(&self, number: u64) -> Result<Option<Block>> {
		let hash = match self.transport.request("getblockhash", json!([number])).await {
			Ok(Value::Null) => return Ok(None),
			Ok(value) => value
				.as_str()
				.map(str::to_string)
				.ok_or_else(|| ClientError::Network("getblockhash returned no hash".to_string()))?,
			Err(TransportError::Rpc { code, .. }) if code == RPC_NOT_FOUND => return Ok(None),
			Err(error) => return Err(map_transport(error)),
		};
		self.get_block_by_hash(&hash).await
	}

	async fn get_block_height(&self) -> Result<u64> {
		let result = self
			.transport
			.request("getblockcount", json!([]))
			.await
			.map_err(map_transport)?;
		result
			.as_u64()
			.ok_or_else(|| ClientError::Network("getblockcount returned no height".to_string()))
	}

	async fn latest_block_timestamp(&self) -> Result<Option<Timestamp>> {
		let height = self.get_block_height().await?;
		Ok(self
			.get_block_by_number(height)
			.await?
			.map(|block| block.timestamp))
	}

	fn swap_code_hash(&self) -> &str {
		&self.swap_code_hash
	}
}

#[async_trait]
impl FeeCapability for JsonRpcChainProvider {
	fn default_fee_per_byte(&self) -> Fee {
		self.default_fee_per_byte
	}

	async fn estimate_fee(&self, confirmation_target: u32) -> Result<FeeEstimate> {
		let result = match self
			.transport
			.request("estimatesmartfee", json!([confirmation_target]))
			.await
		{
			Ok(value) => value,
			// Estimation failing is expected on fresh or unsynced nodes.
			Err(error) => {
				debug!(%error, "fee estimation failed, using default");
				return Ok(FeeEstimate::UseDefault);
			}
		};

		let rate = result.get("feerate").and_then(Value::as_f64);
		Ok(fee_estimate_from_rate(rate))
	}
}

impl Provider for JsonRpcChainProvider {
	fn as_chain(&self) -> Option<&dyn ChainCapability> {
		Some(self)
	}

	fn as_fee(&self) -> Option<&dyn FeeCapability> {
		Some(self)
	}
}
