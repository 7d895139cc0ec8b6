//! Chain-agnostic HTLC swap engine.
//!
//! `HtlcSwapProvider` drives the swap lifecycle (initiate, fund, claim,
//! refund) against whichever chain capability its provider stack resolves.
//! It never talks to a concrete adapter type: every read and send goes back
//! through the stack, so layers registered above the chain adapter can
//! intercept or augment them.
//!
//! The engine is stateless between calls. It enforces the documented
//! preconditions, refuses to send anything that does not match the agreed
//! parameters, and never retries a send on its own.

pub mod verify;

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};
use swap_client::{Provider, ProviderStack, StackAnchor};
use swap_types::{
	ChainCapability, ClientError, Lookup, Result, Secret, SecretHash, SendRequest, SwapCapability,
	SwapParams, SwapTransaction, Transaction, TxHash, TxPayload,
};
use tracing::{debug, info};

/// Swap provider implementing the HTLC lifecycle over a provider stack.
#[derive(Default)]
pub struct HtlcSwapProvider {
	anchor: OnceLock<StackAnchor>,
}

impl HtlcSwapProvider {
	pub fn new() -> Self {
		Self {
			anchor: OnceLock::new(),
		}
	}

	fn stack(&self) -> Result<Arc<ProviderStack>> {
		self.anchor
			.get()
			.ok_or(ClientError::Unsupported(
				"swap provider is not registered on a provider stack",
			))?
			.stack()
	}

	/// Escrow identifier tied to the secret hash plus a disambiguating
	/// salt: retried initiations against the same parameters do not collide
	/// but stay attributable to the swap.
	fn generate_escrow_id(secret_hash: &SecretHash) -> String {
		let hex = secret_hash.to_hex();
		let millis = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_millis())
			.unwrap_or_default();
		let salt = u128::from_le_bytes(*uuid::Uuid::new_v4().as_bytes()) % 1_000_000_000;
		format!("htlc-{}-{}", &hex[..20], millis + salt)
	}

	/// Fetches the initiation receipt after verification has already seen
	/// it. A miss at this point is indexing lag, so both `Pending` and
	/// `Missing` report as pending and the caller retries.
	async fn fetch_verified_initiation(
		&self,
		chain: &dyn ChainCapability,
		initiation_tx_hash: &TxHash,
	) -> Result<SwapTransaction> {
		match chain.find_transaction_receipt(initiation_tx_hash).await? {
			Lookup::Found(tx) => Ok(tx),
			Lookup::Pending | Lookup::Missing => Err(ClientError::PendingTx {
				hash: initiation_tx_hash.clone(),
			}),
		}
	}

	async fn require_verified(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
	) -> Result<()> {
		if !self
			.verify_initiate_swap_transaction(params, initiation_tx_hash)
			.await?
		{
			return Err(ClientError::Validation(format!(
				"initiation transaction does not match the agreed swap parameters: {}",
				initiation_tx_hash
			)));
		}
		Ok(())
	}
}

impl Provider for HtlcSwapProvider {
	fn as_swap(&self) -> Option<&dyn SwapCapability> {
		Some(self)
	}

	fn bind(&self, anchor: StackAnchor) {
		let _ = self.anchor.set(anchor);
	}
}

#[async_trait]
impl SwapCapability for HtlcSwapProvider {
	async fn initiate_swap(&self, params: &SwapParams) -> Result<Transaction> {
		verify::validate_swap_params(params)?;

		let stack = self.stack()?;
		let chain = stack.chain()?;
		let escrow_id = Self::generate_escrow_id(&params.secret_hash);
		info!(escrow = %escrow_id, value = params.value, "initiating swap");

		chain
			.send_transaction(SendRequest {
				to: Some(escrow_id.into()),
				value: params.value,
				payload: TxPayload::HtlcInitiate {
					recipient: params.recipient_address.clone(),
					secret_hash: params.secret_hash.clone(),
					expiration: params.expiration,
				},
			})
			.await
	}

	async fn fund_swap(
		&self,
		params: &SwapParams,
		_initiation_tx_hash: &TxHash,
	) -> Result<Option<Transaction>> {
		verify::validate_swap_params(params)?;
		// Initiation transfers the value into escrow in the same
		// transaction; there is no separate funding step to send.
		Ok(None)
	}

	async fn find_fund_swap_transaction(
		&self,
		params: &SwapParams,
		_initiation_tx_hash: &TxHash,
	) -> Result<Option<Transaction>> {
		verify::validate_swap_params(params)?;
		Ok(None)
	}

	async fn claim_swap(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
		secret: &Secret,
	) -> Result<Transaction> {
		verify::validate_swap_params(params)?;
		verify::validate_secret_and_hash(secret, &params.secret_hash)?;

		self.require_verified(params, initiation_tx_hash).await?;

		let stack = self.stack()?;
		let chain = stack.chain()?;
		let initiation = self
			.fetch_verified_initiation(chain, initiation_tx_hash)
			.await?;

		info!(escrow = %initiation.to, "claiming swap");
		chain
			.send_transaction(SendRequest {
				to: Some(initiation.to.clone()),
				value: 0,
				payload: TxPayload::HtlcClaim {
					secret: secret.clone(),
				},
			})
			.await
	}

	async fn refund_swap(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
	) -> Result<Transaction> {
		verify::validate_swap_params(params)?;
		self.require_verified(params, initiation_tx_hash).await?;

		let stack = self.stack()?;
		let chain = stack.chain()?;

		// Cheap pre-check against the chain's own clock; the escrow
		// contract is the actual enforcer of the time lock.
		if let Some(chain_time) = chain.latest_block_timestamp().await? {
			if chain_time < params.expiration {
				return Err(ClientError::Validation(format!(
					"swap does not expire until {} (chain time {})",
					params.expiration, chain_time
				)));
			}
		}

		let initiation = self
			.fetch_verified_initiation(chain, initiation_tx_hash)
			.await?;

		info!(escrow = %initiation.to, "refunding swap");
		chain
			.send_transaction(SendRequest {
				to: Some(initiation.to.clone()),
				value: 0,
				payload: TxPayload::HtlcRefund,
			})
			.await
	}

	async fn verify_initiate_swap_transaction(
		&self,
		params: &SwapParams,
		initiation_tx_hash: &TxHash,
	) -> Result<bool> {
		verify::validate_swap_params(params)?;

		let stack = self.stack()?;
		let chain = stack.chain()?;
		let initiation = match chain.find_transaction_receipt(initiation_tx_hash).await? {
			Lookup::Found(tx) => tx,
			Lookup::Pending => {
				return Err(ClientError::PendingTx {
					hash: initiation_tx_hash.clone(),
				})
			}
			Lookup::Missing => {
				return Err(ClientError::TxNotFound {
					hash: initiation_tx_hash.clone(),
				})
			}
		};

		let matches = verify::matches_initiation(params, &initiation, chain.swap_code_hash());
		debug!(tx = %initiation_tx_hash, matches, success = initiation.success, "verified initiation");
		Ok(matches && initiation.success)
	}

	async fn get_swap_secret(&self, claim_tx_hash: &TxHash) -> Result<Secret> {
		let stack = self.stack()?;
		let chain = stack.chain()?;
		match chain.find_transaction_receipt(claim_tx_hash).await? {
			Lookup::Found(tx) => verify::extract_secret(&tx),
			Lookup::Pending => Err(ClientError::PendingTx {
				hash: claim_tx_hash.clone(),
			}),
			Lookup::Missing => Err(ClientError::TxNotFound {
				hash: claim_tx_hash.clone(),
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;
	use swap_types::{Address, Block, SwapDetails, Timestamp};

	const CODE: &str = "canonical-swap-code";

	// Chain capability double that serves a canned receipt and counts every
	// network-shaped call, so tests can assert which operations stayed local.
	struct MockChain {
		receipt: Mutex<Lookup<SwapTransaction>>,
		tip_timestamp: Option<Timestamp>,
		calls: AtomicUsize,
		sent: Mutex<Vec<SendRequest>>,
	}

	impl MockChain {
		fn with_receipt(receipt: Lookup<SwapTransaction>) -> Self {
			Self {
				receipt: Mutex::new(receipt),
				tip_timestamp: None,
				calls: AtomicUsize::new(0),
				sent: Mutex::new(Vec::new()),
			}
		}

		fn with_tip(mut self, timestamp: Timestamp) -> Self {
			self.tip_timestamp = Some(timestamp);
			self
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		fn sent(&self) -> Vec<SendRequest> {
			self.sent.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl ChainCapability for MockChain {
		async fn send_transaction(&self, request: SendRequest) -> Result<Transaction> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			let value = request.value;
			self.sent.lock().unwrap().push(request);
			Ok(Transaction {
				hash: TxHash::new("sent-tx"),
				value,
				confirmations: 0,
				block_hash: None,
				block_number: None,
				raw: serde_json::Value::Null,
			})
		}

		async fn find_transaction_receipt(&self, _: &TxHash) -> Result<Lookup<SwapTransaction>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(self.receipt.lock().unwrap().clone())
		}

		async fn get_transaction(&self, _: &TxHash) -> Result<Lookup<Transaction>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(Lookup::Missing)
		}

		async fn get_block_by_hash(&self, _: &str) -> Result<Option<Block>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(None)
		}

		async fn get_block_by_number(&self, _: u64) -> Result<Option<Block>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(None)
		}

		async fn get_block_height(&self) -> Result<u64> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(0)
		}

		async fn latest_block_timestamp(&self) -> Result<Option<Timestamp>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(self.tip_timestamp)
		}

		fn swap_code_hash(&self) -> &str {
			CODE
		}
	}

	impl Provider for MockChain {
		fn as_chain(&self) -> Option<&dyn ChainCapability> {
			Some(self)
		}
	}

	fn secret() -> Secret {
		Secret::from_bytes([1u8; 32])
	}

	fn params() -> SwapParams {
		SwapParams {
			value: 100_000,
			recipient_address: Address::new("R"),
			refund_address: Address::new("F"),
			secret_hash: SecretHash::from_secret(&secret()),
			expiration: 1_700_000_000,
		}
	}

	fn initiation_receipt(params: &SwapParams) -> SwapTransaction {
		SwapTransaction {
			hash: TxHash::new("init-tx"),
			sender: params.refund_address.clone(),
			to: Address::new("htlc-escrow-1"),
			value: params.value,
			code_hash: CODE.to_string(),
			success: true,
			swap: Some(SwapDetails {
				recipient: params.recipient_address.clone(),
				secret_hash: params.secret_hash.clone(),
				expiration: params.expiration,
				secret: None,
			}),
			raw: serde_json::Value::Null,
		}
	}

	fn stack_with(mock: Arc<MockChain>) -> Arc<ProviderStack> {
		ProviderStack::builder()
			.with_provider(mock)
			.with_provider(Arc::new(HtlcSwapProvider::new()))
			.build()
	}

	#[tokio::test]
	async fn initiate_escrows_the_value_under_the_hash_lock() {
		let params = params();
		let mock = Arc::new(MockChain::with_receipt(Lookup::Missing));
		let stack = stack_with(mock.clone());

		stack.swap().unwrap().initiate_swap(&params).await.unwrap();

		let sent = mock.sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].value, params.value);

		let escrow = sent[0].to.as_ref().unwrap().as_str();
		// Attributable to the swap through the leading hash prefix.
		let prefix = format!("htlc-{}", &params.secret_hash.to_hex()[..20]);
		assert!(escrow.starts_with(&prefix), "unexpected escrow id {escrow}");

		match &sent[0].payload {
			TxPayload::HtlcInitiate {
				recipient,
				secret_hash,
				expiration,
			} => {
				assert_eq!(recipient, &params.recipient_address);
				assert_eq!(secret_hash, &params.secret_hash);
				assert_eq!(*expiration, params.expiration);
			}
			other => panic!("expected initiate payload, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn initiate_rejects_malformed_params_before_any_network_call() {
		let mut params = params();
		params.value = 0;
		let mock = Arc::new(MockChain::with_receipt(Lookup::Missing));
		let stack = stack_with(mock.clone());

		let err = stack.swap().unwrap().initiate_swap(&params).await.unwrap_err();
		assert!(matches!(err, ClientError::Validation(_)));
		assert_eq!(mock.calls(), 0);
	}

	#[tokio::test]
	async fn fund_is_a_noop_on_this_chain_family() {
		let params = params();
		let mock = Arc::new(MockChain::with_receipt(Lookup::Missing));
		let stack = stack_with(mock.clone());
		let swap = stack.swap().unwrap();

		let hash = TxHash::new("init-tx");
		assert!(swap.fund_swap(&params, &hash).await.unwrap().is_none());
		assert!(swap
			.find_fund_swap_transaction(&params, &hash)
			.await
			.unwrap()
			.is_none());
		assert_eq!(mock.calls(), 0);
	}

	#[tokio::test]
	async fn claim_with_wrong_secret_fails_locally() {
		let params = params();
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(initiation_receipt(
			&params,
		))));
		let stack = stack_with(mock.clone());

		let wrong = Secret::from_bytes([2u8; 32]);
		let err = stack
			.swap()
			.unwrap()
			.claim_swap(&params, &TxHash::new("init-tx"), &wrong)
			.await
			.unwrap_err();

		assert!(matches!(err, ClientError::Validation(_)));
		assert_eq!(mock.calls(), 0, "wrong secret must not reach the network");
	}

	#[tokio::test]
	async fn claim_distinguishes_missing_from_pending_initiation() {
		let params = params();

		let mock = Arc::new(MockChain::with_receipt(Lookup::Missing));
		let stack = stack_with(mock);
		let err = stack
			.swap()
			.unwrap()
			.claim_swap(&params, &TxHash::new("absent"), &secret())
			.await
			.unwrap_err();
		assert!(matches!(err, ClientError::TxNotFound { .. }));

		let mock = Arc::new(MockChain::with_receipt(Lookup::Pending));
		let stack = stack_with(mock);
		let err = stack
			.swap()
			.unwrap()
			.claim_swap(&params, &TxHash::new("pending"), &secret())
			.await
			.unwrap_err();
		assert!(matches!(err, ClientError::PendingTx { .. }));
	}

	#[tokio::test]
	async fn claim_refuses_a_mismatched_initiation() {
		let params = params();
		let mut receipt = initiation_receipt(&params);
		receipt.value = 99_999;
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(receipt)));
		let stack = stack_with(mock.clone());

		let err = stack
			.swap()
			.unwrap()
			.claim_swap(&params, &TxHash::new("init-tx"), &secret())
			.await
			.unwrap_err();

		assert!(matches!(err, ClientError::Validation(_)));
		assert!(mock.sent().is_empty(), "no claim may be broadcast");
	}

	#[tokio::test]
	async fn claim_invokes_the_escrow_claim_path_with_the_secret() {
		let params = params();
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(initiation_receipt(
			&params,
		))));
		let stack = stack_with(mock.clone());

		stack
			.swap()
			.unwrap()
			.claim_swap(&params, &TxHash::new("init-tx"), &secret())
			.await
			.unwrap();

		let sent = mock.sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].to.as_ref().unwrap().as_str(), "htlc-escrow-1");
		match &sent[0].payload {
			TxPayload::HtlcClaim { secret: revealed } => assert_eq!(revealed, &secret()),
			other => panic!("expected claim payload, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn refund_is_refused_while_the_chain_clock_is_before_expiration() {
		let params = params();
		let mock = Arc::new(
			MockChain::with_receipt(Lookup::Found(initiation_receipt(&params)))
				.with_tip(params.expiration - 1),
		);
		let stack = stack_with(mock.clone());

		let err = stack
			.swap()
			.unwrap()
			.refund_swap(&params, &TxHash::new("init-tx"))
			.await
			.unwrap_err();

		assert!(matches!(err, ClientError::Validation(_)));
		assert!(mock.sent().is_empty());
	}

	#[tokio::test]
	async fn refund_after_expiration_invokes_the_refund_path() {
		let params = params();
		let mock = Arc::new(
			MockChain::with_receipt(Lookup::Found(initiation_receipt(&params)))
				.with_tip(params.expiration),
		);
		let stack = stack_with(mock.clone());

		stack
			.swap()
			.unwrap()
			.refund_swap(&params, &TxHash::new("init-tx"))
			.await
			.unwrap();

		let sent = mock.sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].to.as_ref().unwrap().as_str(), "htlc-escrow-1");
		assert!(matches!(sent[0].payload, TxPayload::HtlcRefund));
	}

	#[tokio::test]
	async fn verification_reports_mismatch_as_false_not_error() {
		let params = params();
		let mut receipt = initiation_receipt(&params);
		receipt.swap.as_mut().unwrap().expiration += 1;
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(receipt)));
		let stack = stack_with(mock);

		let verified = stack
			.swap()
			.unwrap()
			.verify_initiate_swap_transaction(&params, &TxHash::new("init-tx"))
			.await
			.unwrap();
		assert!(!verified);
	}

	#[tokio::test]
	async fn verification_requires_execution_success() {
		let params = params();
		let mut receipt = initiation_receipt(&params);
		receipt.success = false;
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(receipt)));
		let stack = stack_with(mock);

		let verified = stack
			.swap()
			.unwrap()
			.verify_initiate_swap_transaction(&params, &TxHash::new("init-tx"))
			.await
			.unwrap();
		assert!(!verified);
	}

	#[tokio::test]
	async fn verification_is_idempotent_for_a_confirmed_transaction() {
		let params = params();
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(initiation_receipt(
			&params,
		))));
		let stack = stack_with(mock.clone());
		let swap = stack.swap().unwrap();
		let hash = TxHash::new("init-tx");

		let first = swap
			.verify_initiate_swap_transaction(&params, &hash)
			.await
			.unwrap();
		let second = swap
			.verify_initiate_swap_transaction(&params, &hash)
			.await
			.unwrap();
		assert!(first && second);
		assert_eq!(mock.calls(), 2, "each verification fetches fresh evidence");
	}

	#[tokio::test]
	async fn extracted_secret_round_trips_through_a_claim_receipt() {
		let params = params();
		let mut receipt = initiation_receipt(&params);
		receipt.swap.as_mut().unwrap().secret = Some(secret());
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(receipt)));
		let stack = stack_with(mock);

		let revealed = stack
			.swap()
			.unwrap()
			.get_swap_secret(&TxHash::new("claim-tx"))
			.await
			.unwrap();
		assert_eq!(revealed, secret());
	}

	#[tokio::test]
	async fn secret_extraction_rejects_non_claim_transactions() {
		let params = params();
		let mock = Arc::new(MockChain::with_receipt(Lookup::Found(initiation_receipt(
			&params,
		))));
		let stack = stack_with(mock);

		let err = stack
			.swap()
			.unwrap()
			.get_swap_secret(&TxHash::new("init-tx"))
			.await
			.unwrap_err();
		assert!(matches!(err, ClientError::SwapSecretMissing { .. }));
	}

	#[tokio::test]
	async fn unbound_engine_reports_itself_unusable() {
		let engine = HtlcSwapProvider::new();
		let err = engine
			.get_swap_secret(&TxHash::new("claim-tx"))
			.await
			.unwrap_err();
		assert!(matches!(err, ClientError::Unsupported(_)));
	}
}
