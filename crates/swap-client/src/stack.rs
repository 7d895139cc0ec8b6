//! Layered capability provider registry.
//!
//! Resolution is topmost-wins: the provider registered last that exposes the
//! requested capability answers it. The `*_above` variants restrict the scan
//! to providers registered strictly after a given index, so a layer can
//! reach a shared capability without resolving into itself.
//!
//! # Thread safety
//!
//! The stack is immutable once built and safe to share behind `Arc`.
//! Configure it fully before concurrent use; there is no post-build
//! mutation to guard.

use std::sync::{Arc, Weak};
use swap_types::{
	Capability, ChainCapability, ClientError, FeeCapability, SwapCapability, WalletCapability,
};
use tracing::debug;

/// A unit of chain, swap, wallet, or fee functionality that can be layered
/// onto a [`ProviderStack`].
///
/// A provider exposes whichever capability groups it implements by
/// overriding the corresponding accessor; the defaults expose nothing.
pub trait Provider: Send + Sync {
	fn as_chain(&self) -> Option<&dyn ChainCapability> {
		None
	}

	fn as_swap(&self) -> Option<&dyn SwapCapability> {
		None
	}

	fn as_wallet(&self) -> Option<&dyn WalletCapability> {
		None
	}

	fn as_fee(&self) -> Option<&dyn FeeCapability> {
		None
	}

	/// Called once when the stack is built. Providers that call back into
	/// the stack keep the anchor; pure leaf providers ignore it.
	fn bind(&self, _anchor: StackAnchor) {}
}

/// Back-reference a provider holds into the stack it was registered on.
///
/// Holds the stack weakly so providers and stack do not keep each other
/// alive in a cycle.
#[derive(Clone)]
pub struct StackAnchor {
	stack: Weak<ProviderStack>,
	index: usize,
}

impl StackAnchor {
	pub fn stack(&self) -> Result<Arc<ProviderStack>, ClientError> {
		self.stack
			.upgrade()
			.ok_or(ClientError::Unsupported("provider stack has been dropped"))
	}

	/// Position of the holding provider in the stack.
	pub fn index(&self) -> usize {
		self.index
	}
}

/// Ordered provider registry with topmost-wins capability resolution.
pub struct ProviderStack {
	providers: Vec<Arc<dyn Provider>>,
}

impl ProviderStack {
	pub fn builder() -> ProviderStackBuilder {
		ProviderStackBuilder::new()
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}

	fn resolve<'s, T: ?Sized>(
		&'s self,
		capability: Capability,
		above: Option<usize>,
		accessor: impl Fn(&'s dyn Provider) -> Option<&'s T>,
	) -> Result<&'s T, ClientError> {
		let floor = above.map_or(0, |index| index + 1);
		self.providers
			.get(floor..)
			.unwrap_or(&[])
			.iter()
			.rev()
			.find_map(|provider| accessor(provider.as_ref()))
			.ok_or(ClientError::NoProvider(capability))
	}

	/// Topmost provider exposing chain access.
	pub fn chain(&self) -> Result<&dyn ChainCapability, ClientError> {
		self.resolve(Capability::Chain, None, |p| p.as_chain())
	}

	/// Chain access among providers registered strictly after `index`.
	pub fn chain_above(&self, index: usize) -> Result<&dyn ChainCapability, ClientError> {
		self.resolve(Capability::Chain, Some(index), |p| p.as_chain())
	}

	pub fn swap(&self) -> Result<&dyn SwapCapability, ClientError> {
		self.resolve(Capability::Swap, None, |p| p.as_swap())
	}

	pub fn swap_above(&self, index: usize) -> Result<&dyn SwapCapability, ClientError> {
		self.resolve(Capability::Swap, Some(index), |p| p.as_swap())
	}

	pub fn wallet(&self) -> Result<&dyn WalletCapability, ClientError> {
		self.resolve(Capability::Wallet, None, |p| p.as_wallet())
	}

	pub fn wallet_above(&self, index: usize) -> Result<&dyn WalletCapability, ClientError> {
		self.resolve(Capability::Wallet, Some(index), |p| p.as_wallet())
	}

	pub fn fee(&self) -> Result<&dyn FeeCapability, ClientError> {
		self.resolve(Capability::Fee, None, |p| p.as_fee())
	}

	pub fn fee_above(&self, index: usize) -> Result<&dyn FeeCapability, ClientError> {
		self.resolve(Capability::Fee, Some(index), |p| p.as_fee())
	}
}

/// Builds a stack and binds every provider to it.
#[derive(Default)]
pub struct ProviderStackBuilder {
	providers: Vec<Arc<dyn Provider>>,
}

impl ProviderStackBuilder {
	pub fn new() -> Self {
		Self {
			providers: Vec::new(),
		}
	}

	/// Registers a provider on top of the stack.
	pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
		self.providers.push(provider);
		self
	}

	pub fn build(self) -> Arc<ProviderStack> {
		let stack = Arc::new(ProviderStack {
			providers: self.providers,
		});
		for (index, provider) in stack.providers.iter().enumerate() {
			debug!(index, "binding provider to stack");
			provider.bind(StackAnchor {
				stack: Arc::downgrade(&stack),
				index,
			});
		}
		stack
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::sync::OnceLock;
	use swap_types::{
		Block, Lookup, Result, SendRequest, SwapTransaction, Timestamp, Transaction, TxHash,
	};

	// Chain capability stub distinguishable by its code fingerprint.
	struct StaticChain {
		code: &'static str,
	}

	#[async_trait]
	impl ChainCapability for StaticChain {
		async fn send_transaction(&self, _: SendRequest) -> Result<Transaction> {
			Err(ClientError::Unsupported("static chain"))
		}

		async fn find_transaction_receipt(&self, _: &TxHash) -> Result<Lookup<SwapTransaction>> {
			Ok(Lookup::Missing)
		}

		async fn get_transaction(&self, _: &TxHash) -> Result<Lookup<Transaction>> {
			Ok(Lookup::Missing)
		}

		async fn get_block_by_hash(&self, _: &str) -> Result<Option<Block>> {
			Ok(None)
		}

		async fn get_block_by_number(&self, _: u64) -> Result<Option<Block>> {
			Ok(None)
		}

		async fn get_block_height(&self) -> Result<u64> {
			Ok(0)
		}

		async fn latest_block_timestamp(&self) -> Result<Option<Timestamp>> {
			Ok(None)
		}

		fn swap_code_hash(&self) -> &str {
			self.code
		}
	}

	impl Provider for StaticChain {
		fn as_chain(&self) -> Option<&dyn ChainCapability> {
			Some(self)
		}
	}

	// Provider that only records the anchor it was bound with.
	#[derive(Default)]
	struct AnchorProbe {
		anchor: OnceLock<StackAnchor>,
	}

	impl Provider for AnchorProbe {
		fn bind(&self, anchor: StackAnchor) {
			let _ = self.anchor.set(anchor);
		}
	}

	#[test]
	fn topmost_provider_wins() {
		let stack = ProviderStack::builder()
			.with_provider(Arc::new(StaticChain { code: "a" }))
			.with_provider(Arc::new(StaticChain { code: "b" }))
			.build();

		assert_eq!(stack.chain().unwrap().swap_code_hash(), "b");
	}

	#[test]
	fn resolution_above_excludes_lower_layers() {
		let stack = ProviderStack::builder()
			.with_provider(Arc::new(StaticChain { code: "a" }))
			.with_provider(Arc::new(StaticChain { code: "b" }))
			.build();

		// Above index 0: only "b" is eligible.
		assert_eq!(stack.chain_above(0).unwrap().swap_code_hash(), "b");

		// Above the topmost provider nothing is left.
		let err = stack.chain_above(1).map(|_| ()).unwrap_err();
		assert!(matches!(err, ClientError::NoProvider(Capability::Chain)));
	}

	#[test]
	fn unimplemented_capability_is_reported() {
		let stack = ProviderStack::builder()
			.with_provider(Arc::new(StaticChain { code: "a" }))
			.build();

		let err = stack.wallet().map(|_| ()).unwrap_err();
		assert!(matches!(err, ClientError::NoProvider(Capability::Wallet)));
	}

	#[test]
	fn providers_are_bound_with_their_index() {
		let probe = Arc::new(AnchorProbe::default());
		let stack = ProviderStack::builder()
			.with_provider(Arc::new(StaticChain { code: "a" }))
			.with_provider(probe.clone())
			.build();

		let anchor = probe.anchor.get().expect("probe was bound");
		assert_eq!(anchor.index(), 1);

		// The anchor resolves back into the live stack.
		let resolved = anchor.stack().unwrap();
		assert_eq!(resolved.chain().unwrap().swap_code_hash(), "a");
		assert_eq!(stack.len(), 2);
	}

	#[test]
	fn anchor_outliving_the_stack_reports_unsupported() {
		let probe = Arc::new(AnchorProbe::default());
		let stack = ProviderStack::builder().with_provider(probe.clone()).build();
		drop(stack);

		let anchor = probe.anchor.get().expect("probe was bound");
		assert!(matches!(
			anchor.stack(),
			Err(ClientError::Unsupported(_))
		));
	}
}
