//! Client façade over a provider stack.

use crate::stack::ProviderStack;
use std::sync::Arc;
use swap_types::{ChainCapability, ClientError, FeeCapability, SwapCapability, WalletCapability};

/// Uniform entry point for wallet applications and swap tooling.
///
/// Capability lookups go through the stack by default. The chain, wallet,
/// and swap slots can each be overridden individually; assigning one
/// replaces only that slot and leaves the others resolving through the
/// stack.
pub struct Client {
	stack: Arc<ProviderStack>,
	chain: Option<Arc<dyn ChainCapability>>,
	wallet: Option<Arc<dyn WalletCapability>>,
	swap: Option<Arc<dyn SwapCapability>>,
}

impl Client {
	pub fn new(stack: Arc<ProviderStack>) -> Self {
		Self {
			stack,
			chain: None,
			wallet: None,
			swap: None,
		}
	}

	pub fn stack(&self) -> &Arc<ProviderStack> {
		&self.stack
	}

	pub fn chain(&self) -> Result<&dyn ChainCapability, ClientError> {
		if let Some(chain) = &self.chain {
			return Ok(chain.as_ref());
		}
		self.stack.chain()
	}

	pub fn set_chain(&mut self, provider: Arc<dyn ChainCapability>) {
		self.chain = Some(provider);
	}

	pub fn wallet(&self) -> Result<&dyn WalletCapability, ClientError> {
		if let Some(wallet) = &self.wallet {
			return Ok(wallet.as_ref());
		}
		self.stack.wallet()
	}

	pub fn set_wallet(&mut self, provider: Arc<dyn WalletCapability>) {
		self.wallet = Some(provider);
	}

	pub fn swap(&self) -> Result<&dyn SwapCapability, ClientError> {
		if let Some(swap) = &self.swap {
			return Ok(swap.as_ref());
		}
		self.stack.swap()
	}

	pub fn set_swap(&mut self, provider: Arc<dyn SwapCapability>) {
		self.swap = Some(provider);
	}

	pub fn fees(&self) -> Result<&dyn FeeCapability, ClientError> {
		self.stack.fee()
	}
}
