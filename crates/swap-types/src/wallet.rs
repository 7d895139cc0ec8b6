//! Wallet capability: address book and message signing.
//!
//! Key custody stays behind this trait; the core never sees private keys.

use crate::common::Address;
use crate::errors::Result;
use async_trait::async_trait;

#[async_trait]
pub trait WalletCapability: Send + Sync {
	/// All addresses the wallet controls.
	async fn get_addresses(&self) -> Result<Vec<Address>>;

	/// An address with no on-chain history, suitable as a fresh refund or
	/// recipient address.
	async fn get_unused_address(&self) -> Result<Address>;

	async fn get_used_addresses(&self) -> Result<Vec<Address>>;

	/// Signs an arbitrary message with the key behind `from`.
	async fn sign_message(&self, message: &[u8], from: &Address) -> Result<Vec<u8>>;
}
