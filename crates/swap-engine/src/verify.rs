//! Pure swap verification.
//!
//! Every trust decision here is an exact equality check against the agreed
//! parameters. No heuristics, no tolerances: atomic-swap security depends on
//! exact matches, and a counterparty-supplied transaction that differs in
//! any single field is either fraudulent or unrelated.
//!
//! All functions are side-effect-free given the fetched evidence and safe to
//! run in parallel for independent swaps.

use swap_types::{ClientError, Result, Secret, SecretHash, SwapParams, SwapTransaction};

/// Checks the locally-checkable shape of swap parameters. Fails before any
/// network call is worth making.
pub fn validate_swap_params(params: &SwapParams) -> Result<()> {
	if params.value == 0 {
		return Err(ClientError::Validation(
			"swap value must be positive".to_string(),
		));
	}
	if params.recipient_address.is_empty() {
		return Err(ClientError::Validation(
			"recipient address must not be empty".to_string(),
		));
	}
	if params.refund_address.is_empty() {
		return Err(ClientError::Validation(
			"refund address must not be empty".to_string(),
		));
	}
	if params.expiration == 0 {
		return Err(ClientError::Validation(
			"expiration must be positive".to_string(),
		));
	}
	Ok(())
}

/// Checks that `secret` is the preimage of `secret_hash`.
pub fn validate_secret_and_hash(secret: &Secret, secret_hash: &SecretHash) -> Result<()> {
	let digest = SecretHash::from_secret(secret);
	if !digest.constant_time_eq(secret_hash) {
		return Err(ClientError::Validation(
			"secret does not hash to the agreed secret hash".to_string(),
		));
	}
	Ok(())
}

/// Decides whether `tx` is the legitimate on-chain initiation of `params`.
///
/// True iff the transaction carries a swap record, executed the canonical
/// swap contract, escrows exactly the agreed value, and binds the agreed
/// recipient, secret hash, and expiration, with the refund party as sender.
/// A well-formed but mismatched transaction yields `false`, never an error.
pub fn matches_initiation(params: &SwapParams, tx: &SwapTransaction, swap_code_hash: &str) -> bool {
	let Some(swap) = tx.swap.as_ref() else {
		return false;
	};
	tx.code_hash == swap_code_hash
		&& tx.value == params.value
		&& swap.recipient == params.recipient_address
		&& swap.secret_hash.constant_time_eq(&params.secret_hash)
		&& swap.expiration == params.expiration
		&& tx.sender == params.refund_address
}

/// Extracts the secret a claim transaction revealed.
pub fn extract_secret(tx: &SwapTransaction) -> Result<Secret> {
	tx.swap
		.as_ref()
		.and_then(|swap| swap.secret.clone())
		.ok_or_else(|| ClientError::SwapSecretMissing {
			hash: tx.hash.clone(),
		})
}
