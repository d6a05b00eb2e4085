//! Credential model for the Thea SDK.
//!
//! The SDK never holds keys on its own: callers inject [`Credentials`]. What a
//! credential can do is decided by its variant, not tested at runtime. A
//! read-only client can query, a node-managed account can also send
//! transactions, and only a [`TypedDataSigner`] can produce the EIP-712
//! signatures the relayed path, login and options orders need.

use alloy_primitives::Address;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thea_types::{RawSignature, TheaError, TypedMessage};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalWallet;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Error that occurs when interacting with the signer implementation.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

impl From<AccountError> for TheaError {
	fn from(err: AccountError) -> Self {
		TheaError::SigningFailed(err.to_string())
	}
}

/// Capability to sign EIP-712 typed data.
///
/// Implementations receive the full typed message, including the precomputed
/// digest, and return the raw 65-byte signature exactly as their backend
/// produced it. Layout normalisation happens afterwards in the SDK.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait TypedDataSigner: Send + Sync {
	/// Address whose key produces the signatures.
	fn address(&self) -> Address;

	/// Signs the typed message.
	async fn sign_typed_data(&self, message: &TypedMessage) -> Result<RawSignature, AccountError>;
}

/// What the SDK is allowed to do on behalf of the caller.
#[derive(Clone)]
pub enum Credentials {
	/// Queries only.
	ReadOnly,
	/// Account unlocked on the node: can send transactions, cannot sign typed data.
	Unlocked(Address),
	/// Full signer with typed-data capability.
	Signer(Arc<dyn TypedDataSigner>),
}

impl Credentials {
	pub fn signer(signer: impl TypedDataSigner + 'static) -> Self {
		Credentials::Signer(Arc::new(signer))
	}

	/// Address that sends transactions, or `SignerRequired`.
	pub fn address(&self) -> Result<Address, TheaError> {
		match self {
			Credentials::ReadOnly => Err(TheaError::SignerRequired),
			Credentials::Unlocked(address) => Ok(*address),
			Credentials::Signer(signer) => Ok(signer.address()),
		}
	}

	/// Typed-data signer, or `TypedDataSignerRequired`.
	pub fn typed_data_signer(&self) -> Result<&dyn TypedDataSigner, TheaError> {
		match self {
			Credentials::Signer(signer) => Ok(signer.as_ref()),
			_ => Err(TheaError::TypedDataSignerRequired),
		}
	}

	pub fn can_send_transactions(&self) -> bool {
		!matches!(self, Credentials::ReadOnly)
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Credentials::ReadOnly => write!(f, "Credentials::ReadOnly"),
			Credentials::Unlocked(address) => write!(f, "Credentials::Unlocked({})", address),
			Credentials::Signer(signer) => write!(f, "Credentials::Signer({})", signer.address()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TEST_PRIVATE_KEY: &str =
		"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	#[test]
	fn test_read_only_cannot_send_or_sign() {
		let credentials = Credentials::ReadOnly;
		assert!(!credentials.can_send_transactions());
		assert!(matches!(credentials.address(), Err(TheaError::SignerRequired)));
		assert!(matches!(
			credentials.typed_data_signer(),
			Err(TheaError::TypedDataSignerRequired)
		));
	}

	#[test]
	fn test_unlocked_account_cannot_sign_typed_data() {
		let address = Address::repeat_byte(0x42);
		let credentials = Credentials::Unlocked(address);
		assert!(credentials.can_send_transactions());
		assert_eq!(credentials.address().unwrap(), address);
		assert!(matches!(
			credentials.typed_data_signer(),
			Err(TheaError::TypedDataSignerRequired)
		));
	}

	#[test]
	fn test_signer_has_every_capability() {
		let wallet = LocalWallet::new(TEST_PRIVATE_KEY).unwrap();
		let expected = wallet.address();
		let credentials = Credentials::signer(wallet);
		assert_eq!(credentials.address().unwrap(), expected);
		assert_eq!(credentials.typed_data_signer().unwrap().address(), expected);
		assert!(format!("{:?}", credentials).contains("Signer"));
	}

	#[test]
	fn test_account_error_maps_to_signing_failed() {
		let err: TheaError = AccountError::SigningFailed("hardware wallet locked".into()).into();
		assert!(matches!(err, TheaError::SigningFailed(ref m) if m.contains("locked")));
	}
}
