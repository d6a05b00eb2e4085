//! Local private-key signer.
//!
//! Holds the key in memory and signs typed-data digests directly. Also hands
//! out an [`EthereumWallet`] so the delivery layer can sign transactions with
//! the same key.

use crate::{AccountError, TypedDataSigner};
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use thea_types::{RawSignature, SecretString, TypedMessage};

/// Wallet backed by a private key held in memory.
#[derive(Debug, Clone)]
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a hex-encoded private key, with or without `0x`.
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let signer = private_key_hex
			.trim()
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;

		Ok(Self { signer })
	}

	pub fn from_secret(private_key: &SecretString) -> Result<Self, AccountError> {
		private_key.with_exposed(Self::new)
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Transaction-signing wallet for the alloy provider.
	pub fn ethereum_wallet(&self) -> EthereumWallet {
		EthereumWallet::from(self.signer.clone())
	}
}

#[async_trait]
impl TypedDataSigner for LocalWallet {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_typed_data(&self, message: &TypedMessage) -> Result<RawSignature, AccountError> {
		tracing::debug!(
			primary_type = %message.primary_type,
			domain = %message.domain.name,
			"Signing typed data"
		);
		let signature = self.signer.sign_hash(&message.digest).await.map_err(|e| {
			AccountError::SigningFailed(format!("Failed to sign typed data: {}", e))
		})?;

		Ok(signature.into())
	}
}
