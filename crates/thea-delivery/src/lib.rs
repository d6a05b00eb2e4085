//! Chain and relayer access for the Thea SDK.
//!
//! Two seams live here. [`DeliveryInterface`] is everything the SDK needs from
//! an RPC node: native balance, read-only calls, transaction submission and
//! receipts. [`RelayerInterface`] forwards a signed meta-transaction to a
//! gas-less relayer and returns the hash it was mined under.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use thea_types::{RelayerRequest, Transaction, TransactionHash, TransactionReceipt};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod relayer {
		pub mod http;
	}
}

pub use implementations::evm::alloy::AlloyDelivery;
pub use implementations::relayer::http::HttpRelayer;

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when a transaction execution fails.
	#[error("Transaction failed: {0}")]
	TransactionFailed(String),
	/// Error returned by the relayer or a malformed relayer reply.
	#[error("Relayer error: {0}")]
	Relayer(String),
}

/// Trait defining the interface for chain access.
///
/// One instance is bound to one chain; the SDK never switches networks after
/// it has been built.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait DeliveryInterface: Send + Sync {
	/// Chain id reported by the connected node.
	async fn chain_id(&self) -> Result<u64, DeliveryError>;

	/// Signs (or has the node sign) and submits a transaction.
	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError>;

	/// Waits until the transaction has the given number of confirmations and
	/// returns its receipt.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError>;

	/// Retrieves the receipt of an already mined transaction.
	async fn get_receipt(&self, hash: &TransactionHash) -> Result<TransactionReceipt, DeliveryError>;

	/// Native gas-token balance in wei.
	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError>;

	/// Executes a contract call without sending a transaction.
	async fn eth_call(&self, tx: Transaction) -> Result<Bytes, DeliveryError>;
}

/// Trait defining the interface for gas-less relayers.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait RelayerInterface: Send + Sync {
	/// Forwards the call and returns the hash of the relayed transaction.
	async fn relay(&self, request: &RelayerRequest) -> Result<TransactionHash, DeliveryError>;
}
