//! Alloy-based chain access.
//!
//! Wraps a single type-erased provider. With a wallet, transactions are signed
//! locally; without one, they are sent with `eth_sendTransaction` and signed by
//! the node's unlocked account named in `from`.

use crate::{DeliveryError, DeliveryInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{
	fillers::{ChainIdFiller, GasFiller, NonceFiller, SimpleNonceManager},
	DynProvider, PendingTransactionConfig, PendingTransactionError, Provider, ProviderBuilder,
};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::TransactionRequest;
use alloy_transport::layers::RetryBackoffLayer;
use async_trait::async_trait;
use std::time::Duration;
use thea_types::{with_0x_prefix, Log, Transaction, TransactionHash, TransactionReceipt};

/// Approximate seconds per confirmation used to size the wait timeout.
const SECONDS_PER_CONFIRMATION: u64 = 45;
const MAX_CONFIRMATION_TIMEOUT: u64 = 3600;

/// Alloy-based EVM delivery implementation.
pub struct AlloyDelivery {
	provider: DynProvider,
	/// Chain id the SDK was configured for; filled into every request.
	chain_id: u64,
}

impl AlloyDelivery {
	/// Creates a delivery over HTTP.
	///
	/// Pass a wallet to sign locally, or `None` for read-only access and
	/// node-managed accounts.
	pub fn new(
		rpc_url: &str,
		chain_id: u64,
		wallet: Option<EthereumWallet>,
	) -> Result<Self, DeliveryError> {
		let url = rpc_url.parse().map_err(|e| {
			DeliveryError::Network(format!("Invalid RPC URL {}: {}", rpc_url, e))
		})?;

		let retry_layer = RetryBackoffLayer::new(
			5,    // max_retry
			1000, // initial backoff in milliseconds
			10,   // compute units per second
		);
		let client = RpcClient::builder().layer(retry_layer).http(url);
		client.set_poll_interval(Duration::from_secs(2));

		let provider = match wallet {
			Some(wallet) => ProviderBuilder::new()
				.filler(NonceFiller::new(SimpleNonceManager::default()))
				.filler(GasFiller)
				.filler(ChainIdFiller::new(Some(chain_id)))
				.wallet(wallet)
				.connect_client(client)
				.erased(),
			None => ProviderBuilder::new().connect_client(client).erased(),
		};

		Ok(Self { provider, chain_id })
	}

	fn request(&self, mut tx: Transaction) -> TransactionRequest {
		tx.chain_id = self.chain_id;
		tx.into()
	}
}

fn convert_receipt(receipt: alloy_rpc_types::TransactionReceipt) -> TransactionReceipt {
	let logs = receipt
		.inner
		.logs()
		.iter()
		.map(|log| Log {
			address: log.address(),
			topics: log.topics().to_vec(),
			data: log.inner.data.data.clone(),
		})
		.collect();

	TransactionReceipt {
		transaction_hash: receipt.transaction_hash,
		block_number: receipt.block_number.unwrap_or(0),
		from: receipt.from,
		to: receipt.to,
		status: receipt.status(),
		logs,
	}
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get chain id: {}", e)))
	}

	async fn submit(&self, tx: Transaction) -> Result<TransactionHash, DeliveryError> {
		let request = self.request(tx);

		tracing::debug!(
			chain_id = self.chain_id,
			to = ?request.to,
			data_len = request.input.input().map(|d| d.len()).unwrap_or(0),
			"Sending transaction"
		);

		let pending_tx = self.provider.send_transaction(request).await.map_err(|e| {
			tracing::error!(chain_id = self.chain_id, "Transaction submission failed: {}", e);
			DeliveryError::Network(format!("Failed to send transaction: {}", e))
		})?;

		let tx_hash = *pending_tx.tx_hash();
		tracing::info!(
			tx_hash = %with_0x_prefix(&hex::encode(tx_hash.0)),
			chain_id = self.chain_id,
			"Transaction submitted"
		);

		Ok(tx_hash)
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		let timeout_seconds = (confirmations * SECONDS_PER_CONFIRMATION)
			.max(SECONDS_PER_CONFIRMATION)
			.min(MAX_CONFIRMATION_TIMEOUT);

		tracing::debug!(
			tx_hash = %hash,
			confirmations,
			timeout_seconds,
			"Waiting for confirmations"
		);

		let config = PendingTransactionConfig::new(*hash)
			.with_required_confirmations(confirmations)
			.with_timeout(Some(Duration::from_secs(timeout_seconds)));

		let pending_tx = self
			.provider
			.watch_pending_transaction(config)
			.await
			.map_err(|e| match e {
				PendingTransactionError::FailedToRegister => {
					DeliveryError::Network("Failed to register transaction watcher".to_string())
				},
				other => DeliveryError::Network(format!("Transaction watch failed: {}", other)),
			})?;

		let confirmed_hash = pending_tx
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to confirm transaction: {}", e)))?;

		let receipt = self.get_receipt(&confirmed_hash).await?;
		if !receipt.status {
			return Err(DeliveryError::TransactionFailed(format!(
				"Transaction {} reverted",
				confirmed_hash
			)));
		}
		Ok(receipt)
	}

	async fn get_receipt(&self, hash: &TransactionHash) -> Result<TransactionReceipt, DeliveryError> {
		match self.provider.get_transaction_receipt(*hash).await {
			Ok(Some(receipt)) => Ok(convert_receipt(receipt)),
			Ok(None) => Err(DeliveryError::Network(format!(
				"Transaction {} not found on chain {}",
				hash, self.chain_id
			))),
			Err(e) => Err(DeliveryError::Network(format!(
				"Failed to get receipt on chain {}: {}",
				self.chain_id, e
			))),
		}
	}

	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get balance: {}", e)))
	}

	async fn eth_call(&self, tx: Transaction) -> Result<Bytes, DeliveryError> {
		let request = self.request(tx);
		self.provider
			.call(request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to execute eth_call: {}", e)))
	}
}
