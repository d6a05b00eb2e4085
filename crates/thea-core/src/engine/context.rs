//! Shared state of a constructed client.
//!
//! Everything here is fixed when the client is built: the network profile,
//! the resolved address book, the credentials and the transports. Handlers
//! borrow it for the duration of one action.

use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use std::sync::Arc;
use thea_account::Credentials;
use thea_api::{HttpClient, SubgraphClient};
use thea_delivery::{DeliveryInterface, RelayerInterface};
use thea_types::{
	ContractDetails, NetworkProfile, ResolvedAddresses, TheaError, Transaction, TransactionReceipt,
};

use super::contracts::{BASE_TOKEN_MANAGER, REGISTRY, THEA_ERC1155};

/// Confirmations awaited for every directly submitted transaction.
pub const REQUIRED_CONFIRMATIONS: u64 = 1;

pub struct ClientContext {
	pub profile: NetworkProfile,
	pub addresses: ResolvedAddresses,
	pub credentials: Credentials,
	pub delivery: Arc<dyn DeliveryInterface>,
	pub relayer: Option<Arc<dyn RelayerInterface>>,
	pub api: HttpClient,
	pub subgraph: SubgraphClient,
}

impl ClientContext {
	pub fn chain_id(&self) -> u64 {
		self.profile.chain_id()
	}

	/// Address acting on the caller's behalf, or `SignerRequired`.
	pub fn owner(&self) -> Result<Address, TheaError> {
		self.credentials.address()
	}

	pub fn registry(&self, function: &str) -> ContractDetails {
		ContractDetails::new(REGISTRY, self.addresses.contracts.registry, function)
	}

	pub fn base_token_manager(&self, function: &str) -> Result<ContractDetails, TheaError> {
		Ok(ContractDetails::new(
			BASE_TOKEN_MANAGER,
			self.profile.base_token_manager()?,
			function,
		))
	}

	pub fn erc1155(&self, function: &str) -> ContractDetails {
		ContractDetails::new(THEA_ERC1155, self.addresses.contracts.thea_erc1155, function)
	}

	/// Runs a view call against `details.address` and decodes its return.
	pub async fn read<C: SolCall>(
		&self,
		call: &C,
		details: &ContractDetails,
	) -> Result<C::Return, TheaError> {
		let tx = Transaction::call(self.chain_id(), details.address, call.abi_encode());
		let output = self
			.delivery
			.eth_call(tx)
			.await
			.map_err(|e| TheaError::contract_call(details.clone(), e))?;

		C::abi_decode_returns(&output).map_err(|e| {
			TheaError::contract_call(details.clone(), format!("Failed to decode return data: {}", e))
		})
	}

	/// Submits a call from the owner and waits for one confirmation.
	pub async fn send<C: SolCall>(
		&self,
		call: &C,
		details: &ContractDetails,
	) -> Result<TransactionReceipt, TheaError> {
		let owner = self.owner()?;
		let tx = Transaction::call(self.chain_id(), details.address, call.abi_encode()).with_from(owner);

		tracing::debug!(
			contract = %details,
			data_len = tx.data.len(),
			"Submitting contract call"
		);

		let hash = self
			.delivery
			.submit(tx)
			.await
			.map_err(|e| TheaError::contract_call(details.clone(), e))?;

		let receipt = self
			.delivery
			.wait_for_confirmation(&hash, REQUIRED_CONFIRMATIONS)
			.await
			.map_err(|e| TheaError::contract_call(details.clone(), e))?;

		tracing::info!(
			tx_hash = %receipt.transaction_hash,
			contract = %details,
			"Contract call confirmed"
		);
		Ok(receipt)
	}
}
