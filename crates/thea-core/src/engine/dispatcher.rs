//! Direct or relayed execution of an action.
//!
//! The owner's native balance decides the path. Above the threshold the owner
//! pays for its own approvals and the action; below it the action is signed
//! off-chain and handed to the network's relayer.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use std::fmt;
use std::sync::Arc;
use thea_delivery::RelayerInterface;
use thea_types::{ContractDetails, RelayerRequest, TheaError, TransactionReceipt};

use super::context::ClientContext;

/// Native balance from which the owner pays for its own transactions (0.001 of the native unit).
pub const DIRECT_EXECUTION_THRESHOLD: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

pub enum ExecutionPath {
	Direct,
	Relayed(Arc<dyn RelayerInterface>),
}

impl fmt::Debug for ExecutionPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExecutionPath::Direct => f.write_str("Direct"),
			ExecutionPath::Relayed(_) => f.write_str("Relayed"),
		}
	}
}

pub struct Dispatcher<'a> {
	ctx: &'a ClientContext,
}

impl<'a> Dispatcher<'a> {
	pub fn new(ctx: &'a ClientContext) -> Self {
		Self { ctx }
	}

	/// Chooses how `owner` will run the next action.
	///
	/// A balance exactly at [`DIRECT_EXECUTION_THRESHOLD`] takes the direct
	/// path: the comparison is `>=`, not a strict `>`.
	///
	/// Fails with `RelayerNotConfigured` when the balance is short and the
	/// network has no relayer, before anything is signed.
	pub async fn select_path(&self, owner: Address) -> Result<ExecutionPath, TheaError> {
		let balance = self.ctx.delivery.get_balance(owner).await.map_err(|e| {
			TheaError::contract_call(
				ContractDetails::new("Provider", owner, "getBalance"),
				e,
			)
		})?;

		if balance >= DIRECT_EXECUTION_THRESHOLD {
			tracing::info!(%owner, %balance, path = "direct", "Selected execution path");
			return Ok(ExecutionPath::Direct);
		}

		match &self.ctx.relayer {
			Some(relayer) => {
				tracing::info!(%owner, %balance, path = "relayed", "Selected execution path");
				Ok(ExecutionPath::Relayed(relayer.clone()))
			},
			None => {
				tracing::warn!(
					%owner,
					%balance,
					chain_id = self.ctx.chain_id(),
					"Balance below direct threshold and no relayer configured"
				);
				Err(TheaError::RelayerNotConfigured(self.ctx.chain_id()))
			},
		}
	}

	/// Submits the call from the owner and waits for it.
	pub async fn execute<C: SolCall>(
		&self,
		call: &C,
		details: &ContractDetails,
	) -> Result<TransactionReceipt, TheaError> {
		self.ctx.send(call, details).await
	}

	/// Hands the encoded call to the relayer, then fetches its receipt from the chain.
	pub async fn relay<C: SolCall>(
		&self,
		relayer: &dyn RelayerInterface,
		call: &C,
		details: &ContractDetails,
	) -> Result<TransactionReceipt, TheaError> {
		let request = RelayerRequest {
			to: details.address,
			data: call.abi_encode().into(),
		};
		tracing::debug!(contract = %details, data_len = request.data.len(), "Relaying call");

		let hash = relayer
			.relay(&request)
			.await
			.map_err(|e| TheaError::contract_call(details.clone(), e))?;
		tracing::info!(tx_hash = %hash, contract = %details, "Relayer accepted call");

		let receipt = self
			.ctx
			.delivery
			.get_receipt(&hash)
			.await
			.map_err(|e| TheaError::contract_call(details.clone(), e))?;
		tracing::info!(
			tx_hash = %hash,
			block_number = receipt.block_number,
			"Fetched relayed receipt"
		);
		Ok(receipt)
	}
}
