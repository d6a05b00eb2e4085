//! Transaction, receipt and relayer payload types.
//!
//! These mirror what the chain returns after execution, independent of which
//! path submitted the transaction. Receipts fetched after a relay carry raw
//! logs only; decoding them is left to the caller.

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_rpc_types::TransactionRequest;
use serde::{Deserialize, Serialize};

/// Transaction hash.
pub type TransactionHash = B256;

/// A contract call to be signed and submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Target contract.
	pub to: Address,
	/// ABI-encoded call data.
	pub data: Bytes,
	/// Native value to attach.
	pub value: U256,
	/// Chain ID for replay protection.
	pub chain_id: u64,
	/// Sender, filled by the delivery layer when unset.
	pub from: Option<Address>,
	/// Gas limit, estimated by the provider when unset.
	pub gas_limit: Option<u64>,
}

impl Transaction {
	/// Creates a zero-value call.
	pub fn call(chain_id: u64, to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			to,
			data: data.into(),
			value: U256::ZERO,
			chain_id,
			from: None,
			gas_limit: None,
		}
	}

	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}
}

impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		let mut request = TransactionRequest::default()
			.to(tx.to)
			.input(tx.data.into())
			.value(tx.value);
		request.chain_id = Some(tx.chain_id);
		request.gas = tx.gas_limit;
		if let Some(from) = tx.from {
			request = request.from(from);
		}
		request
	}
}

/// Event log emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
	/// Contract that emitted the log.
	pub address: Address,
	/// Topic 0 is the event signature hash for non-anonymous events.
	pub topics: Vec<B256>,
	/// Non-indexed event data.
	pub data: Bytes,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	pub transaction_hash: TransactionHash,
	pub block_number: u64,
	pub from: Address,
	pub to: Option<Address>,
	/// Whether execution succeeded.
	pub status: bool,
	pub logs: Vec<Log>,
}

/// Body posted to the relayer: an opaque call it forwards to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerRequest {
	pub to: Address,
	pub data: Bytes,
}

/// Relayer reply; `result` is the transaction hash encoded as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayerResponse {
	pub result: String,
}
