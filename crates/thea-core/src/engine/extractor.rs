//! Typed results reconstructed from receipt logs.
//!
//! A directly executed transaction is searched across all of its logs. A
//! relayed one is fetched separately after the relay answered, so only the logs
//! emitted by the contract under operation are considered. In both cases a
//! missing or undecodable event yields an empty payload rather than an error.

use alloy_primitives::Address;
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use thea_types::{Log, TransactionReceipt};

use super::contracts::{IBaseTokenManager, IRegistry};

/// `{id, amount}` of a convert or recover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmountEvent {
	pub id: Option<String>,
	pub amount: Option<String>,
}

/// Request id of an unwrap or fungible retirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdEvent {
	pub request_id: Option<String>,
}

/// Action payload merged with the receipt it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extracted<T> {
	#[serde(flatten)]
	pub response: T,
	#[serde(flatten)]
	pub receipt: TransactionReceipt,
}

/// Event an action reports its result through.
pub trait ResponseEvent: SolEvent {
	type Response: Default;

	fn response(&self) -> Self::Response;
}

impl ResponseEvent for IBaseTokenManager::Converted {
	type Response = TokenAmountEvent;

	fn response(&self) -> TokenAmountEvent {
		TokenAmountEvent {
			id: Some(self.tokenId.to_string()),
			amount: Some(self.amount.to_string()),
		}
	}
}

impl ResponseEvent for IBaseTokenManager::Recovered {
	type Response = TokenAmountEvent;

	fn response(&self) -> TokenAmountEvent {
		TokenAmountEvent {
			id: Some(self.tokenId.to_string()),
			amount: Some(self.amount.to_string()),
		}
	}
}

impl ResponseEvent for IRegistry::UnwrapRequested {
	type Response = RequestIdEvent;

	fn response(&self) -> RequestIdEvent {
		RequestIdEvent {
			request_id: Some(self.requestId.to_string()),
		}
	}
}

impl ResponseEvent for IRegistry::RetireFungibleRequested {
	type Response = RequestIdEvent;

	fn response(&self) -> RequestIdEvent {
		RequestIdEvent {
			request_id: Some(self.requestId.to_string()),
		}
	}
}

fn decode<E: SolEvent>(log: &Log) -> Option<E> {
	if log.topics.first() != Some(&E::SIGNATURE_HASH) {
		return None;
	}
	E::decode_raw_log(log.topics.iter().copied(), &log.data).ok()
}

/// Searches every log for the first `E`.
pub fn from_events<E: ResponseEvent>(logs: Option<&[Log]>) -> E::Response {
	logs.unwrap_or_default()
		.iter()
		.find_map(decode::<E>)
		.map(|event| event.response())
		.unwrap_or_default()
}

/// Searches the logs emitted by `contract` for the first `E`.
pub fn from_logs<E: ResponseEvent>(logs: Option<&[Log]>, contract: Address) -> E::Response {
	logs.unwrap_or_default()
		.iter()
		.filter(|log| log.address == contract)
		.find_map(decode::<E>)
		.map(|event| event.response())
		.unwrap_or_default()
}

/// Result of a directly executed transaction.
pub fn extract_direct<E: ResponseEvent>(receipt: TransactionReceipt) -> Extracted<E::Response> {
	let response = from_events::<E>(Some(&receipt.logs));
	Extracted { response, receipt }
}

/// Result of a relayed transaction.
pub fn extract_relayed<E: ResponseEvent>(
	receipt: TransactionReceipt,
	contract: Address,
) -> Extracted<E::Response> {
	let response = from_logs::<E>(Some(&receipt.logs), contract);
	if !receipt.logs.iter().any(|log| log.address == contract) {
		tracing::warn!(
			tx_hash = %receipt.transaction_hash,
			%contract,
			"Relayed receipt carries no log from the target contract"
		);
	}
	Extracted { response, receipt }
}
