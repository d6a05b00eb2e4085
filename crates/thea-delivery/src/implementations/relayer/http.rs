//! HTTP relayer client.
//!
//! The relayer accepts `POST /` with `{to, data}` and answers `{result}`,
//! where `result` is the transaction hash serialised as a JSON string.

use crate::{DeliveryError, RelayerInterface};
use async_trait::async_trait;
use std::str::FromStr;
use thea_types::{RelayerRequest, RelayerResponse, TransactionHash};

/// Relayer reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRelayer {
	client: reqwest::Client,
	url: String,
}

impl HttpRelayer {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
		}
	}

	fn endpoint(&self) -> String {
		format!("{}/", self.url.trim_end_matches('/'))
	}
}

/// Decodes the hash out of the relayer's `result` field.
///
/// The field normally holds a JSON-encoded string (`"\"0x..\""`); a bare hash
/// is accepted as well.
fn parse_result(result: &str) -> Result<TransactionHash, DeliveryError> {
	let raw = serde_json::from_str::<String>(result).unwrap_or_else(|_| result.trim().to_string());
	TransactionHash::from_str(&raw)
		.map_err(|e| DeliveryError::Relayer(format!("Invalid transaction hash {}: {}", raw, e)))
}

#[async_trait]
impl RelayerInterface for HttpRelayer {
	async fn relay(&self, request: &RelayerRequest) -> Result<TransactionHash, DeliveryError> {
		tracing::info!(to = %request.to, data_len = request.data.len(), "Relaying transaction");

		let response = self
			.client
			.post(self.endpoint())
			.json(request)
			.send()
			.await
			.map_err(|e| DeliveryError::Relayer(format!("Failed to reach relayer: {}", e)))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(DeliveryError::Relayer(format!(
				"Relayer responded with {}: {}",
				status, body
			)));
		}

		let body: RelayerResponse = response
			.json()
			.await
			.map_err(|e| DeliveryError::Relayer(format!("Malformed relayer response: {}", e)))?;

		let hash = parse_result(&body.result)?;
		tracing::info!(tx_hash = %hash, "Relayer accepted transaction");
		Ok(hash)
	}
}
