//! Read access to the characteristics the registry stores per VCC.

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolValue;
use serde::Serialize;
use std::sync::Arc;
use thea_types::{decimal_u256, TheaError};

use crate::engine::contracts::IRegistry;
use crate::engine::ClientContext;

pub const VINTAGE_KEY: &str = "vintage";
pub const SDGS_COUNT_KEY: &str = "sdgs_count";
pub const RATING_KEY: &str = "rating";

/// Registry key for a characteristic name: its bytes, zero padded on the right.
pub fn characteristic_key(name: &str) -> B256 {
	B256::right_padding_from(name.as_bytes())
}

/// Characteristics of one VCC as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureValues {
	#[serde(with = "decimal_u256")]
	pub vintage: U256,
	#[serde(with = "decimal_u256")]
	pub sdgs_count: U256,
	#[serde(with = "decimal_u256")]
	pub rating: U256,
}

pub struct RegistryHandler {
	ctx: Arc<ClientContext>,
}

impl RegistryHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	/// ABI-encoded values stored under `keys` for VCC `id`.
	pub async fn get_characteristics_bytes(&self, id: U256, keys: &[B256]) -> Result<Bytes, TheaError> {
		let call = IRegistry::getCharacteristicsBytesCall {
			id,
			keys: keys.to_vec(),
		};
		self.ctx.read(&call, &self.ctx.registry("getCharacteristicsBytes")).await
	}

	/// Vintage, SDG count and rating of VCC `id`.
	pub async fn get_feature_values(&self, id: U256) -> Result<FeatureValues, TheaError> {
		let bytes = self
			.get_characteristics_bytes(
				id,
				&[
					characteristic_key(VINTAGE_KEY),
					characteristic_key(SDGS_COUNT_KEY),
					characteristic_key(RATING_KEY),
				],
			)
			.await?;
		let (vintage, sdgs_count, rating) = <(U256, U256, U256)>::abi_decode(&bytes).map_err(|e| {
			TheaError::contract_call(
				self.ctx.registry("getCharacteristicsBytes"),
				format!("Failed to decode characteristics: {}", e),
			)
		})?;
		tracing::debug!(%id, %vintage, %sdgs_count, %rating, "Fetched VCC characteristics");
		Ok(FeatureValues {
			vintage,
			sdgs_count,
			rating,
		})
	}
}
