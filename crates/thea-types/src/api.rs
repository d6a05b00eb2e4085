//! Backend REST payloads and on-chain request state.
//!
//! Field names follow the backend's camelCase JSON.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Response envelope of the `/cli` backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponseIn<T> {
	pub result: Option<T>,
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub error_message: Option<String>,
}

/// Wallet linked to a backend account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientWallet {
	pub eth_addr: String,
}

/// Backend account returned after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
	pub uuid: String,
	#[serde(default)]
	pub inviter_uuid: Option<String>,
	#[serde(default)]
	pub invitation_code: Option<String>,
	#[serde(default)]
	pub profile_precalc: Option<String>,
	#[serde(default)]
	pub wallets: Vec<ClientWallet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
	Call,
	Put,
}

/// Listed options product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsProduct {
	pub uuid: String,
	pub contract_id: String,
	pub strike: f64,
	pub option_type: OptionType,
	pub enabled: bool,
	pub updated_at: String,
	pub vault_addr: Address,
	pub contract_addr: Address,
	pub premium_price: f64,
	pub expiry: String,
}

/// Order id reserved by `/bt_options_orders/prepare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
	pub order_id: String,
	pub bt_option_id: String,
	pub quantity: f64,
	#[serde(default)]
	pub signature: Option<String>,
}

/// Body of `/bt_options_orders/prepare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPrepareRequest {
	pub bt_option_id: String,
	pub quantity: f64,
}

/// Body of `/bt_options_orders/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateRequest {
	pub order_id: String,
	pub bt_option_id: String,
	pub quantity: f64,
	/// `V.R.S` upper-case hex.
	pub signature: String,
}

/// Options order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
	pub uuid: String,
	pub status: String,
	#[serde(default)]
	pub tx_hash: Option<String>,
	pub created_at: String,
	pub updated_at: String,
	pub bt_option_id: String,
	pub quantity: f64,
	#[serde(default)]
	pub signature: Option<String>,
	#[serde(default)]
	pub premium: Option<f64>,
	pub eth_addr: String,
}

/// VCC specification attached to backend offset records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VccSpecRecord {
	pub id: u64,
	pub spec: String,
	pub spec_hash: String,
	pub source: String,
	pub project_id: String,
	pub vintage: u32,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub image_url: Option<String>,
	pub created_at: String,
}

/// What the backend does with the tokens of a fiat order once paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostAction {
	Transfer,
	Retire,
}

/// Fiat order listed by `/orders/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetOrderStripe {
	pub vcc_spec_record: VccSpecRecord,
	pub amount: f64,
	#[serde(default)]
	pub order_sum: Option<f64>,
	pub post_action: PostAction,
	pub eth_addr: String,
	pub status: String,
	/// Milliseconds since the epoch.
	pub created: i64,
	#[serde(default)]
	pub updated_at: Option<i64>,
	#[serde(default)]
	pub transfer_hash: Option<String>,
	#[serde(default)]
	pub retire_hash: Option<String>,
}

/// On-chain retirement listed by `/events/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetOrderNft {
	pub vcc_spec_record: VccSpecRecord,
	pub tx_hash: String,
	/// Milliseconds since the epoch.
	pub dt: i64,
	pub eth_addr: String,
	pub retired_amount: f64,
	#[serde(default)]
	pub reason: Option<String>,
	#[serde(default)]
	pub transferee: Option<String>,
}

/// Retirement entry of the offset history, fiat or on-chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetOrder {
	pub vcc_spec_record: VccSpecRecord,
	pub tx_hash: Option<String>,
	/// Milliseconds since the epoch.
	pub dt: i64,
	pub eth_addr: String,
	pub retired_amount: f64,
	/// Fiat amount paid, absent for on-chain retirements.
	pub order_sum: Option<f64>,
}

impl From<OffsetOrderStripe> for OffsetOrder {
	fn from(order: OffsetOrderStripe) -> Self {
		Self {
			vcc_spec_record: order.vcc_spec_record,
			tx_hash: order.retire_hash,
			dt: order.created,
			eth_addr: order.eth_addr,
			retired_amount: order.amount,
			order_sum: order.order_sum,
		}
	}
}

impl From<OffsetOrderNft> for OffsetOrder {
	fn from(order: OffsetOrderNft) -> Self {
		Self {
			vcc_spec_record: order.vcc_spec_record,
			tx_hash: Some(order.tx_hash),
			dt: order.dt,
			eth_addr: order.eth_addr,
			retired_amount: order.retired_amount,
			order_sum: None,
		}
	}
}

/// Offsets of the current calendar month and those of earlier months.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetHistory {
	#[serde(rename = "commited")]
	pub committed: Vec<OffsetOrder>,
	pub retired: Vec<OffsetOrder>,
}

/// Token entry of the subgraph `tokens` query. Amounts stay decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
	pub id: String,
	#[serde(rename = "tokenURI")]
	pub token_uri: String,
	pub project_id: String,
	pub vintage: String,
	pub active_amount: String,
	pub minted_amount: String,
	pub retired_amount: String,
	pub unwrapped_amount: String,
}

/// Status of an unwrap request in the registry's `requests` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
	Pending,
	Accepted,
	Rejected,
}

impl TryFrom<u8> for TokenStatus {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(TokenStatus::Pending),
			1 => Ok(TokenStatus::Accepted),
			2 => Ok(TokenStatus::Rejected),
			other => Err(other),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnwrapTokenState {
	pub status: TokenStatus,
	pub maker: Address,
	#[serde(with = "decimal_u256")]
	pub token_id: U256,
	#[serde(with = "decimal_u256")]
	pub amount: U256,
}

/// Serialises `U256` as a base-10 string.
pub mod decimal_u256 {
	use alloy_primitives::U256;
	use serde::{Deserialize, Deserializer, Serializer};
	use std::str::FromStr;

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		U256::from_str(&s).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_envelope_with_error() {
		let envelope: HttpResponseIn<String> = serde_json::from_value(json!({
			"result": null,
			"error": "NO_AUTH",
			"errorMessage": "Not logged in"
		}))
		.unwrap();
		assert!(envelope.result.is_none());
		assert_eq!(envelope.error.as_deref(), Some("NO_AUTH"));
		assert_eq!(envelope.error_message.as_deref(), Some("Not logged in"));
	}

	#[test]
	fn test_options_product_deserialize() {
		let product: OptionsProduct = serde_json::from_value(json!({
			"uuid": "p-1",
			"contractId": "c-1",
			"strike": 1.5,
			"optionType": "Put",
			"enabled": true,
			"updatedAt": "2023-01-01T00:00:00Z",
			"vaultAddr": "0x95C8f889701f20b624875a5188bEbDc9289b4F51",
			"contractAddr": "0x686AfD6e502A81D2e77f2e038A23C0dEf4949A20",
			"premiumPrice": 0.1,
			"expiry": "2023-02-01T00:00:00Z"
		}))
		.unwrap();
		assert_eq!(product.option_type, OptionType::Put);
		assert_eq!(product.strike, 1.5);
	}

	#[test]
	fn test_token_info_reads_token_uri() {
		let token: TokenInfo = serde_json::from_value(json!({
			"id": "1",
			"tokenURI": "ipfs://token-1",
			"projectId": "1748",
			"vintage": "2019",
			"activeAmount": "100",
			"mintedAmount": "150",
			"retiredAmount": "50",
			"unwrappedAmount": "0"
		}))
		.unwrap();
		assert_eq!(token.token_uri, "ipfs://token-1");
		assert_eq!(token.project_id, "1748");
	}

	#[test]
	fn test_offset_history_keeps_backend_field_name() {
		let json = serde_json::to_value(OffsetHistory::default()).unwrap();
		assert_eq!(json, json!({ "commited": [], "retired": [] }));
	}

	#[test]
	fn test_token_status_from_u8() {
		assert_eq!(TokenStatus::try_from(0u8), Ok(TokenStatus::Pending));
		assert_eq!(TokenStatus::try_from(2u8), Ok(TokenStatus::Rejected));
		assert_eq!(TokenStatus::try_from(3u8), Err(3));
	}

	#[test]
	fn test_unwrap_state_serializes_decimal_strings() {
		let state = UnwrapTokenState {
			status: TokenStatus::Pending,
			maker: Address::ZERO,
			token_id: U256::from(1),
			amount: U256::from(1000),
		};
		let json = serde_json::to_value(&state).unwrap();
		assert_eq!(json["status"], "PENDING");
		assert_eq!(json["tokenId"], "1");
		assert_eq!(json["amount"], "1000");
	}
}
