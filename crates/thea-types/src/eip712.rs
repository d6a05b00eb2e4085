//! EIP-712 message model.
//!
//! A [`TypedMessage`] carries both the JSON form a wallet would display
//! (`eth_signTypedData_v4` shape) and the digest the verifying contract will
//! recompute. Messages are built fresh for every signature; they embed a live
//! nonce and a deadline and must never be reused.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Version string used by every Thea contract domain.
pub const CONTRACT_DOMAIN_VERSION: &str = "1";
/// Name of the backend domain used for login and order signing.
pub const BACKEND_DOMAIN_NAME: &str = "Thea";
/// Version of the backend domain.
pub const BACKEND_DOMAIN_VERSION: &str = "0.1";

/// EIP-712 domain.
///
/// Contract domains carry a verifying contract; the backend domain does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDomain {
	pub name: String,
	pub version: String,
	#[serde(rename = "chainId")]
	pub chain_id: u64,
	#[serde(
		rename = "verifyingContract",
		skip_serializing_if = "Option::is_none",
		default
	)]
	pub verifying_contract: Option<Address>,
}

impl TypedDomain {
	/// Domain of a deployed contract, version "1".
	pub fn contract(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Self {
		Self {
			name: name.into(),
			version: CONTRACT_DOMAIN_VERSION.to_string(),
			chain_id,
			verifying_contract: Some(verifying_contract),
		}
	}

	/// Backend domain `{name: "Thea", version: "0.1", chainId}`.
	pub fn backend(chain_id: u64) -> Self {
		Self {
			name: BACKEND_DOMAIN_NAME.to_string(),
			version: BACKEND_DOMAIN_VERSION.to_string(),
			chain_id,
			verifying_contract: None,
		}
	}

	/// Converts into alloy's domain for hashing.
	pub fn to_eip712_domain(&self) -> Eip712Domain {
		Eip712Domain::new(
			Some(Cow::Owned(self.name.clone())),
			Some(Cow::Owned(self.version.clone())),
			Some(U256::from(self.chain_id)),
			self.verifying_contract,
			None,
		)
	}
}

/// One field of an EIP-712 struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
	pub name: String,
	#[serde(rename = "type")]
	pub field_type: String,
}

impl TypeField {
	pub fn new(name: &str, field_type: &str) -> Self {
		Self {
			name: name.to_string(),
			field_type: field_type.to_string(),
		}
	}
}

/// Complete typed-data payload handed to a signer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedMessage {
	pub domain: TypedDomain,
	#[serde(rename = "primaryType")]
	pub primary_type: String,
	pub types: BTreeMap<String, Vec<TypeField>>,
	pub message: serde_json::Value,
	/// `keccak256(0x1901 || domainSeparator || structHash)`.
	#[serde(skip)]
	pub digest: B256,
}

impl TypedMessage {
	/// Renders the `PrimaryType(type name,...)` encoding of the primary type.
	pub fn encode_type(&self) -> String {
		let fields = self
			.types
			.get(&self.primary_type)
			.map(|fields| {
				fields
					.iter()
					.map(|f| format!("{} {}", f.field_type, f.name))
					.collect::<Vec<_>>()
					.join(",")
			})
			.unwrap_or_default();
		format!("{}({})", self.primary_type, fields)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_backend_domain_has_no_verifying_contract() {
		let domain = TypedDomain::backend(80001);
		let json = serde_json::to_value(&domain).unwrap();
		assert_eq!(json["name"], "Thea");
		assert_eq!(json["version"], "0.1");
		assert_eq!(json["chainId"], 80001);
		assert!(json.get("verifyingContract").is_none());
		assert!(domain.to_eip712_domain().verifying_contract.is_none());
	}

	#[test]
	fn test_contract_domain() {
		let contract = address!("95C8f889701f20b624875a5188bEbDc9289b4F51");
		let domain = TypedDomain::contract("TheaBaseTokenManager", 1337, contract);
		assert_eq!(domain.version, "1");
		let alloy_domain = domain.to_eip712_domain();
		assert_eq!(alloy_domain.verifying_contract, Some(contract));
		assert_eq!(alloy_domain.chain_id, Some(U256::from(1337u64)));
	}

	#[test]
	fn test_encode_type() {
		let mut types = BTreeMap::new();
		types.insert(
			"AuthMessage".to_string(),
			vec![TypeField::new("content", "string")],
		);
		let msg = TypedMessage {
			domain: TypedDomain::backend(137),
			primary_type: "AuthMessage".to_string(),
			types,
			message: serde_json::json!({ "content": "challenge" }),
			digest: B256::ZERO,
		};
		assert_eq!(msg.encode_type(), "AuthMessage(string content)");
	}
}
