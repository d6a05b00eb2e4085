//! Supported networks and their contract address books.
//!
//! The address book is an immutable value: a [`NetworkProfile`] is built once
//! (defaults, then configuration overrides) and threaded through constructors.
//! Nothing in the SDK mutates it after the client has been built.

use crate::TheaError;
use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Networks the Thea protocol is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum TheaNetwork {
	Ganache,
	Mumbai,
	Polygon,
	HaqqTestnet,
}

impl TheaNetwork {
	pub const fn chain_id(&self) -> u64 {
		match self {
			TheaNetwork::Ganache => 1337,
			TheaNetwork::Mumbai => 80001,
			TheaNetwork::Polygon => 137,
			TheaNetwork::HaqqTestnet => 54211,
		}
	}

	pub const fn name(&self) -> &'static str {
		match self {
			TheaNetwork::Ganache => "GANACHE",
			TheaNetwork::Mumbai => "MUMBAI",
			TheaNetwork::Polygon => "POLYGON",
			TheaNetwork::HaqqTestnet => "HAQQ_TESTNET",
		}
	}
}

impl TryFrom<u64> for TheaNetwork {
	type Error = TheaError;

	fn try_from(chain_id: u64) -> Result<Self, Self::Error> {
		match chain_id {
			1337 => Ok(TheaNetwork::Ganache),
			80001 => Ok(TheaNetwork::Mumbai),
			137 => Ok(TheaNetwork::Polygon),
			54211 => Ok(TheaNetwork::HaqqTestnet),
			other => Err(TheaError::UnsupportedNetwork(other)),
		}
	}
}

impl From<TheaNetwork> for u64 {
	fn from(network: TheaNetwork) -> Self {
		network.chain_id()
	}
}

impl fmt::Display for TheaNetwork {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name(), self.chain_id())
	}
}

/// Deployed contract addresses for one network.
///
/// `None` marks a contract that is not deployed on that network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
	pub registry: Address,
	pub thea_erc1155: Address,
	pub vintage_token: Option<Address>,
	pub sdg_token: Option<Address>,
	pub rating_token: Option<Address>,
	pub base_token_manager: Option<Address>,
	pub stable_token: Option<Address>,
	/// Explicit current NBT token; resolved on-chain when absent.
	#[serde(default)]
	pub current_nbt_token: Option<Address>,
}

/// Off-chain endpoints for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEndpoints {
	/// Backend REST API base URL.
	pub api_base_url: String,
	/// GraphQL subgraph URL.
	pub subgraph_url: String,
	/// Gas-less relayer; `None` disables the relayed path.
	#[serde(default)]
	pub relayer_url: Option<String>,
}

/// Everything the SDK needs to know about a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
	pub network: TheaNetwork,
	pub addresses: ContractAddresses,
	pub endpoints: NetworkEndpoints,
}

impl NetworkProfile {
	/// Built-in profile of a network.
	pub fn defaults(network: TheaNetwork) -> Self {
		match network {
			TheaNetwork::Ganache => Self {
				network,
				addresses: ContractAddresses {
					registry: address!("686AfD6e502A81D2e77f2e038A23C0dEf4949A20"),
					thea_erc1155: address!("e135783649BfA7c9c4c6F8E528C7f56166efC8a6"),
					vintage_token: Some(address!("686AfD6e502A81D2e77f2e038A23C0dEf4949A20")),
					sdg_token: Some(address!("43D1F9096674B5722D359B6402381816d5B22F28")),
					rating_token: Some(address!("4261D524bc701dA4AC49339e5F8b299977045eA5")),
					base_token_manager: Some(address!("95C8f889701f20b624875a5188bEbDc9289b4F51")),
					stable_token: Some(address!("6B175474E89094C44Da98b954EedeAC495271d0F")),
					current_nbt_token: None,
				},
				endpoints: NetworkEndpoints {
					api_base_url: "https://127.0.0.1:8078/cli".to_string(),
					subgraph_url: "http://localhost:8000/subgraphs/name/thea-protocol/thea-subgraph"
						.to_string(),
					relayer_url: None,
				},
			},
			TheaNetwork::Mumbai => Self {
				network,
				addresses: ContractAddresses {
					registry: address!("dd4209d1dba29e49a9113fed15e1f0dda6264d72"),
					thea_erc1155: address!("151e13c5b354bee579976dc296c88bb817c77d18"),
					vintage_token: Some(address!("1eAad7EA381e4035956120f093639E51dDbbC01f")),
					sdg_token: Some(address!("3E076c36B3520aEFC3A475d9232D0E320d15c0Df")),
					rating_token: Some(address!("df9dfBD50C104c980CaD3119dA86391558379f1E")),
					base_token_manager: Some(address!("0aA2d82e03Bc4fd092ba0dd105119Ec46aED2f76")),
					stable_token: Some(address!("1D6DBfb520ee332bc14e800A832389F731820787")),
					current_nbt_token: None,
				},
				endpoints: NetworkEndpoints {
					api_base_url: "https://client.dev.thea.earth/cli".to_string(),
					subgraph_url: "https://api.studio.thegraph.com/query/43315/thea-subgraph/v0.1.4"
						.to_string(),
					relayer_url: None,
				},
			},
			TheaNetwork::Polygon => Self {
				network,
				addresses: ContractAddresses {
					registry: address!("88449Dd0a1b75BC607A1E971b13930617D535EC1"),
					thea_erc1155: address!("22d5f9B75c524Fec1D6619787e582644CD4D7422"),
					vintage_token: Some(address!("3621027715647B69D706636a8878E85d725A2aed")),
					sdg_token: Some(address!("B48C895039c9F81C87eb97Ed54B69a769b291f28")),
					rating_token: Some(address!("c95347BD5212148A09c34a7d890D061D73f50bb8")),
					base_token_manager: Some(address!("E100c4ffFF7c00253BA4A2a695F5ac909d756D76")),
					stable_token: Some(address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174")),
					current_nbt_token: None,
				},
				endpoints: NetworkEndpoints {
					api_base_url: "https://127.0.0.1:8078/cli".to_string(),
					subgraph_url: "http://localhost:8000/subgraphs/name/thea-protocol/thea-subgraph"
						.to_string(),
					relayer_url: None,
				},
			},
			TheaNetwork::HaqqTestnet => Self {
				network,
				addresses: ContractAddresses {
					registry: address!("acb833df5b99f967696ca7535ee1b3b058d5cd91"),
					thea_erc1155: address!("b903112a6872106f1da9823f29958da7fd77036c"),
					vintage_token: None,
					sdg_token: None,
					rating_token: None,
					base_token_manager: None,
					stable_token: None,
					current_nbt_token: None,
				},
				endpoints: NetworkEndpoints {
					api_base_url: "https://127.0.0.1:8078/cli".to_string(),
					subgraph_url: "http://localhost:8000/subgraphs/name/thea-protocol/thea-subgraph"
						.to_string(),
					relayer_url: None,
				},
			},
		}
	}

	pub fn chain_id(&self) -> u64 {
		self.network.chain_id()
	}

	/// Relayer URL when one is configured and non-empty.
	pub fn relayer_url(&self) -> Option<&str> {
		self.endpoints
			.relayer_url
			.as_deref()
			.filter(|url| !url.trim().is_empty())
	}

	/// Base token manager address, or `TokenNotFound` on networks without one.
	pub fn base_token_manager(&self) -> Result<Address, TheaError> {
		self.addresses.base_token_manager.ok_or_else(|| {
			TheaError::TokenNotFound(format!(
				"Base token manager is not deployed on {}",
				self.network
			))
		})
	}
}
