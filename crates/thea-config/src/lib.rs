//! Configuration module for the Thea SDK.
//!
//! Loads a TOML file describing which network to talk to, how to reach it and
//! which key signs on behalf of the user. `${VAR}` and `${VAR:-default}`
//! placeholders are resolved from the environment before parsing, so secrets
//! can stay out of the file.
//!
//! The result is turned into an immutable [`NetworkProfile`] with
//! [`Config::profile`]; nothing downstream mutates it.

use alloy_primitives::Address;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thea_types::{
	validate_address, without_0x_prefix, NetworkProfile, SecretString, TheaNetwork,
};
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub network: NetworkSection,
	#[serde(default)]
	pub signer: Option<SignerSection>,
	#[serde(default)]
	pub relayer: Option<RelayerSection>,
	#[serde(default)]
	pub api: Option<ApiSection>,
}

/// Network selection and chain access.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkSection {
	pub chain_id: u64,
	pub rpc_url: String,
	/// Overrides for the built-in address book.
	#[serde(default)]
	pub addresses: AddressOverrides,
}

/// Optional per-contract address overrides, as hex strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AddressOverrides {
	pub registry: Option<String>,
	pub thea_erc1155: Option<String>,
	pub vintage_token: Option<String>,
	pub sdg_token: Option<String>,
	pub rating_token: Option<String>,
	pub base_token_manager: Option<String>,
	pub stable_token: Option<String>,
	pub current_nbt_token: Option<String>,
}

/// Local signing key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignerSection {
	pub private_key: SecretString,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayerSection {
	pub url: String,
}

/// Backend endpoints, overriding the network defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiSection {
	pub base_url: Option<String>,
	pub subgraph_url: Option<String>,
}

/// Resolves `${VAR}` and `${VAR:-default}` placeholders from the environment.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;
	for cap in re.captures_iter(input) {
		let (Some(full), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						name.as_str()
					)))
				},
			},
		};
		result.push_str(&input[last..full.start()]);
		result.push_str(&value);
		last = full.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file and validates it.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	/// Selected network.
	pub fn network(&self) -> Result<TheaNetwork, ConfigError> {
		TheaNetwork::try_from(self.network.chain_id)
			.map_err(|e| ConfigError::Validation(e.to_string()))
	}

	/// Built-in profile of the selected network with every override applied.
	pub fn profile(&self) -> Result<NetworkProfile, ConfigError> {
		let mut profile = NetworkProfile::defaults(self.network()?);
		let overrides = &self.network.addresses;
		let addresses = &mut profile.addresses;

		if let Some(registry) = parse_override("registry", &overrides.registry)? {
			addresses.registry = registry;
		}
		if let Some(erc1155) = parse_override("thea_erc1155", &overrides.thea_erc1155)? {
			addresses.thea_erc1155 = erc1155;
		}
		for (name, value, slot) in [
			("vintage_token", &overrides.vintage_token, &mut addresses.vintage_token),
			("sdg_token", &overrides.sdg_token, &mut addresses.sdg_token),
			("rating_token", &overrides.rating_token, &mut addresses.rating_token),
			(
				"base_token_manager",
				&overrides.base_token_manager,
				&mut addresses.base_token_manager,
			),
			("stable_token", &overrides.stable_token, &mut addresses.stable_token),
			(
				"current_nbt_token",
				&overrides.current_nbt_token,
				&mut addresses.current_nbt_token,
			),
		] {
			if let Some(address) = parse_override(name, value)? {
				*slot = Some(address);
			}
		}

		if let Some(api) = &self.api {
			if let Some(base_url) = &api.base_url {
				profile.endpoints.api_base_url = base_url.clone();
			}
			if let Some(subgraph_url) = &api.subgraph_url {
				profile.endpoints.subgraph_url = subgraph_url.clone();
			}
		}
		profile.endpoints.relayer_url = self
			.relayer
			.as_ref()
			.map(|r| r.url.trim().to_string())
			.filter(|url| !url.is_empty());

		Ok(profile)
	}

	/// Validates the configuration.
	///
	/// Checks the chain id is supported, the RPC URL is set, every address
	/// override parses and the signer key is 32 bytes of hex.
	fn validate(&self) -> Result<(), ConfigError> {
		self.network()?;

		if self.network.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation("rpc_url cannot be empty".into()));
		}

		if let Some(signer) = &self.signer {
			signer.private_key.with_exposed(|key| {
				let hex_part = without_0x_prefix(key.trim());
				if hex_part.len() != 64 || hex::decode(hex_part).is_err() {
					return Err(ConfigError::Validation(
						"private_key must be 32 bytes of hex".into(),
					));
				}
				Ok(())
			})?;
		}

		// Surfaces malformed address overrides.
		self.profile()?;
		Ok(())
	}
}

fn parse_override(
	name: &str,
	value: &Option<String>,
) -> Result<Option<Address>, ConfigError> {
	value
		.as_deref()
		.map(|raw| {
			validate_address(raw)
				.map_err(|_| ConfigError::Validation(format!("Invalid address for {name}: {raw}")))
		})
		.transpose()
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const BASE: &str = r#"
[network]
chain_id = 80001
rpc_url = "https://rpc.example"
"#;

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = BASE.parse().unwrap();
		let profile = config.profile().unwrap();
		assert_eq!(profile.network, TheaNetwork::Mumbai);
		assert_eq!(profile.endpoints.api_base_url, "https://client.dev.thea.earth/cli");
		assert!(profile.relayer_url().is_none());
		assert!(config.signer.is_none());
	}

	#[test]
	fn test_overrides_are_applied() {
		let input = format!(
			"{BASE}
[network.addresses]
current_nbt_token = \"0x1111111111111111111111111111111111111111\"
registry = \"0x2222222222222222222222222222222222222222\"

[relayer]
url = \"https://relayer.example\"

[api]
base_url = \"http://localhost:9000/cli\"
"
		);
		let config: Config = input.parse().unwrap();
		let profile = config.profile().unwrap();
		assert_eq!(
			profile.addresses.current_nbt_token.map(|a| a.to_string().to_lowercase()),
			Some("0x1111111111111111111111111111111111111111".to_string())
		);
		assert_eq!(
			profile.addresses.registry.to_string().to_lowercase(),
			"0x2222222222222222222222222222222222222222"
		);
		assert_eq!(profile.relayer_url(), Some("https://relayer.example"));
		assert_eq!(profile.endpoints.api_base_url, "http://localhost:9000/cli");
	}

	#[test]
	fn test_rejects_unknown_chain() {
		let input = BASE.replace("80001", "5");
		let err = input.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_rejects_empty_rpc_url() {
		let input = BASE.replace("https://rpc.example", "");
		assert!(matches!(
			input.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_rejects_malformed_address() {
		let input = format!("{BASE}\n[network.addresses]\nsdg_token = \"0x1234\"\n");
		let err = input.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("sdg_token"));
	}

	#[test]
	fn test_rejects_short_private_key() {
		let input = format!("{BASE}\n[signer]\nprivate_key = \"0xabcd\"\n");
		assert!(matches!(
			input.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_private_key_from_env() {
		std::env::set_var(
			"THEA_TEST_PRIVATE_KEY",
			"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
		);
		let input = format!("{BASE}\n[signer]\nprivate_key = \"${{THEA_TEST_PRIVATE_KEY}}\"\n");
		let config: Config = input.parse().unwrap();
		let signer = config.signer.unwrap();
		assert!(!format!("{:?}", signer).contains("ac0974"));
		signer
			.private_key
			.with_exposed(|key| assert!(key.ends_with("ff80")));
		std::env::remove_var("THEA_TEST_PRIVATE_KEY");
	}

	#[test]
	fn test_env_var_default_and_missing() {
		let resolved = resolve_env_vars("url = \"${THEA_UNSET_VAR_X:-http://fallback}\"").unwrap();
		assert_eq!(resolved, "url = \"http://fallback\"");
		assert!(resolve_env_vars("url = \"${THEA_UNSET_VAR_Y}\"").is_err());
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(BASE.as_bytes()).unwrap();
		let config = Config::from_file(file.path()).await.unwrap();
		assert_eq!(config.network.chain_id, 80001);

		assert!(matches!(
			Config::from_file("/nonexistent/thea.toml").await,
			Err(ConfigError::Io(_))
		));
	}
}
