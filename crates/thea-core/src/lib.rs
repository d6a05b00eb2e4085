//! Thea SDK core.
//!
//! [`TheaClient`] is the composition root: it validates the chain provider
//! against the selected network, resolves the current NBT token once and
//! hands a shared [`ClientContext`] to one handler per action family.
//!
//! ```no_run
//! # async fn run() -> Result<(), thea_types::TheaError> {
//! use alloy_primitives::U256;
//! use thea_config::Config;
//! use thea_core::TheaClient;
//!
//! let config = Config::from_file("thea.toml")
//! 	.await
//! 	.map_err(|e| thea_types::TheaError::InvalidConfig(e.to_string()))?;
//! let client = TheaClient::from_config(&config).await?;
//! let converted = client.convert().convert_nft(U256::from(1), U256::from(1000)).await?;
//! println!("{:?}", converted.response);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod handlers;

pub use engine::{
	ClientContext, Dispatcher, ExecutionPath, Extracted, RequestIdEvent, TokenAmountEvent,
	DIRECT_EXECUTION_THRESHOLD,
};
pub use handlers::{
	AuthHandler, ConvertHandler, FeatureValues, OffsetHandler, OptionsHandler, RecoverHandler,
	RegistryHandler, TokenListHandler, UnwrapHandler,
};

use alloy_primitives::Address;
use std::sync::Arc;
use thea_account::{Credentials, LocalWallet};
use thea_api::{HttpClient, SubgraphClient};
use thea_config::Config;
use thea_delivery::{AlloyDelivery, DeliveryInterface, HttpRelayer, RelayerInterface};
use thea_types::{NetworkProfile, ResolvedAddresses, TheaError};

use engine::contracts::IBaseTokenManager;

/// Entry point of the SDK.
pub struct TheaClient {
	ctx: Arc<ClientContext>,
}

/// Collects the transports and credentials of a [`TheaClient`].
pub struct TheaClientBuilder {
	profile: NetworkProfile,
	credentials: Credentials,
	delivery: Option<Arc<dyn DeliveryInterface>>,
	relayer: Option<Arc<dyn RelayerInterface>>,
	api: Option<HttpClient>,
}

impl TheaClientBuilder {
	pub fn credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = credentials;
		self
	}

	pub fn delivery(mut self, delivery: Arc<dyn DeliveryInterface>) -> Self {
		self.delivery = Some(delivery);
		self
	}

	/// Overrides the relayer built from the profile's relayer URL.
	pub fn relayer(mut self, relayer: Arc<dyn RelayerInterface>) -> Self {
		self.relayer = Some(relayer);
		self
	}

	/// Overrides the backend client built from the profile's API URL.
	pub fn api(mut self, api: HttpClient) -> Self {
		self.api = Some(api);
		self
	}

	/// Validates the provider against the network and resolves the address book.
	pub async fn build(self) -> Result<TheaClient, TheaError> {
		let delivery = match self.delivery {
			Some(delivery) => delivery,
			None if matches!(self.credentials, Credentials::ReadOnly) => {
				return Err(TheaError::MissingProvider)
			},
			None => return Err(TheaError::SignerRequiresProvider),
		};

		let expected = self.profile.chain_id();
		let actual = delivery.chain_id().await.map_err(|e| {
			TheaError::InvalidConfig(format!("Failed to read chain id from provider: {}", e))
		})?;
		if actual != expected {
			return Err(TheaError::NetworkMismatch { expected, actual });
		}

		let relayer = match self.relayer {
			Some(relayer) => Some(relayer),
			None => self
				.profile
				.relayer_url()
				.map(|url| Arc::new(HttpRelayer::new(url)) as Arc<dyn RelayerInterface>),
		};
		let api = match self.api {
			Some(api) => api,
			None => HttpClient::new(&self.profile.endpoints.api_base_url)?,
		};
		let subgraph = SubgraphClient::new(&self.profile.endpoints.subgraph_url)?;

		let addresses = ResolvedAddresses {
			contracts: self.profile.addresses.clone(),
			current_nbt_token: None,
		};
		let mut ctx = ClientContext {
			profile: self.profile,
			addresses,
			credentials: self.credentials,
			delivery,
			relayer,
			api,
			subgraph,
		};
		ctx.addresses.current_nbt_token = resolve_current_nbt(&ctx).await?;

		tracing::info!(
			network = %ctx.profile.network,
			chain_id = expected,
			relayer = ctx.relayer.is_some(),
			current_nbt = ?ctx.addresses.current_nbt_token,
			"Thea client ready"
		);
		Ok(TheaClient { ctx: Arc::new(ctx) })
	}
}

/// Current NBT token: the configured address, else the base token of the
/// base vintage. `None` on networks without a base token manager.
async fn resolve_current_nbt(ctx: &ClientContext) -> Result<Option<Address>, TheaError> {
	if let Some(address) = ctx.profile.addresses.current_nbt_token {
		return Ok(Some(address));
	}
	if ctx.profile.addresses.base_token_manager.is_none() {
		return Ok(None);
	}

	let base = ctx
		.read(
			&IBaseTokenManager::baseCharacteristicsCall {},
			&ctx.base_token_manager("baseCharacteristics")?,
		)
		.await?;
	let address = ctx
		.read(
			&IBaseTokenManager::baseTokensCall { vintage: base.vintage },
			&ctx.base_token_manager("baseTokens")?,
		)
		.await?;
	if address.is_zero() {
		return Err(TheaError::TokenNotFound(format!(
			"Current NBT token for vintage {} not found",
			base.vintage
		)));
	}
	Ok(Some(address))
}

impl TheaClient {
	pub fn builder(profile: NetworkProfile) -> TheaClientBuilder {
		TheaClientBuilder {
			profile,
			credentials: Credentials::ReadOnly,
			delivery: None,
			relayer: None,
			api: None,
		}
	}

	/// Builds a client from a loaded configuration.
	///
	/// A configured private key signs locally; without one the client is read-only.
	pub async fn from_config(config: &Config) -> Result<Self, TheaError> {
		let profile = config
			.profile()
			.map_err(|e| TheaError::InvalidConfig(e.to_string()))?;

		let wallet = config
			.signer
			.as_ref()
			.map(|signer| LocalWallet::from_secret(&signer.private_key))
			.transpose()?;
		let delivery = AlloyDelivery::new(
			&config.network.rpc_url,
			profile.chain_id(),
			wallet.as_ref().map(LocalWallet::ethereum_wallet),
		)
		.map_err(|e| TheaError::InvalidConfig(e.to_string()))?;
		let credentials = match wallet {
			Some(wallet) => Credentials::signer(wallet),
			None => Credentials::ReadOnly,
		};

		Self::builder(profile)
			.credentials(credentials)
			.delivery(Arc::new(delivery))
			.build()
			.await
	}

	pub fn context(&self) -> &Arc<ClientContext> {
		&self.ctx
	}

	pub fn convert(&self) -> ConvertHandler {
		ConvertHandler::new(self.ctx.clone())
	}

	pub fn recover(&self) -> RecoverHandler {
		RecoverHandler::new(self.ctx.clone())
	}

	pub fn unwrap(&self) -> UnwrapHandler {
		UnwrapHandler::new(self.ctx.clone())
	}

	pub fn offset(&self) -> OffsetHandler {
		OffsetHandler::new(self.ctx.clone())
	}

	pub fn auth(&self) -> AuthHandler {
		AuthHandler::new(self.ctx.clone())
	}

	pub fn options(&self) -> OptionsHandler {
		OptionsHandler::new(self.ctx.clone())
	}

	pub fn registry(&self) -> RegistryHandler {
		RegistryHandler::new(self.ctx.clone())
	}

	pub fn tokens(&self) -> TokenListHandler {
		TokenListHandler::new(self.ctx.clone())
	}

	pub fn subgraph(&self) -> &SubgraphClient {
		&self.ctx.subgraph
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, U256};
	use alloy_sol_types::{SolCall, SolValue};
	use thea_delivery::{DeliveryError, MockDeliveryInterface};
	use thea_types::{TheaNetwork, Transaction};

	const TEST_PRIVATE_KEY: &str =
		"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const NBT: Address = Address::new([0x4e; 20]);

	fn selector(tx: &Transaction) -> [u8; 4] {
		tx.data[..4].try_into().unwrap()
	}

	fn on_chain(chain_id: u64) -> MockDeliveryInterface {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_chain_id()
			.returning(move || Box::pin(async move { Ok(chain_id) }));
		delivery
	}

	fn with_base_token(mut delivery: MockDeliveryInterface, token: Address) -> MockDeliveryInterface {
		delivery.expect_eth_call().returning(move |tx| {
			let out = if selector(&tx) == IBaseTokenManager::baseCharacteristicsCall::SELECTOR {
				Bytes::from((U256::from(2020), U256::from(1), U256::from(4)).abi_encode())
			} else {
				let call = IBaseTokenManager::baseTokensCall::abi_decode(&tx.data).unwrap();
				assert_eq!(call.vintage, U256::from(2020));
				Bytes::from(token.abi_encode())
			};
			Box::pin(async move { Ok(out) })
		});
		delivery
	}

	fn mumbai() -> NetworkProfile {
		NetworkProfile::defaults(TheaNetwork::Mumbai)
	}

	#[tokio::test]
	async fn test_missing_provider() {
		let err = TheaClient::builder(mumbai()).build().await.err().unwrap();
		assert!(matches!(err, TheaError::MissingProvider));
	}

	#[tokio::test]
	async fn test_signer_requires_provider() {
		let wallet = LocalWallet::new(TEST_PRIVATE_KEY).unwrap();
		let err = TheaClient::builder(mumbai())
			.credentials(Credentials::signer(wallet))
			.build()
			.await
			.err()
			.unwrap();
		assert!(matches!(err, TheaError::SignerRequiresProvider));
	}

	#[tokio::test]
	async fn test_network_mismatch() {
		let err = TheaClient::builder(mumbai())
			.delivery(Arc::new(on_chain(137)))
			.build()
			.await
			.err()
			.unwrap();
		assert!(matches!(
			err,
			TheaError::NetworkMismatch {
				expected: 80001,
				actual: 137
			}
		));
	}

	#[tokio::test]
	async fn test_unreachable_provider() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_chain_id()
			.returning(|| Box::pin(async { Err(DeliveryError::Network("connection refused".into())) }));
		let err = TheaClient::builder(mumbai())
			.delivery(Arc::new(delivery))
			.build()
			.await
			.err()
			.unwrap();
		assert!(matches!(err, TheaError::InvalidConfig(_)));
	}

	#[tokio::test]
	async fn test_resolves_current_nbt_from_base_vintage() {
		let delivery = with_base_token(on_chain(80001), NBT);
		let client = TheaClient::builder(mumbai())
			.delivery(Arc::new(delivery))
			.build()
			.await
			.unwrap();
		assert_eq!(client.context().addresses.current_nbt_token, Some(NBT));
		assert!(client.context().relayer.is_none());
	}

	#[tokio::test]
	async fn test_zero_current_nbt_is_rejected() {
		let delivery = with_base_token(on_chain(80001), Address::ZERO);
		let err = TheaClient::builder(mumbai())
			.delivery(Arc::new(delivery))
			.build()
			.await
			.err()
			.unwrap();
		assert!(matches!(err, TheaError::TokenNotFound(_)));
	}

	#[tokio::test]
	async fn test_configured_current_nbt_skips_lookup() {
		let mut profile = mumbai();
		profile.addresses.current_nbt_token = Some(NBT);
		profile.endpoints.relayer_url = Some("https://relayer.example".to_string());

		let mut delivery = on_chain(80001);
		delivery.expect_eth_call().never();
		let client = TheaClient::builder(profile)
			.delivery(Arc::new(delivery))
			.build()
			.await
			.unwrap();
		assert_eq!(client.context().addresses.current_nbt_token, Some(NBT));
		assert!(client.context().relayer.is_some());
	}

	#[tokio::test]
	async fn test_network_without_base_token_manager() {
		let mut delivery = on_chain(54211);
		delivery.expect_eth_call().never();
		let client = TheaClient::builder(NetworkProfile::defaults(TheaNetwork::HaqqTestnet))
			.delivery(Arc::new(delivery))
			.build()
			.await
			.unwrap();
		assert_eq!(client.context().addresses.current_nbt_token, None);
	}
}
