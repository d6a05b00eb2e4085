//! Recovery of a VCC NFT by burning base tokens.
//!
//! The base tokens burned depend on how far the VCC's characteristics sit
//! above the base characteristics of the current NBT: every unit of the VCC
//! costs `RATE_VCC_TO_BT` current NBT plus that many SDG, vintage and rating
//! tokens per point of difference.

use alloy_primitives::U256;
use std::sync::Arc;
use thea_types::{amount_should_be_gt_zero, BaseTokenAmounts, TheaError};
use tracing::instrument;

use super::registry::RegistryHandler;
use crate::engine::contracts::{IBaseTokenManager, SigData};
use crate::engine::extractor::{extract_direct, extract_relayed};
use crate::engine::{
	ClientContext, Dispatcher, ExecutionPath, Extracted, RequestBuilder, TokenAmountEvent,
	TokenManager,
};

/// Base tokens minted per unit of VCC.
pub const RATE_VCC_TO_BT: u64 = 10;

pub struct RecoverHandler {
	ctx: Arc<ClientContext>,
}

impl RecoverHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	/// Burns the base tokens backing `amount` of VCC `token_id` and unlocks the NFT.
	#[instrument(skip_all, fields(token_id = %token_id, amount = %amount))]
	pub async fn recover_nft(
		&self,
		token_id: U256,
		amount: U256,
	) -> Result<Extracted<TokenAmountEvent>, TheaError> {
		let owner = self.ctx.owner()?;
		amount_should_be_gt_zero(amount)?;
		let manager = self.ctx.base_token_manager("recover")?;

		let amounts = self.base_token_amounts(token_id, amount).await?;
		let tokens = TokenManager::new(&self.ctx);
		tokens.check_balances(&amounts, owner).await?;

		let dispatcher = Dispatcher::new(&self.ctx);
		match dispatcher.select_path(owner).await? {
			ExecutionPath::Direct => {
				tokens.approve_all(&amounts, owner, manager.address).await?;
				let call = IBaseTokenManager::recoverCall { id: token_id, amount };
				let receipt = dispatcher.execute(&call, &manager).await?;
				Ok(extract_direct::<IBaseTokenManager::Recovered>(receipt))
			},
			ExecutionPath::Relayed(relayer) => {
				let details = manager.with_function("recoverWithSig");
				let permits = tokens.permit_all(&amounts, owner, manager.address).await?;
				let sig = RequestBuilder::new(&self.ctx)
					.recover_with_sig(token_id, amount, owner)
					.await?;
				let call = IBaseTokenManager::recoverWithSigCall {
					id: token_id,
					amount,
					owner,
					sig: sig.into(),
					permits: permits.into_iter().map(SigData::from).collect(),
				};
				let receipt = dispatcher.relay(relayer.as_ref(), &call, &details).await?;
				Ok(extract_relayed::<IBaseTokenManager::Recovered>(receipt, details.address))
			},
		}
	}

	/// Base tokens a recovery of `amount` of VCC `token_id` would burn.
	pub async fn query_recover_fungibles(
		&self,
		token_id: U256,
		amount: U256,
	) -> Result<BaseTokenAmounts, TheaError> {
		self.base_token_amounts(token_id, amount).await
	}

	async fn base_token_amounts(&self, token_id: U256, amount: U256) -> Result<BaseTokenAmounts, TheaError> {
		let base = self
			.ctx
			.read(
				&IBaseTokenManager::baseCharacteristicsCall {},
				&self.ctx.base_token_manager("baseCharacteristics")?,
			)
			.await?;
		let features = RegistryHandler::new(self.ctx.clone())
			.get_feature_values(token_id)
			.await?;

		// Characteristics below the base one cost nothing.
		let unit = amount.saturating_mul(U256::from(RATE_VCC_TO_BT));
		let delta = |value: U256, base: U256| unit.saturating_mul(value.saturating_sub(base));
		let amounts = BaseTokenAmounts {
			cbt: unit,
			sdg: delta(features.sdgs_count, base.sdgsCount),
			vintage: delta(features.vintage, base.vintage),
			rating: delta(features.rating, base.rating),
		};
		tracing::debug!(
			cbt = %amounts.cbt,
			sdg = %amounts.sdg,
			vintage = %amounts.vintage,
			rating = %amounts.rating,
			"Computed base token amounts"
		);
		Ok(amounts)
	}
}
