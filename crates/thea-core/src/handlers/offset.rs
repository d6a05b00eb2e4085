//! Retirement of VCCs and of vintage base tokens.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Datelike, Utc};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use thea_types::{
	amount_should_be_gt_zero, OffsetHistory, OffsetOrder, OffsetOrderNft, OffsetOrderStripe,
	PostAction, TheaError, TokenKind, TransactionReceipt,
};
use tracing::instrument;

use crate::engine::contracts::{IBaseTokenManager, IRegistry};
use crate::engine::extractor::extract_direct;
use crate::engine::{
	ClientContext, Dispatcher, ExecutionPath, Extracted, RequestBuilder, RequestIdEvent,
	TokenManager,
};

pub struct OffsetHandler {
	ctx: Arc<ClientContext>,
}

impl OffsetHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	/// Retires `amount` of VCC `token_id` on behalf of `receiver`, the owner by default.
	#[instrument(skip_all, fields(token_id = %token_id, amount = %amount))]
	pub async fn offset_nft(
		&self,
		token_id: U256,
		amount: U256,
		receiver: Option<Address>,
	) -> Result<TransactionReceipt, TheaError> {
		let owner = self.ctx.owner()?;
		amount_should_be_gt_zero(amount)?;
		let registry = self.ctx.registry("retire");

		let vcc = TokenKind::Erc1155 { token_id };
		let tokens = TokenManager::new(&self.ctx);
		tokens.check_balance(&vcc, owner, amount).await?;
		let receiver = receiver.unwrap_or(owner);

		let dispatcher = Dispatcher::new(&self.ctx);
		match dispatcher.select_path(owner).await? {
			ExecutionPath::Direct => {
				tokens.approve(&vcc, owner, registry.address, amount).await?;
				let call = IRegistry::retireCall {
					tokenId: token_id,
					amount,
					receiver,
				};
				dispatcher.execute(&call, &registry).await
			},
			ExecutionPath::Relayed(relayer) => {
				let details = registry.with_function("retireWithSig");
				let vcc_sig = tokens.permit(&vcc, owner, registry.address, amount).await?;
				let sig = RequestBuilder::new(&self.ctx)
					.retire_with_sig(token_id, amount, U256::ZERO, receiver, owner)
					.await?;
				let call = IRegistry::retireWithSigCall {
					tokenId: token_id,
					amount,
					detailsId: U256::ZERO,
					receiver,
					owner,
					sig: sig.into(),
					vccSig: vcc_sig.into(),
				};
				dispatcher.relay(relayer.as_ref(), &call, &details).await
			},
		}
	}

	/// Requests retirement of `amount` base tokens of `vintage`.
	///
	/// Always executed directly by the owner.
	#[instrument(skip_all, fields(vintage = %vintage, amount = %amount))]
	pub async fn offset_fungible(
		&self,
		vintage: U256,
		amount: U256,
		token_id: U256,
	) -> Result<Extracted<RequestIdEvent>, TheaError> {
		let owner = self.ctx.owner()?;
		amount_should_be_gt_zero(amount)?;
		let registry = self.ctx.registry("requestRetireFungible");

		let token = self.base_token_by_vintage(vintage).await?;
		let base_token = TokenKind::Erc20At(token);
		let tokens = TokenManager::new(&self.ctx);
		tokens.check_balance(&base_token, owner, amount).await?;
		tokens.approve(&base_token, owner, registry.address, amount).await?;

		let call = IRegistry::requestRetireFungibleCall {
			vintage,
			amount,
			tokenId: token_id,
		};
		let receipt = Dispatcher::new(&self.ctx).execute(&call, &registry).await?;
		Ok(extract_direct::<IRegistry::RetireFungibleRequested>(receipt))
	}

	/// Date of the next scheduled retirement as reported by the backend.
	pub async fn next_offset_event_date(&self) -> Result<String, TheaError> {
		self.ctx.api.get("/nextRetirement", &[]).await
	}

	/// Retirements of the logged-in account, split between the current
	/// calendar month and earlier months.
	///
	/// Fiat orders count once retired by the backend. On-chain retirements
	/// sharing a transaction with a fiat order are listed once, as the order.
	#[instrument(skip_all)]
	pub async fn offset_history(&self) -> Result<OffsetHistory, TheaError> {
		let orders: Vec<OffsetOrderStripe> = self.ctx.api.post("/orders/list", &json!({})).await?;
		let events: Vec<OffsetOrderNft> = self.ctx.api.post("/events/list", &json!({})).await?;

		let history = merge_offsets(orders, events, Utc::now());
		tracing::debug!(
			committed = history.committed.len(),
			retired = history.retired.len(),
			"Loaded offset history"
		);
		Ok(history)
	}

	async fn base_token_by_vintage(&self, vintage: U256) -> Result<Address, TheaError> {
		let details = self.ctx.base_token_manager("baseTokens")?;
		let address = self
			.ctx
			.read(&IBaseTokenManager::baseTokensCall { vintage }, &details)
			.await?;
		if address.is_zero() {
			return Err(TheaError::TokenNotFound(format!(
				"Token by {} vintage not found",
				vintage
			)));
		}
		Ok(address)
	}
}

/// Backend status of a fiat order whose tokens have been handled.
const ORDER_PERFORMED: &str = "PERFORMED";

fn merge_offsets(
	orders: Vec<OffsetOrderStripe>,
	events: Vec<OffsetOrderNft>,
	now: DateTime<Utc>,
) -> OffsetHistory {
	let fiat: Vec<OffsetOrder> = orders
		.into_iter()
		.filter(|o| o.post_action == PostAction::Retire && o.status == ORDER_PERFORMED)
		.map(OffsetOrder::from)
		.collect();
	let fiat_hashes: HashSet<String> = fiat.iter().filter_map(|o| o.tx_hash.clone()).collect();
	let onchain = events
		.into_iter()
		.filter(|e| !fiat_hashes.contains(&e.tx_hash))
		.map(OffsetOrder::from);

	let mut history = OffsetHistory::default();
	for order in fiat.into_iter().chain(onchain) {
		let this_month = DateTime::from_timestamp_millis(order.dt)
			.is_some_and(|dt| dt.year() == now.year() && dt.month() == now.month());
		if this_month {
			history.committed.push(order);
		} else {
			history.retired.push(order);
		}
	}
	history
}
