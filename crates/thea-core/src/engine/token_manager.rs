//! Balance checks, approvals and permits across the tokens an action moves.
//!
//! Tokens are handled one after another in a fixed order. Approvals are
//! separate transactions, so a failure part-way leaves the earlier ones in
//! place.

use alloy_primitives::{Address, U256};
use thea_types::{BaseTokenAmounts, ContractDetails, SignedPermit, TheaError, TokenKind};

use super::context::ClientContext;
use super::contracts::{ITheaERC1155, ITheaERC20, THEA_ERC1155, THEA_ERC20};
use super::typed_data::RequestBuilder;

pub struct TokenManager<'a> {
	ctx: &'a ClientContext,
}

impl<'a> TokenManager<'a> {
	pub fn new(ctx: &'a ClientContext) -> Self {
		Self { ctx }
	}

	fn token_name(kind: &TokenKind) -> String {
		match kind {
			TokenKind::Erc20(token) => token.to_string(),
			TokenKind::Erc20At(_) => THEA_ERC20.to_string(),
			TokenKind::Erc1155 { .. } => THEA_ERC1155.to_string(),
		}
	}

	fn erc20(&self, kind: &TokenKind, function: &str) -> Result<ContractDetails, TheaError> {
		let address = match kind {
			TokenKind::Erc20(token) => token.address_in(&self.ctx.addresses)?,
			TokenKind::Erc20At(address) => *address,
			TokenKind::Erc1155 { .. } => return Ok(self.ctx.erc1155(function)),
		};
		Ok(ContractDetails::new(Self::token_name(kind), address, function))
	}

	pub async fn balance_of(&self, kind: &TokenKind, owner: Address) -> Result<U256, TheaError> {
		let details = self.erc20(kind, "balanceOf")?;
		match kind {
			TokenKind::Erc1155 { token_id } => {
				self.ctx
					.read(&ITheaERC1155::balanceOfCall { owner, id: *token_id }, &details)
					.await
			},
			_ => self.ctx.read(&ITheaERC20::balanceOfCall { owner }, &details).await,
		}
	}

	/// Fails with `InsufficientFunds` naming the token when `owner` holds less than `amount`.
	pub async fn check_balance(
		&self,
		kind: &TokenKind,
		owner: Address,
		amount: U256,
	) -> Result<(), TheaError> {
		let balance = self.balance_of(kind, owner).await?;
		if balance < amount {
			return Err(TheaError::InsufficientFunds {
				token: Self::token_name(kind),
				message: format!("Amount should be less or equal than balance ({} < {})", balance, amount),
			});
		}
		Ok(())
	}

	/// Checks CurrentNBT, SDG, Vintage and Rating in that order.
	pub async fn check_balances(
		&self,
		amounts: &BaseTokenAmounts,
		owner: Address,
	) -> Result<(), TheaError> {
		for (token, amount) in amounts.ordered() {
			self.check_balance(&TokenKind::Erc20(token), owner, amount).await?;
		}
		Ok(())
	}

	/// Approves `spender` on-chain unless the current approval already covers `amount`.
	///
	/// ERC-1155 approval is operator-wide, so `amount` is ignored for it.
	pub async fn approve(
		&self,
		kind: &TokenKind,
		owner: Address,
		spender: Address,
		amount: U256,
	) -> Result<(), TheaError> {
		match kind {
			TokenKind::Erc1155 { .. } => {
				let details = self.ctx.erc1155("isApprovedForAll");
				let approved = self
					.ctx
					.read(&ITheaERC1155::isApprovedForAllCall { owner, operator: spender }, &details)
					.await?;
				if approved {
					tracing::debug!(%owner, %spender, "ERC1155 operator already approved");
					return Ok(());
				}
				let call = ITheaERC1155::setApprovalForAllCall {
					operator: spender,
					approved: true,
				};
				let receipt = self.ctx.send(&call, &details.with_function("setApprovalForAll")).await?;
				tracing::info!(
					tx_hash = %receipt.transaction_hash,
					%spender,
					"Approved ERC1155 operator"
				);
			},
			_ => {
				let details = self.erc20(kind, "allowance")?;
				let allowance = self
					.ctx
					.read(&ITheaERC20::allowanceCall { owner, spender }, &details)
					.await?;
				if allowance >= amount {
					tracing::debug!(token = %details.name, %allowance, %amount, "Allowance covers amount");
					return Ok(());
				}
				let call = ITheaERC20::approveCall { spender, amount };
				let receipt = self.ctx.send(&call, &details.with_function("approve")).await?;
				tracing::info!(
					tx_hash = %receipt.transaction_hash,
					token = %details.name,
					%spender,
					%amount,
					"Approved token spend"
				);
			},
		}
		Ok(())
	}

	/// Approves every base token for `spender`, in check order.
	pub async fn approve_all(
		&self,
		amounts: &BaseTokenAmounts,
		owner: Address,
		spender: Address,
	) -> Result<(), TheaError> {
		for (token, amount) in amounts.ordered() {
			self.approve(&TokenKind::Erc20(token), owner, spender, amount).await?;
		}
		Ok(())
	}

	/// Signs a permit standing in for [`approve`](Self::approve).
	pub async fn permit(
		&self,
		kind: &TokenKind,
		owner: Address,
		spender: Address,
		amount: U256,
	) -> Result<SignedPermit, TheaError> {
		let builder = RequestBuilder::new(self.ctx);
		let permit = match kind {
			TokenKind::Erc1155 { .. } => builder.erc1155_permit(owner, spender).await?,
			_ => {
				let token = self.erc20(kind, "permit")?.address;
				builder.erc20_permit(token, owner, spender, amount).await?
			},
		};
		tracing::info!(
			token = %Self::token_name(kind),
			%spender,
			deadline = permit.deadline,
			"Signed permit"
		);
		Ok(permit)
	}

	/// Permits for a recovery: the current NBT always, the others only when non-zero.
	pub async fn permit_all(
		&self,
		amounts: &BaseTokenAmounts,
		owner: Address,
		spender: Address,
	) -> Result<Vec<SignedPermit>, TheaError> {
		let mut permits = Vec::with_capacity(4);
		for (index, (token, amount)) in amounts.ordered().into_iter().enumerate() {
			if index > 0 && amount.is_zero() {
				tracing::debug!(%token, "Skipping permit for zero amount");
				continue;
			}
			permits.push(self.permit(&TokenKind::Erc20(token), owner, spender, amount).await?);
		}
		Ok(permits)
	}
}
