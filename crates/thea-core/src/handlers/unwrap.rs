//! Unwrapping of VCC NFTs back to the off-chain registry.

use alloy_primitives::U256;
use std::sync::Arc;
use thea_types::{
	request_id_should_be_gt_zero, token_amount_should_be_ton, TheaError, TokenKind, TokenStatus,
	UnwrapTokenState,
};
use tracing::instrument;

use crate::engine::contracts::IRegistry;
use crate::engine::extractor::{extract_direct, extract_relayed};
use crate::engine::{
	ClientContext, Dispatcher, ExecutionPath, Extracted, RequestBuilder, RequestIdEvent,
	TokenManager,
};

pub struct UnwrapHandler {
	ctx: Arc<ClientContext>,
}

impl UnwrapHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	/// Files a request to move `amount` of VCC `token_id` to `offchain_account`.
	///
	/// `amount` must be a whole number of tons.
	#[instrument(skip_all, fields(token_id = %token_id, amount = %amount))]
	pub async fn unwrap_token(
		&self,
		token_id: U256,
		amount: U256,
		offchain_account: &str,
	) -> Result<Extracted<RequestIdEvent>, TheaError> {
		let owner = self.ctx.owner()?;
		token_amount_should_be_ton(amount)?;
		let registry = self.ctx.registry("unwrap");

		let vcc = TokenKind::Erc1155 { token_id };
		let tokens = TokenManager::new(&self.ctx);
		tokens.check_balance(&vcc, owner, amount).await?;

		let dispatcher = Dispatcher::new(&self.ctx);
		match dispatcher.select_path(owner).await? {
			ExecutionPath::Direct => {
				tokens.approve(&vcc, owner, registry.address, amount).await?;
				let call = IRegistry::unwrapCall {
					id: token_id,
					amount,
					offchainAccount: offchain_account.to_string(),
				};
				let receipt = dispatcher.execute(&call, &registry).await?;
				Ok(extract_direct::<IRegistry::UnwrapRequested>(receipt))
			},
			ExecutionPath::Relayed(relayer) => {
				let details = registry.with_function("unwrapWithSig");
				let vcc_sig = tokens.permit(&vcc, owner, registry.address, amount).await?;
				let sig = RequestBuilder::new(&self.ctx)
					.unwrap_with_sig(token_id, amount, offchain_account, owner)
					.await?;
				let call = IRegistry::unwrapWithSigCall {
					id: token_id,
					amount,
					offchainAccount: offchain_account.to_string(),
					owner,
					sig: sig.into(),
					vccSig: vcc_sig.into(),
				};
				let receipt = dispatcher.relay(relayer.as_ref(), &call, &details).await?;
				Ok(extract_relayed::<IRegistry::UnwrapRequested>(receipt, details.address))
			},
		}
	}

	/// State of unwrap request `request_id`.
	pub async fn get_unwrap_token_state(&self, request_id: U256) -> Result<UnwrapTokenState, TheaError> {
		request_id_should_be_gt_zero(request_id)?;
		let details = self.ctx.registry("requests");
		let request = self
			.ctx
			.read(&IRegistry::requestsCall { requestId: request_id }, &details)
			.await?;

		let status = TokenStatus::try_from(request.status).map_err(|status| {
			TheaError::contract_call(details, format!("Unknown request status {}", status))
		})?;
		Ok(UnwrapTokenState {
			status,
			maker: request.maker,
			token_id: request.tokenId,
			amount: request.amount,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::context::tests::{context, receipt, OWNER};
	use crate::engine::contracts::ITheaERC1155;
	use alloy_primitives::{Address, Bytes, B256};
	use alloy_sol_types::{SolCall, SolEvent, SolValue};
	use thea_account::{Credentials, LocalWallet};
	use thea_delivery::{MockDeliveryInterface, MockRelayerInterface, RelayerInterface};
	use thea_types::{Log, Transaction};

	const TEST_PRIVATE_KEY: &str =
		"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn selector(tx: &Transaction) -> [u8; 4] {
		tx.data[..4].try_into().unwrap()
	}

	#[tokio::test]
	async fn test_amount_must_be_whole_tons() {
		let ctx = Arc::new(context(Credentials::Unlocked(OWNER), MockDeliveryInterface::new(), None));
		let err = UnwrapHandler::new(ctx)
			.unwrap_token(U256::from(1), U256::from(1001), "account")
			.await
			.unwrap_err();
		assert!(matches!(err, TheaError::InvalidTokenAmountValue(_)));
	}

	#[tokio::test]
	async fn test_request_id_must_be_positive() {
		let ctx = Arc::new(context(Credentials::ReadOnly, MockDeliveryInterface::new(), None));
		let err = UnwrapHandler::new(ctx).get_unwrap_token_state(U256::ZERO).await.unwrap_err();
		assert!(matches!(err, TheaError::InvalidRequestIdValue));
	}

	#[tokio::test]
	async fn test_unwrap_token_state() {
		let maker = Address::repeat_byte(0x42);
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_eth_call().times(1).returning(move |tx| {
			assert_eq!(selector(&tx), IRegistry::requestsCall::SELECTOR);
			let out = Bytes::from((1u16, maker, U256::from(7), U256::from(2000)).abi_encode());
			Box::pin(async move { Ok(out) })
		});

		let ctx = Arc::new(context(Credentials::ReadOnly, delivery, None));
		let state = UnwrapHandler::new(ctx).get_unwrap_token_state(U256::from(3)).await.unwrap();
		assert_eq!(state.status, TokenStatus::Accepted);
		assert_eq!(state.maker, maker);
		assert_eq!(state.token_id, U256::from(7));
		assert_eq!(state.amount, U256::from(2000));
	}

	#[tokio::test]
	async fn test_unknown_status_is_rejected() {
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_eth_call().returning(|_| {
			let out = Bytes::from((9u16, OWNER, U256::from(1), U256::from(1000)).abi_encode());
			Box::pin(async move { Ok(out) })
		});

		let ctx = Arc::new(context(Credentials::ReadOnly, delivery, None));
		let err = UnwrapHandler::new(ctx).get_unwrap_token_state(U256::from(1)).await.unwrap_err();
		assert!(matches!(err, TheaError::ContractCallFailed { .. }));
	}

	#[tokio::test]
	async fn test_relayed_unwrap_reads_request_id_from_registry_log() {
		let wallet = LocalWallet::new(TEST_PRIVATE_KEY).unwrap();
		let registry = thea_types::NetworkProfile::defaults(thea_types::TheaNetwork::Mumbai)
			.addresses
			.registry;

		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_eth_call().returning(|tx| {
			let out = if selector(&tx) == ITheaERC1155::balanceOfCall::SELECTOR {
				Bytes::from(U256::from(2000).abi_encode())
			} else if selector(&tx) == ITheaERC1155::nameCall::SELECTOR {
				Bytes::from("TheaERC1155".to_string().abi_encode())
			} else {
				Bytes::from(U256::from(4).abi_encode())
			};
			Box::pin(async move { Ok(out) })
		});
		delivery
			.expect_get_balance()
			.returning(|_| Box::pin(async { Ok(U256::ZERO) }));
		delivery.expect_get_receipt().times(1).returning(move |h| {
			let mut receipt = receipt(*h);
			receipt.logs.push(Log {
				address: registry,
				topics: vec![
					IRegistry::UnwrapRequested::SIGNATURE_HASH,
					B256::with_last_byte(9),
					B256::with_last_byte(1),
				],
				data: Bytes::from((U256::from(2000), "account".to_string()).abi_encode_params()),
			});
			Box::pin(async move { Ok(receipt) })
		});

		let mut relayer = MockRelayerInterface::new();
		relayer.expect_relay().times(1).returning(move |request| {
			assert_eq!(request.to, registry);
			let call = IRegistry::unwrapWithSigCall::abi_decode(&request.data).unwrap();
			assert_eq!(call.offchainAccount, "account");
			assert!(call.vccSig.v == 27 || call.vccSig.v == 28);
			Box::pin(async { Ok(B256::repeat_byte(0x10)) })
		});
		let relayer: Arc<dyn RelayerInterface> = Arc::new(relayer);

		let ctx = Arc::new(context(Credentials::signer(wallet), delivery, Some(relayer)));
		let result = UnwrapHandler::new(ctx)
			.unwrap_token(U256::from(1), U256::from(2000), "account")
			.await
			.unwrap();
		assert_eq!(result.response.request_id.as_deref(), Some("9"));
	}
}
