//! Conversion of a VCC NFT into base tokens.

use alloy_primitives::U256;
use std::sync::Arc;
use thea_types::{amount_should_be_gt_zero, TheaError, TokenKind};
use tracing::instrument;

use crate::engine::contracts::IBaseTokenManager;
use crate::engine::extractor::{extract_direct, extract_relayed};
use crate::engine::{
	ClientContext, Dispatcher, ExecutionPath, Extracted, RequestBuilder, TokenAmountEvent,
	TokenManager,
};

pub struct ConvertHandler {
	ctx: Arc<ClientContext>,
}

impl ConvertHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	/// Locks `amount` of VCC `token_id` in the base token manager and mints
	/// the matching base tokens to the owner.
	#[instrument(skip_all, fields(token_id = %token_id, amount = %amount))]
	pub async fn convert_nft(
		&self,
		token_id: U256,
		amount: U256,
	) -> Result<Extracted<TokenAmountEvent>, TheaError> {
		let owner = self.ctx.owner()?;
		amount_should_be_gt_zero(amount)?;
		let manager = self.ctx.base_token_manager("convert")?;

		let vcc = TokenKind::Erc1155 { token_id };
		let tokens = TokenManager::new(&self.ctx);
		tokens.check_balance(&vcc, owner, amount).await?;

		let dispatcher = Dispatcher::new(&self.ctx);
		match dispatcher.select_path(owner).await? {
			ExecutionPath::Direct => {
				tokens.approve(&vcc, owner, manager.address, amount).await?;
				let call = IBaseTokenManager::convertCall { id: token_id, amount };
				let receipt = dispatcher.execute(&call, &manager).await?;
				Ok(extract_direct::<IBaseTokenManager::Converted>(receipt))
			},
			ExecutionPath::Relayed(relayer) => {
				let details = manager.with_function("convertWithSig");
				let permit = tokens.permit(&vcc, owner, manager.address, amount).await?;
				let sig = RequestBuilder::new(&self.ctx)
					.convert_with_sig(token_id, amount, owner)
					.await?;
				let call = IBaseTokenManager::convertWithSigCall {
					id: token_id,
					amount,
					owner,
					sig: sig.into(),
					permit: permit.into(),
				};
				let receipt = dispatcher.relay(relayer.as_ref(), &call, &details).await?;
				Ok(extract_relayed::<IBaseTokenManager::Converted>(receipt, details.address))
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::context::tests::{context, receipt, OWNER};
	use crate::engine::contracts::ITheaERC1155;
	use alloy_primitives::{Address, Bytes, B256};
	use alloy_sol_types::{SolCall, SolEvent, SolValue};
	use std::sync::Mutex;
	use thea_account::{Credentials, LocalWallet};
	use thea_delivery::{MockDeliveryInterface, MockRelayerInterface, RelayerInterface};
	use thea_types::{Log, NetworkProfile, TheaNetwork, Transaction};

	const TEST_PRIVATE_KEY: &str =
		"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn selector(tx: &Transaction) -> [u8; 4] {
		tx.data[..4].try_into().unwrap()
	}

	fn manager() -> Address {
		NetworkProfile::defaults(TheaNetwork::Mumbai).base_token_manager().unwrap()
	}

	fn converted_log(manager: Address) -> Log {
		Log {
			address: manager,
			topics: vec![IBaseTokenManager::Converted::SIGNATURE_HASH, B256::with_last_byte(1)],
			data: Bytes::from(U256::from(500).abi_encode()),
		}
	}

	#[tokio::test]
	async fn test_rejects_zero_amount_before_io() {
		let ctx = Arc::new(context(Credentials::Unlocked(OWNER), MockDeliveryInterface::new(), None));
		let err = ConvertHandler::new(ctx).convert_nft(U256::from(1), U256::ZERO).await.unwrap_err();
		assert!(matches!(err, TheaError::InvalidTokenAmountValue(_)));
	}

	#[tokio::test]
	async fn test_requires_signer() {
		let ctx = Arc::new(context(Credentials::ReadOnly, MockDeliveryInterface::new(), None));
		let err = ConvertHandler::new(ctx).convert_nft(U256::from(1), U256::from(1)).await.unwrap_err();
		assert!(matches!(err, TheaError::SignerRequired));
	}

	#[tokio::test]
	async fn test_direct_convert() {
		let submitted = Arc::new(Mutex::new(Vec::new()));
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_eth_call().returning(|tx| {
			let out = if selector(&tx) == ITheaERC1155::balanceOfCall::SELECTOR {
				Bytes::from(U256::from(500).abi_encode())
			} else if selector(&tx) == ITheaERC1155::isApprovedForAllCall::SELECTOR {
				Bytes::from(false.abi_encode())
			} else {
				panic!("unexpected call {:?}", selector(&tx))
			};
			Box::pin(async move { Ok(out) })
		});
		delivery
			.expect_get_balance()
			.returning(|_| Box::pin(async { Ok(U256::from(2_000_000_000_000_000u64)) }));
		let log = submitted.clone();
		delivery.expect_submit().times(2).returning(move |tx| {
			log.lock().unwrap().push(selector(&tx));
			Box::pin(async { Ok(B256::repeat_byte(0x0c)) })
		});
		delivery.expect_wait_for_confirmation().times(2).returning(|h, _| {
			let mut receipt = receipt(*h);
			receipt.logs.push(converted_log(manager()));
			Box::pin(async move { Ok(receipt) })
		});

		let ctx = Arc::new(context(Credentials::Unlocked(OWNER), delivery, None));
		let result = ConvertHandler::new(ctx).convert_nft(U256::from(1), U256::from(500)).await.unwrap();
		assert_eq!(result.response.id.as_deref(), Some("1"));
		assert_eq!(result.response.amount.as_deref(), Some("500"));
		assert_eq!(
			*submitted.lock().unwrap(),
			vec![
				ITheaERC1155::setApprovalForAllCall::SELECTOR,
				IBaseTokenManager::convertCall::SELECTOR
			]
		);
	}

	#[tokio::test]
	async fn test_relayed_convert_signs_and_relays() {
		let wallet = LocalWallet::new(TEST_PRIVATE_KEY).unwrap();
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_eth_call().returning(|tx| {
			let out = if selector(&tx) == ITheaERC1155::balanceOfCall::SELECTOR {
				Bytes::from(U256::from(500).abi_encode())
			} else if selector(&tx) == ITheaERC1155::nameCall::SELECTOR {
				Bytes::from("TheaERC1155".to_string().abi_encode())
			} else {
				Bytes::from(U256::ZERO.abi_encode())
			};
			Box::pin(async move { Ok(out) })
		});
		delivery
			.expect_get_balance()
			.returning(|_| Box::pin(async { Ok(U256::from(1)) }));
		delivery.expect_submit().never();
		delivery.expect_get_receipt().times(1).returning(|h| {
			let mut receipt = receipt(*h);
			receipt.logs.push(converted_log(manager()));
			Box::pin(async move { Ok(receipt) })
		});

		let mut relayer = MockRelayerInterface::new();
		relayer.expect_relay().times(1).returning(|request| {
			assert_eq!(request.to, manager());
			assert_eq!(
				request.data[..4],
				IBaseTokenManager::convertWithSigCall::SELECTOR
			);
			let call = IBaseTokenManager::convertWithSigCall::abi_decode(&request.data).unwrap();
			assert_eq!(call.amount, U256::from(500));
			assert!(call.sig.v == 27 || call.sig.v == 28);
			Box::pin(async { Ok(B256::repeat_byte(0x0d)) })
		});
		let relayer: Arc<dyn RelayerInterface> = Arc::new(relayer);

		let ctx = Arc::new(context(Credentials::signer(wallet), delivery, Some(relayer)));
		let result = ConvertHandler::new(ctx).convert_nft(U256::from(1), U256::from(500)).await.unwrap();
		assert_eq!(result.response.amount.as_deref(), Some("500"));
		assert_eq!(result.receipt.transaction_hash, B256::repeat_byte(0x0d));
	}
}
