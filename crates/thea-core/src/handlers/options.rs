//! Base token options: deposit-backed orders and their exercise.
//!
//! A call option is collateralised with the product's base token, a put with
//! USDC worth `quantity * strike`. The collateral is deposited into the
//! product's vault before the order is prepared and signed with the backend.

use alloy_primitives::{Address, U256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use thea_types::{
	ContractDetails, OptionType, OptionsProduct, OrderCreateRequest, OrderPrepareRequest,
	OrderRecord, OrderRequest, TheaError, TokenKind, TransactionReceipt,
};
use tracing::instrument;

use crate::engine::contracts::{ITheaOptions, ITheaOptionsVault, THEA_OPTIONS, THEA_OPTIONS_VAULT};
use crate::engine::{ClientContext, RequestBuilder, TokenManager};

/// Decimals of an option quantity.
pub const QUANTITY_DECIMALS: u32 = 4;
/// Decimals of the USDC collateral of a put.
pub const USDC_DECIMALS: u32 = 6;

/// `value` as an integer with `decimals` fractional digits.
///
/// Fails when `value` is negative or has more fractional digits than `decimals`.
pub fn parse_fixed(value: f64, decimals: u32) -> Result<U256, TheaError> {
	let invalid = || {
		TheaError::InvalidTokenAmountValue(format!(
			"{} cannot be represented with {} decimals",
			value, decimals
		))
	};

	let parsed = Decimal::from_str(&value.to_string()).map_err(|_| invalid())?;
	let scaled = parsed
		.checked_mul(Decimal::from(10u64.pow(decimals)))
		.ok_or_else(invalid)?;
	if scaled.is_sign_negative() || !scaled.fract().is_zero() {
		return Err(invalid());
	}
	scaled.to_u128().map(U256::from).ok_or_else(invalid)
}

pub struct OptionsHandler {
	ctx: Arc<ClientContext>,
}

impl OptionsHandler {
	pub fn new(ctx: Arc<ClientContext>) -> Self {
		Self { ctx }
	}

	async fn product(&self, bt_option_id: &str) -> Result<OptionsProduct, TheaError> {
		let products: Vec<OptionsProduct> = self.ctx.api.post("/bt_options/list", &json!({})).await?;
		products
			.into_iter()
			.find(|product| product.uuid == bt_option_id)
			.ok_or_else(|| TheaError::InvalidOptionProductId(bt_option_id.to_string()))
	}

	fn options_contract(product: &OptionsProduct, function: &str) -> ContractDetails {
		ContractDetails::new(THEA_OPTIONS, product.contract_addr, function)
	}

	fn vault(product: &OptionsProduct, function: &str) -> ContractDetails {
		ContractDetails::new(THEA_OPTIONS_VAULT, product.vault_addr, function)
	}

	async fn base_token(&self, product: &OptionsProduct) -> Result<Address, TheaError> {
		self.ctx
			.read(&ITheaOptions::baseTokenCall {}, &Self::options_contract(product, "baseToken"))
			.await
	}

	async fn usdc(&self, product: &OptionsProduct) -> Result<Address, TheaError> {
		self.ctx
			.read(&ITheaOptions::usdcCall {}, &Self::options_contract(product, "usdc"))
			.await
	}

	/// Deposits the collateral for `quantity` options of `bt_option_id` and
	/// registers the signed order with the backend.
	#[instrument(skip_all, fields(bt_option_id = %bt_option_id, quantity = quantity))]
	pub async fn create_order(&self, bt_option_id: &str, quantity: f64) -> Result<OrderRecord, TheaError> {
		if !(quantity > 0.0) {
			return Err(TheaError::InvalidTokenAmountValue(
				"Amount should be greater than 0".to_string(),
			));
		}
		self.ctx.credentials.typed_data_signer()?;
		let owner = self.ctx.owner()?;

		let product = self.product(bt_option_id).await?;
		let scaled_quantity = parse_fixed(quantity, QUANTITY_DECIMALS)?;
		let (token, deposit) = match product.option_type {
			OptionType::Call => (self.base_token(&product).await?, scaled_quantity),
			OptionType::Put => (
				self.usdc(&product).await?,
				parse_fixed(quantity * product.strike, USDC_DECIMALS)?,
			),
		};
		tracing::debug!(%token, %deposit, option_type = ?product.option_type, "Resolved option collateral");

		let collateral = TokenKind::Erc20At(token);
		let tokens = TokenManager::new(&self.ctx);
		tokens.check_balance(&collateral, owner, deposit).await?;
		tokens.approve(&collateral, owner, product.vault_addr, deposit).await?;
		self.ctx
			.send(
				&ITheaOptionsVault::depositCall { token, amount: deposit },
				&Self::vault(&product, "deposit"),
			)
			.await?;

		let order: OrderRequest = self
			.ctx
			.api
			.post(
				"/bt_options_orders/prepare",
				&OrderPrepareRequest {
					bt_option_id: bt_option_id.to_string(),
					quantity,
				},
			)
			.await?;

		let signed_quantity = u64::try_from(scaled_quantity).map_err(|_| {
			TheaError::InvalidTokenAmountValue(format!("Quantity {} is too large", quantity))
		})?;
		let signature = RequestBuilder::new(&self.ctx)
			.option_order(&order.order_id, bt_option_id, signed_quantity)
			.await?
			.to_backend_format();

		let record: OrderRecord = self
			.ctx
			.api
			.post(
				"/bt_options_orders/create",
				&OrderCreateRequest {
					order_id: order.order_id,
					bt_option_id: bt_option_id.to_string(),
					quantity,
					signature,
				},
			)
			.await?;
		tracing::info!(order = %record.uuid, status = %record.status, "Options order created");
		Ok(record)
	}

	/// Orders of the logged-in client.
	pub async fn get_orders(&self) -> Result<Vec<OrderRecord>, TheaError> {
		self.ctx.api.post("/bt_options_orders/list", &json!({})).await
	}

	/// Exercises `order_id` and withdraws whatever the vault holds for the owner.
	#[instrument(skip_all, fields(order_id = %order_id))]
	pub async fn exercise(&self, order_id: &str, bt_option_id: &str) -> Result<TransactionReceipt, TheaError> {
		let owner = self.ctx.owner()?;
		let product = self.product(bt_option_id).await?;
		let base_token = self.base_token(&product).await?;
		let usdc = self.usdc(&product).await?;

		let receipt = self
			.ctx
			.send(
				&ITheaOptions::exerciseCall {
					orderId: order_id.to_string(),
				},
				&Self::options_contract(&product, "exercise"),
			)
			.await?;

		for token in [base_token, usdc] {
			let balance = self
				.ctx
				.read(
					&ITheaOptionsVault::balanceOfCall { owner, token },
					&Self::vault(&product, "balanceOf"),
				)
				.await?;
			if balance.is_zero() {
				continue;
			}
			self.ctx
				.send(
					&ITheaOptionsVault::withdrawCall { token, amount: balance },
					&Self::vault(&product, "withdraw"),
				)
				.await?;
			tracing::info!(%token, amount = %balance, "Withdrew vault balance");
		}
		Ok(receipt)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::context::tests::{context, receipt, OWNER};
	use crate::engine::contracts::ITheaERC20;
	use alloy_primitives::{Bytes, B256};
	use alloy_sol_types::{SolCall, SolValue};
	use serde_json::Value;
	use std::sync::Mutex;
	use thea_account::{Credentials, LocalWallet};
	use thea_api::HttpClient;
	use thea_delivery::MockDeliveryInterface;
	use thea_types::Transaction;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const TEST_PRIVATE_KEY: &str =
		"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const OPTIONS: Address = Address::new([0x0a; 20]);
	const VAULT: Address = Address::new([0x0b; 20]);
	const BASE_TOKEN: Address = Address::new([0xbb; 20]);
	const USDC: Address = Address::new([0xcc; 20]);

	fn selector(tx: &Transaction) -> [u8; 4] {
		tx.data[..4].try_into().unwrap()
	}

	fn product_json(uuid: &str, option_type: &str, strike: f64) -> Value {
		json!({
			"uuid": uuid,
			"contractId": "1",
			"strike": strike,
			"optionType": option_type,
			"enabled": true,
			"updatedAt": "2026-10-01T00:00:00Z",
			"vaultAddr": VAULT,
			"contractAddr": OPTIONS,
			"premiumPrice": 0.5,
			"expiry": "2026-12-31T00:00:00Z"
		})
	}

	fn envelope(result: Value) -> ResponseTemplate {
		ResponseTemplate::new(200).set_body_json(json!({ "result": result, "error": null }))
	}

	async fn backend(products: Value) -> MockServer {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/cli/bt_options/list"))
			.respond_with(envelope(products))
			.mount(&server)
			.await;
		server
	}

	#[test]
	fn test_parse_fixed() {
		assert_eq!(parse_fixed(1.5, 4).unwrap(), U256::from(15_000));
		assert_eq!(parse_fixed(2.0 * 0.35, 6).unwrap(), U256::from(700_000));
		assert!(matches!(
			parse_fixed(0.12345, 4),
			Err(TheaError::InvalidTokenAmountValue(_))
		));
		assert!(parse_fixed(-1.0, 4).is_err());
	}

	#[tokio::test]
	async fn test_create_order_rejects_non_positive_quantity() {
		let ctx = context(Credentials::ReadOnly, MockDeliveryInterface::new(), None);
		let err = OptionsHandler::new(Arc::new(ctx)).create_order("p", 0.0).await.unwrap_err();
		assert!(matches!(err, TheaError::InvalidTokenAmountValue(_)));
	}

	#[tokio::test]
	async fn test_unknown_product_id() {
		let server = backend(json!([product_json("other", "Call", 1.0)])).await;
		let wallet = LocalWallet::new(TEST_PRIVATE_KEY).unwrap();
		let mut ctx = context(Credentials::signer(wallet), MockDeliveryInterface::new(), None);
		ctx.api = HttpClient::new(&format!("{}/cli", server.uri())).unwrap();

		let err = OptionsHandler::new(Arc::new(ctx)).create_order("missing", 1.0).await.unwrap_err();
		assert!(matches!(err, TheaError::InvalidOptionProductId(ref id) if id == "missing"));
	}

	#[tokio::test]
	async fn test_create_put_order_deposits_usdc() {
		let server = backend(json!([product_json("put-1", "Put", 0.35)])).await;
		Mock::given(method("POST"))
			.and(path("/cli/bt_options_orders/prepare"))
			.respond_with(envelope(json!({
				"orderId": "order-1",
				"btOptionId": "put-1",
				"quantity": 2.0
			})))
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/cli/bt_options_orders/create"))
			.respond_with(envelope(json!({
				"uuid": "order-1",
				"status": "CREATED",
				"createdAt": "2026-10-01T00:00:00Z",
				"updatedAt": "2026-10-01T00:00:00Z",
				"btOptionId": "put-1",
				"quantity": 2.0,
				"ethAddr": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
			})))
			.expect(1)
			.mount(&server)
			.await;

		let deposits = Arc::new(Mutex::new(Vec::new()));
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_eth_call().returning(|tx| {
			let s = selector(&tx);
			let out = if s == ITheaOptions::usdcCall::SELECTOR {
				Bytes::from(USDC.abi_encode())
			} else if s == ITheaERC20::balanceOfCall::SELECTOR {
				assert_eq!(tx.to, USDC);
				Bytes::from(U256::from(5_000_000).abi_encode())
			} else if s == ITheaERC20::allowanceCall::SELECTOR {
				Bytes::from(U256::ZERO.abi_encode())
			} else {
				panic!("unexpected call {:?}", s)
			};
			Box::pin(async move { Ok(out) })
		});
		let log = deposits.clone();
		delivery.expect_submit().times(2).returning(move |tx| {
			log.lock().unwrap().push(tx.clone());
			Box::pin(async { Ok(B256::repeat_byte(0x14)) })
		});
		delivery.expect_wait_for_confirmation().returning(|h, _| {
			let receipt = receipt(*h);
			Box::pin(async move { Ok(receipt) })
		});

		let wallet = LocalWallet::new(TEST_PRIVATE_KEY).unwrap();
		let mut ctx = context(Credentials::signer(wallet), delivery, None);
		ctx.api = HttpClient::new(&format!("{}/cli", server.uri())).unwrap();

		let record = OptionsHandler::new(Arc::new(ctx)).create_order("put-1", 2.0).await.unwrap();
		assert_eq!(record.uuid, "order-1");

		let sent = deposits.lock().unwrap();
		let approve = ITheaERC20::approveCall::abi_decode(&sent[0].data).unwrap();
		assert_eq!(approve.spender, VAULT);
		assert_eq!(approve.amount, U256::from(700_000));
		assert_eq!(sent[1].to, VAULT);
		let deposit = ITheaOptionsVault::depositCall::abi_decode(&sent[1].data).unwrap();
		assert_eq!(deposit.token, USDC);
		assert_eq!(deposit.amount, U256::from(700_000));
	}

	#[tokio::test]
	async fn test_get_orders() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/cli/bt_options_orders/list"))
			.respond_with(envelope(json!([{
				"uuid": "order-1",
				"status": "EXERCISED",
				"txHash": "0xabc",
				"createdAt": "2026-10-01T00:00:00Z",
				"updatedAt": "2026-10-02T00:00:00Z",
				"btOptionId": "call-1",
				"quantity": 1.5,
				"premium": 0.2,
				"ethAddr": "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
			}])))
			.mount(&server)
			.await;

		let mut ctx = context(Credentials::ReadOnly, MockDeliveryInterface::new(), None);
		ctx.api = HttpClient::new(&format!("{}/cli", server.uri())).unwrap();
		let orders = OptionsHandler::new(Arc::new(ctx)).get_orders().await.unwrap();
		assert_eq!(orders.len(), 1);
		assert_eq!(orders[0].tx_hash.as_deref(), Some("0xabc"));
		assert_eq!(orders[0].premium, Some(0.2));
	}

	#[tokio::test]
	async fn test_exercise_withdraws_non_zero_balances() {
		let server = backend(json!([product_json("call-1", "Call", 1.2)])).await;
		let submitted = Arc::new(Mutex::new(Vec::new()));
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_eth_call().returning(|tx| {
			let s = selector(&tx);
			let out = if s == ITheaOptions::baseTokenCall::SELECTOR {
				Bytes::from(BASE_TOKEN.abi_encode())
			} else if s == ITheaOptions::usdcCall::SELECTOR {
				Bytes::from(USDC.abi_encode())
			} else {
				let call = ITheaOptionsVault::balanceOfCall::abi_decode(&tx.data).unwrap();
				let balance = if call.token == BASE_TOKEN { U256::ZERO } else { U256::from(42) };
				Bytes::from(balance.abi_encode())
			};
			Box::pin(async move { Ok(out) })
		});
		let log = submitted.clone();
		delivery.expect_submit().times(2).returning(move |tx| {
			log.lock().unwrap().push(selector(&tx));
			Box::pin(async { Ok(B256::repeat_byte(0x15)) })
		});
		delivery.expect_wait_for_confirmation().returning(|h, _| {
			let receipt = receipt(*h);
			Box::pin(async move { Ok(receipt) })
		});

		let mut ctx = context(Credentials::Unlocked(OWNER), delivery, None);
		ctx.api = HttpClient::new(&format!("{}/cli", server.uri())).unwrap();
		OptionsHandler::new(Arc::new(ctx)).exercise("order-1", "call-1").await.unwrap();
		assert_eq!(
			*submitted.lock().unwrap(),
			vec![
				ITheaOptions::exerciseCall::SELECTOR,
				ITheaOptionsVault::withdrawCall::SELECTOR
			]
		);
	}
}
