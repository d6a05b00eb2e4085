//! EIP-712 request building and signing.
//!
//! Every signature is produced over a freshly built message: the nonce is read
//! from the verifying contract right before signing and the deadline is set
//! twenty minutes ahead. The raw signature returned by the signer goes through
//! the signature codec before it is embedded in a call.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolStruct;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thea_account::TypedDataSigner;
use thea_types::{
	current_timestamp, ContractDetails, EcSignature, RawSignature, SignedPermit, TheaError,
	TypeField, TypedDomain, TypedMessage,
};

use super::context::ClientContext;
use super::contracts::{
	erc1155_permit, erc20_permit, AuthMessage, BtOptionOrder, ConvertWithSig, IBaseTokenManager,
	IRegistry, ITheaERC1155, ITheaERC20, RecoverWithSig, RetireWithSig, UnwrapWithSig,
	BASE_TOKEN_MANAGER_DOMAIN, REGISTRY_DOMAIN, THEA_ERC20,
};

/// Lifetime of a signed request.
pub const SIGNATURE_TTL_SECS: u64 = 20 * 60;

/// Splits `Name(type a,type b)` into its fields.
fn type_fields(root_type: &str) -> Vec<TypeField> {
	let inner = root_type
		.split_once('(')
		.map(|(_, rest)| rest.trim_end_matches(')'))
		.unwrap_or_default();

	inner
		.split(',')
		.filter_map(|field| field.trim().split_once(' '))
		.map(|(ty, name)| TypeField::new(name, ty))
		.collect()
}

/// Struct signed through EIP-712 whose JSON message is read off its own fields.
///
/// Unsigned integers are rendered as decimal strings.
pub trait TypedPayload: SolStruct {
	fn message(&self) -> Value;
}

impl TypedPayload for ConvertWithSig {
	fn message(&self) -> Value {
		json!({
			"id": self.id.to_string(),
			"amount": self.amount.to_string(),
			"owner": self.owner,
			"nonce": self.nonce.to_string(),
			"deadline": self.deadline.to_string(),
		})
	}
}

impl TypedPayload for RecoverWithSig {
	fn message(&self) -> Value {
		json!({
			"id": self.id.to_string(),
			"amount": self.amount.to_string(),
			"owner": self.owner,
			"nonce": self.nonce.to_string(),
			"deadline": self.deadline.to_string(),
		})
	}
}

impl TypedPayload for UnwrapWithSig {
	fn message(&self) -> Value {
		json!({
			"id": self.id.to_string(),
			"amount": self.amount.to_string(),
			"offchainAccount": self.offchainAccount,
			"owner": self.owner,
			"nonce": self.nonce.to_string(),
			"deadline": self.deadline.to_string(),
		})
	}
}

impl TypedPayload for RetireWithSig {
	fn message(&self) -> Value {
		json!({
			"tokenId": self.tokenId.to_string(),
			"amount": self.amount.to_string(),
			"detailsId": self.detailsId.to_string(),
			"receiver": self.receiver,
			"owner": self.owner,
			"nonce": self.nonce.to_string(),
			"deadline": self.deadline.to_string(),
		})
	}
}

impl TypedPayload for erc20_permit::Permit {
	fn message(&self) -> Value {
		json!({
			"owner": self.owner,
			"spender": self.spender,
			"value": self.value.to_string(),
			"nonce": self.nonce.to_string(),
			"deadline": self.deadline.to_string(),
		})
	}
}

impl TypedPayload for erc1155_permit::Permit {
	fn message(&self) -> Value {
		json!({
			"owner": self.owner,
			"operator": self.operator,
			"approved": self.approved,
			"nonce": self.nonce.to_string(),
			"deadline": self.deadline.to_string(),
		})
	}
}

impl TypedPayload for AuthMessage {
	fn message(&self) -> Value {
		json!({ "content": self.content })
	}
}

impl TypedPayload for BtOptionOrder {
	fn message(&self) -> Value {
		json!({
			"orderId": self.orderId,
			"btOptionId": self.btOptionId,
			"quantity": self.quantity.to_string(),
		})
	}
}

/// Builds the typed message for `value`, including its signing digest.
pub fn typed_message<T: TypedPayload>(domain: TypedDomain, value: &T) -> TypedMessage {
	let digest = value.eip712_signing_hash(&domain.to_eip712_domain());
	let mut types = BTreeMap::new();
	types.insert(T::NAME.to_string(), type_fields(&T::eip712_root_type()));

	TypedMessage {
		domain,
		primary_type: T::NAME.to_string(),
		types,
		message: value.message(),
		digest,
	}
}

fn deadline() -> u64 {
	current_timestamp() + SIGNATURE_TTL_SECS
}

/// Produces the signatures the relayed path and the backend need.
pub struct RequestBuilder<'a> {
	ctx: &'a ClientContext,
}

impl<'a> RequestBuilder<'a> {
	pub fn new(ctx: &'a ClientContext) -> Self {
		Self { ctx }
	}

	fn signer(&self) -> Result<&'a dyn TypedDataSigner, TheaError> {
		self.ctx.credentials.typed_data_signer()
	}

	async fn sign(
		signer: &dyn TypedDataSigner,
		message: &TypedMessage,
	) -> Result<RawSignature, TheaError> {
		tracing::debug!(
			primary_type = %message.primary_type,
			domain = %message.domain.name,
			"Requesting typed data signature"
		);
		Ok(signer.sign_typed_data(message).await?)
	}

	async fn sign_permit(
		signer: &dyn TypedDataSigner,
		message: &TypedMessage,
		deadline: u64,
	) -> Result<SignedPermit, TheaError> {
		let raw = Self::sign(signer, message).await?;
		Ok(SignedPermit {
			signature: EcSignature::try_from(&raw)?,
			deadline,
		})
	}

	async fn manager_nonce(&self, details: &ContractDetails, owner: Address) -> Result<U256, TheaError> {
		let nonce = self
			.ctx
			.read(&IBaseTokenManager::sigNoncesCall { owner }, &details.with_function("sigNonces"))
			.await?;
		tracing::debug!(%owner, %nonce, contract = %details.name, "Fetched signature nonce");
		Ok(nonce)
	}

	async fn registry_nonce(&self, owner: Address) -> Result<U256, TheaError> {
		let nonce = self
			.ctx
			.read(&IRegistry::sigNoncesCall { owner }, &self.ctx.registry("sigNonces"))
			.await?;
		tracing::debug!(%owner, %nonce, contract = "Registry", "Fetched signature nonce");
		Ok(nonce)
	}

	/// `ConvertWithSig` in the base token manager domain.
	pub async fn convert_with_sig(
		&self,
		id: U256,
		amount: U256,
		owner: Address,
	) -> Result<SignedPermit, TheaError> {
		let signer = self.signer()?;
		let details = self.ctx.base_token_manager("convertWithSig")?;
		let nonce = self.manager_nonce(&details, owner).await?;
		let deadline = deadline();

		let value = ConvertWithSig {
			id,
			amount,
			owner,
			nonce,
			deadline: U256::from(deadline),
		};
		let message = typed_message(
			TypedDomain::contract(BASE_TOKEN_MANAGER_DOMAIN, self.ctx.chain_id(), details.address),
			&value,
		);
		Self::sign_permit(signer, &message, deadline).await
	}

	/// `RecoverWithSig` in the base token manager domain.
	pub async fn recover_with_sig(
		&self,
		id: U256,
		amount: U256,
		owner: Address,
	) -> Result<SignedPermit, TheaError> {
		let signer = self.signer()?;
		let details = self.ctx.base_token_manager("recoverWithSig")?;
		let nonce = self.manager_nonce(&details, owner).await?;
		let deadline = deadline();

		let value = RecoverWithSig {
			id,
			amount,
			owner,
			nonce,
			deadline: U256::from(deadline),
		};
		let message = typed_message(
			TypedDomain::contract(BASE_TOKEN_MANAGER_DOMAIN, self.ctx.chain_id(), details.address),
			&value,
		);
		Self::sign_permit(signer, &message, deadline).await
	}

	/// `UnwrapWithSig` in the registry domain.
	pub async fn unwrap_with_sig(
		&self,
		id: U256,
		amount: U256,
		offchain_account: &str,
		owner: Address,
	) -> Result<SignedPermit, TheaError> {
		let signer = self.signer()?;
		let nonce = self.registry_nonce(owner).await?;
		let deadline = deadline();

		let value = UnwrapWithSig {
			id,
			amount,
			offchainAccount: offchain_account.to_string(),
			owner,
			nonce,
			deadline: U256::from(deadline),
		};
		let message = typed_message(
			TypedDomain::contract(REGISTRY_DOMAIN, self.ctx.chain_id(), self.ctx.addresses.contracts.registry),
			&value,
		);
		Self::sign_permit(signer, &message, deadline).await
	}

	/// `RetireWithSig` in the registry domain.
	pub async fn retire_with_sig(
		&self,
		token_id: U256,
		amount: U256,
		details_id: U256,
		receiver: Address,
		owner: Address,
	) -> Result<SignedPermit, TheaError> {
		let signer = self.signer()?;
		let nonce = self.registry_nonce(owner).await?;
		let deadline = deadline();

		let value = RetireWithSig {
			tokenId: token_id,
			amount,
			detailsId: details_id,
			receiver,
			owner,
			nonce,
			deadline: U256::from(deadline),
		};
		let message = typed_message(
			TypedDomain::contract(REGISTRY_DOMAIN, self.ctx.chain_id(), self.ctx.addresses.contracts.registry),
			&value,
		);
		Self::sign_permit(signer, &message, deadline).await
	}

	/// ERC-20 `Permit` in the token's own domain.
	pub async fn erc20_permit(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
		value: U256,
	) -> Result<SignedPermit, TheaError> {
		let signer = self.signer()?;
		let details = ContractDetails::new(THEA_ERC20, token, "name");
		let name = self.ctx.read(&ITheaERC20::nameCall {}, &details).await?;
		let nonce = self
			.ctx
			.read(&ITheaERC20::sigNoncesCall { owner }, &details.with_function("sigNonces"))
			.await?;
		let deadline = deadline();

		let permit = erc20_permit::Permit {
			owner,
			spender,
			value,
			nonce,
			deadline: U256::from(deadline),
		};
		let message = typed_message(TypedDomain::contract(name, self.ctx.chain_id(), token), &permit);
		Self::sign_permit(signer, &message, deadline).await
	}

	/// ERC-1155 operator `Permit` for the Thea collection.
	pub async fn erc1155_permit(
		&self,
		owner: Address,
		operator: Address,
	) -> Result<SignedPermit, TheaError> {
		let signer = self.signer()?;
		let details = self.ctx.erc1155("name");
		let name = self.ctx.read(&ITheaERC1155::nameCall {}, &details).await?;
		let nonce = self
			.ctx
			.read(&ITheaERC1155::sigNoncesCall { owner }, &details.with_function("sigNonces"))
			.await?;
		let deadline = deadline();

		let permit = erc1155_permit::Permit {
			owner,
			operator,
			approved: true,
			nonce,
			deadline: U256::from(deadline),
		};
		let message = typed_message(
			TypedDomain::contract(name, self.ctx.chain_id(), details.address),
			&permit,
		);
		Self::sign_permit(signer, &message, deadline).await
	}

	/// Signs a login challenge in the backend domain.
	pub async fn auth_message(&self, content: &str) -> Result<RawSignature, TheaError> {
		let signer = self.signer()?;
		let value = AuthMessage {
			content: content.to_string(),
		};
		let message = typed_message(TypedDomain::backend(self.ctx.chain_id()), &value);
		Self::sign(signer, &message).await
	}

	/// Signs an options order in the backend domain.
	pub async fn option_order(
		&self,
		order_id: &str,
		bt_option_id: &str,
		quantity: u64,
	) -> Result<RawSignature, TheaError> {
		let signer = self.signer()?;
		let value = BtOptionOrder {
			orderId: order_id.to_string(),
			btOptionId: bt_option_id.to_string(),
			quantity,
		};
		let message = typed_message(TypedDomain::backend(self.ctx.chain_id()), &value);
		Self::sign(signer, &message).await
	}
}
