//! Error taxonomy for the Thea SDK.
//!
//! Every failure surfaced to SDK callers is a [`TheaError`]. Each variant maps
//! onto a stable [`TheaErrorKind`] discriminant so callers can branch on the
//! kind without matching on messages. Transport variants carry enough context
//! (contract call site, HTTP method and path, raw GraphQL errors) to tell which
//! remote dependency failed.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifies the contract call site an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
	/// Contract name as published in its ABI artifact.
	pub name: String,
	/// Deployed contract address.
	pub address: Address,
	/// Function that was being called.
	pub contract_function: String,
}

impl ContractDetails {
	pub fn new(name: impl Into<String>, address: Address, contract_function: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			address,
			contract_function: contract_function.into(),
		}
	}

	/// Same contract, different function.
	pub fn with_function(&self, contract_function: impl Into<String>) -> Self {
		Self {
			name: self.name.clone(),
			address: self.address,
			contract_function: contract_function.into(),
		}
	}
}

impl fmt::Display for ContractDetails {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{} at {}", self.name, self.contract_function, self.address)
	}
}

/// HTTP verb attached to API call failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
	#[serde(rename = "GET")]
	Get,
	#[serde(rename = "POST")]
	Post,
}

impl fmt::Display for HttpMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			HttpMethod::Get => write!(f, "GET"),
			HttpMethod::Post => write!(f, "POST"),
		}
	}
}

/// Errors returned by SDK operations.
#[derive(Debug, Error)]
pub enum TheaError {
	/// Amount is zero, negative or breaks a granularity rule.
	#[error("{0}")]
	InvalidTokenAmountValue(String),
	/// A string could not be parsed as an Ethereum address.
	#[error("Passed address is not valid ethereum address: {0}")]
	InvalidAddress(String),
	/// Request id must be strictly positive.
	#[error("Request id should be greater than 0")]
	InvalidRequestIdValue,
	/// Deadline is in the past or malformed.
	#[error("Invalid deadline: {0}")]
	InvalidDeadline(String),
	/// Slippage tolerance outside the accepted range.
	#[error("Invalid slippage tolerance: {0}")]
	InvalidSlippageToleranceValue(String),

	/// The operation sends transactions but the client was built without a signer.
	#[error("Signer is required for this operation. You must pass in a signer on SDK initialization")]
	SignerRequired,
	/// The operation needs EIP-712 signing but the credentials cannot sign typed data.
	#[error("Typed data signer is required for this operation")]
	TypedDataSignerRequired,
	/// A signer was supplied without a chain provider to attach it to.
	#[error("Signer must have a provider")]
	SignerRequiresProvider,
	/// Neither a provider nor a signer was supplied.
	#[error("A provider is required: pass an RPC URL or a delivery implementation")]
	MissingProvider,
	/// The provider is connected to a different chain than the configured network.
	#[error("Provided network is {expected} but provider is connected to {actual} network")]
	NetworkMismatch { expected: u64, actual: u64 },
	/// Chain id is not one of the supported Thea networks.
	#[error("Unsupported network: {0}")]
	UnsupportedNetwork(u64),
	/// Configuration value rejected during client construction.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// Owner balance does not cover the amount for the named token.
	#[error("Insufficient {token} funds: {message}")]
	InsufficientFunds { token: String, message: String },
	/// A token address lookup returned the zero address.
	#[error("Token not found: {0}")]
	TokenNotFound(String),
	/// Options product id is not listed by the backend.
	#[error("Options product id is invalid: {0}")]
	InvalidOptionProductId(String),

	/// Raw signature was not 65 bytes long.
	#[error("Invalid signature size: expected 65 bytes, got {0}")]
	InvalidSignatureSize(usize),
	/// Neither the first nor the last byte is a recovery id.
	#[error("Invalid signature layout: cannot locate recovery id")]
	InvalidSignatureLayout,
	/// The credential backend refused or failed to sign.
	#[error("Signing failed: {0}")]
	SigningFailed(String),

	/// Gas is below the direct-execution threshold and no relayer is configured.
	#[error("Insufficient gas for direct execution and no relayer configured for network {0}")]
	RelayerNotConfigured(u64),
	/// A contract call or relayed transaction failed.
	#[error("Contract call {details} failed: {message}")]
	ContractCallFailed {
		details: ContractDetails,
		message: String,
	},
	/// An HTTP request to the backend failed at the transport level.
	#[error("{method} {path} failed: {message}")]
	ApiCallError {
		method: HttpMethod,
		path: String,
		message: String,
	},
	/// The backend answered with an error envelope.
	#[error("API responded with {code}: {message}")]
	ApiResponseError { code: String, message: String },
	/// The subgraph answered with GraphQL errors.
	#[error("Subgraph call failed: {message}")]
	SubgraphCallError {
		message: String,
		errors: Vec<serde_json::Value>,
	},
}

/// Stable discriminant of a [`TheaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TheaErrorKind {
	InvalidTokenAmountValue,
	InvalidAddress,
	InvalidRequestIdValue,
	InvalidDeadline,
	InvalidSlippageToleranceValue,
	SignerRequired,
	TypedDataSignerRequired,
	SignerRequiresProvider,
	MissingProvider,
	NetworkMismatch,
	UnsupportedNetwork,
	InvalidConfig,
	InsufficientFunds,
	TokenNotFound,
	InvalidOptionProductId,
	InvalidSignatureSize,
	InvalidSignatureLayout,
	SigningFailed,
	RelayerNotConfigured,
	ContractCallFailed,
	ApiCallError,
	ApiResponseError,
	SubgraphCallError,
}

impl TheaErrorKind {
	/// Upper-snake identifier shared with the backend and other SDKs.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::InvalidTokenAmountValue => "INVALID_TOKEN_AMOUNT_VALUE",
			Self::InvalidAddress => "INVALID_ADDRESS",
			Self::InvalidRequestIdValue => "INVALID_REQUEST_ID_VALUE",
			Self::InvalidDeadline => "INVALID_DEADLINE",
			Self::InvalidSlippageToleranceValue => "INVALID_SLIPPAGE_TOLERANCE_VALUE",
			Self::SignerRequired => "SIGNER_REQUIRED",
			Self::TypedDataSignerRequired => "TYPED_DATA_SIGNER_REQUIRED",
			Self::SignerRequiresProvider => "SIGNER_REQUIRES_PROVIDER",
			Self::MissingProvider => "MISSING_PROVIDER",
			Self::NetworkMismatch => "NETWORK_MISMATCH",
			Self::UnsupportedNetwork => "UNSUPPORTED_NETWORK",
			Self::InvalidConfig => "INVALID_CONFIG",
			Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
			Self::TokenNotFound => "TOKEN_NOT_FOUND",
			Self::InvalidOptionProductId => "INVALID_OPTION_PRODUCT_ID",
			Self::InvalidSignatureSize => "INVALID_SIGNATURE_SIZE",
			Self::InvalidSignatureLayout => "INVALID_SIGNATURE_LAYOUT",
			Self::SigningFailed => "SIGNING_FAILED",
			Self::RelayerNotConfigured => "RELAYER_NOT_CONFIGURED",
			Self::ContractCallFailed => "CONTRACT_CALL_FAILED",
			Self::ApiCallError => "API_CALL_ERROR",
			Self::ApiResponseError => "API_RESPONSE_ERROR",
			Self::SubgraphCallError => "SUBGRAPH_CALL_ERROR",
		}
	}
}

impl fmt::Display for TheaErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl TheaError {
	/// Returns the discriminant of this error.
	pub fn kind(&self) -> TheaErrorKind {
		match self {
			Self::InvalidTokenAmountValue(_) => TheaErrorKind::InvalidTokenAmountValue,
			Self::InvalidAddress(_) => TheaErrorKind::InvalidAddress,
			Self::InvalidRequestIdValue => TheaErrorKind::InvalidRequestIdValue,
			Self::InvalidDeadline(_) => TheaErrorKind::InvalidDeadline,
			Self::InvalidSlippageToleranceValue(_) => TheaErrorKind::InvalidSlippageToleranceValue,
			Self::SignerRequired => TheaErrorKind::SignerRequired,
			Self::TypedDataSignerRequired => TheaErrorKind::TypedDataSignerRequired,
			Self::SignerRequiresProvider => TheaErrorKind::SignerRequiresProvider,
			Self::MissingProvider => TheaErrorKind::MissingProvider,
			Self::NetworkMismatch { .. } => TheaErrorKind::NetworkMismatch,
			Self::UnsupportedNetwork(_) => TheaErrorKind::UnsupportedNetwork,
			Self::InvalidConfig(_) => TheaErrorKind::InvalidConfig,
			Self::InsufficientFunds { .. } => TheaErrorKind::InsufficientFunds,
			Self::TokenNotFound(_) => TheaErrorKind::TokenNotFound,
			Self::InvalidOptionProductId(_) => TheaErrorKind::InvalidOptionProductId,
			Self::InvalidSignatureSize(_) => TheaErrorKind::InvalidSignatureSize,
			Self::InvalidSignatureLayout => TheaErrorKind::InvalidSignatureLayout,
			Self::SigningFailed(_) => TheaErrorKind::SigningFailed,
			Self::RelayerNotConfigured(_) => TheaErrorKind::RelayerNotConfigured,
			Self::ContractCallFailed { .. } => TheaErrorKind::ContractCallFailed,
			Self::ApiCallError { .. } => TheaErrorKind::ApiCallError,
			Self::ApiResponseError { .. } => TheaErrorKind::ApiResponseError,
			Self::SubgraphCallError { .. } => TheaErrorKind::SubgraphCallError,
		}
	}

	/// Wraps a failure at a contract call site.
	pub fn contract_call(details: ContractDetails, err: impl fmt::Display) -> Self {
		Self::ContractCallFailed {
			details,
			message: err.to_string(),
		}
	}

	/// True for errors detected from arguments alone, before any I/O.
	pub fn is_validation(&self) -> bool {
		matches!(
			self.kind(),
			TheaErrorKind::InvalidTokenAmountValue
				| TheaErrorKind::InvalidAddress
				| TheaErrorKind::InvalidRequestIdValue
				| TheaErrorKind::InvalidDeadline
				| TheaErrorKind::InvalidSlippageToleranceValue
		)
	}
}
