//! Common types for the Thea SDK.
//!
//! This crate holds the data model shared by every other crate in the workspace:
//! the tagged error taxonomy, the signature codec, the EIP-712 message model,
//! network profiles with their contract address books, and the transaction and
//! receipt shapes exchanged with the chain and the relayer.

/// Raw signatures and the canonical `{v, r, s}` codec.
pub mod account;
/// Backend REST payloads.
pub mod api;
/// Transactions, receipts and logs.
pub mod delivery;
/// EIP-712 domains and typed messages.
pub mod eip712;
/// Tagged error type returned by the SDK surface.
pub mod error;
/// Supported networks and their contract address books.
pub mod networks;
/// Secure string type for private keys.
pub mod secret_string;
/// Token kinds handled by the approval and permit flows.
pub mod tokens;
/// Argument validation and formatting helpers.
pub mod utils;

pub use account::*;
pub use api::*;
pub use delivery::*;
pub use eip712::{TypeField, TypedDomain, TypedMessage};
pub use error::{ContractDetails, HttpMethod, TheaError, TheaErrorKind};
pub use networks::{ContractAddresses, NetworkEndpoints, NetworkProfile, TheaNetwork};
pub use secret_string::SecretString;
pub use tokens::{BaseTokenAmounts, ResolvedAddresses, TheaErc20Token, TokenKind};
pub use utils::{
	amount_should_be_gt_zero, current_timestamp, request_id_should_be_gt_zero, TON,
	token_amount_should_be_ton, validate_address, with_0x_prefix, without_0x_prefix,
};
