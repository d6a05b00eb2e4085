//! Token kinds handled by the approval and permit flows.

use crate::{ContractAddresses, TheaError};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fungible Thea tokens addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TheaErc20Token {
	#[serde(rename = "SDG")]
	Sdg,
	Vintage,
	Rating,
	#[serde(rename = "CurrentNBT")]
	CurrentNbt,
	Stable,
}

impl TheaErc20Token {
	/// Resolves the token's deployed address.
	pub fn address_in(&self, addresses: &ResolvedAddresses) -> Result<Address, TheaError> {
		let address = match self {
			TheaErc20Token::Sdg => addresses.contracts.sdg_token,
			TheaErc20Token::Vintage => addresses.contracts.vintage_token,
			TheaErc20Token::Rating => addresses.contracts.rating_token,
			TheaErc20Token::Stable => addresses.contracts.stable_token,
			TheaErc20Token::CurrentNbt => addresses.current_nbt_token,
		};
		address.ok_or_else(|| TheaError::TokenNotFound(format!("{} token is not deployed", self)))
	}
}

impl fmt::Display for TheaErc20Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TheaErc20Token::Sdg => "SDG",
			TheaErc20Token::Vintage => "Vintage",
			TheaErc20Token::Rating => "Rating",
			TheaErc20Token::CurrentNbt => "CurrentNBT",
			TheaErc20Token::Stable => "Stable",
		};
		f.write_str(name)
	}
}

/// What a balance check or approval is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	/// A named Thea ERC-20 token.
	Erc20(TheaErc20Token),
	/// Any ERC-20 by address (vintage base tokens, option deposit tokens).
	Erc20At(Address),
	/// A single id of the Thea ERC-1155 collection.
	Erc1155 { token_id: U256 },
}

/// Address book with the current NBT token resolved.
///
/// Built once by the client at construction time. The current NBT token is
/// `None` on networks without a base token manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddresses {
	pub contracts: ContractAddresses,
	pub current_nbt_token: Option<Address>,
}

/// Base-token amounts a recovery burns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseTokenAmounts {
	pub cbt: U256,
	pub sdg: U256,
	pub vintage: U256,
	pub rating: U256,
}

impl BaseTokenAmounts {
	/// Amounts in fixed order: CurrentNBT, SDG, Vintage, Rating.
	pub fn ordered(&self) -> [(TheaErc20Token, U256); 4] {
		[
			(TheaErc20Token::CurrentNbt, self.cbt),
			(TheaErc20Token::Sdg, self.sdg),
			(TheaErc20Token::Vintage, self.vintage),
			(TheaErc20Token::Rating, self.rating),
		]
	}
}

impl Serialize for BaseTokenAmounts {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		use serde::ser::SerializeStruct;
		let mut state = serializer.serialize_struct("BaseTokenAmounts", 4)?;
		state.serialize_field("cbt", &self.cbt.to_string())?;
		state.serialize_field("sdg", &self.sdg.to_string())?;
		state.serialize_field("vintage", &self.vintage.to_string())?;
		state.serialize_field("rating", &self.rating.to_string())?;
		state.end()
	}
}
