//! Argument validation and formatting helpers.
//!
//! Validators run before any I/O and only ever return validation kinds of
//! [`TheaError`].

use crate::TheaError;
use alloy_primitives::{Address, U256};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Granularity of unwrap amounts.
pub const TON: u64 = 1000;

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Current Unix timestamp in seconds. Returns 0 if the clock is before the epoch.
pub fn current_timestamp() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

pub fn amount_should_be_gt_zero(amount: U256) -> Result<(), TheaError> {
	if amount.is_zero() {
		return Err(TheaError::InvalidTokenAmountValue(
			"Amount should be greater than 0".to_string(),
		));
	}
	Ok(())
}

/// Amount must be a positive whole multiple of 1000.
pub fn token_amount_should_be_ton(amount: U256) -> Result<(), TheaError> {
	if amount.is_zero() || !(amount % U256::from(TON)).is_zero() {
		return Err(TheaError::InvalidTokenAmountValue(
			"Amount should be a ton. Value must be greater than 0 and divisible by 1000".to_string(),
		));
	}
	Ok(())
}

pub fn request_id_should_be_gt_zero(request_id: U256) -> Result<(), TheaError> {
	if request_id.is_zero() {
		return Err(TheaError::InvalidRequestIdValue);
	}
	Ok(())
}

/// Parses an address, accepting any hex case.
pub fn validate_address(address: &str) -> Result<Address, TheaError> {
	let trimmed = address.trim();
	if without_0x_prefix(trimmed).len() != 40 {
		return Err(TheaError::InvalidAddress(address.to_string()));
	}
	Address::from_str(&with_0x_prefix(trimmed)).map_err(|_| TheaError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_prefix_helpers() {
		assert_eq!(with_0x_prefix("abcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0Xabcd"), "0Xabcd");
		assert_eq!(without_0x_prefix("0xabcd"), "abcd");
		assert_eq!(without_0x_prefix("abcd"), "abcd");
	}

	#[test]
	fn test_amount_should_be_gt_zero() {
		assert!(amount_should_be_gt_zero(U256::from(1)).is_ok());
		let err = amount_should_be_gt_zero(U256::ZERO).unwrap_err();
		assert!(err.is_validation());
	}

	#[test]
	fn test_ton_granularity() {
		assert!(token_amount_should_be_ton(U256::from(1000)).is_ok());
		assert!(token_amount_should_be_ton(U256::from(5000)).is_ok());
		for bad in [0u64, 999, 1001, 1500] {
			assert!(matches!(
				token_amount_should_be_ton(U256::from(bad)),
				Err(TheaError::InvalidTokenAmountValue(_))
			));
		}
	}

	#[test]
	fn test_request_id() {
		assert!(request_id_should_be_gt_zero(U256::from(7)).is_ok());
		assert!(matches!(
			request_id_should_be_gt_zero(U256::ZERO),
			Err(TheaError::InvalidRequestIdValue)
		));
	}

	#[test]
	fn test_validate_address() {
		let addr = validate_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
		assert_eq!(
			addr,
			validate_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
		);
		assert!(matches!(
			validate_address("0x1234"),
			Err(TheaError::InvalidAddress(_))
		));
		assert!(validate_address("0xzz9Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_err());
	}
}
