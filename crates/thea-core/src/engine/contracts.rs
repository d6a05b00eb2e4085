//! Contract ABIs and EIP-712 struct layouts.
//!
//! The `*WithSig` structs must match the verifying contracts field for field;
//! the contracts recompute the struct hash from their own definitions.

use alloy_primitives::U256;
use alloy_sol_types::sol;
use thea_types::SignedPermit;

pub const REGISTRY: &str = "Registry";
pub const BASE_TOKEN_MANAGER: &str = "BaseTokenManager";
pub const THEA_ERC20: &str = "TheaERC20";
pub const THEA_ERC1155: &str = "TheaERC1155";
pub const THEA_OPTIONS: &str = "TheaOptions";
pub const THEA_OPTIONS_VAULT: &str = "TheaOptionsVault";

/// EIP-712 domain names of the contracts that verify `*WithSig` calls.
pub const BASE_TOKEN_MANAGER_DOMAIN: &str = "TheaBaseTokenManager";
pub const REGISTRY_DOMAIN: &str = "TheaRegistry";

sol! {
	/// Signature plus deadline as accepted by the `*WithSig` entry points.
	struct SigData {
		uint8 v;
		bytes32 r;
		bytes32 s;
		uint256 deadline;
	}

	struct ConvertWithSig {
		uint256 id;
		uint256 amount;
		address owner;
		uint256 nonce;
		uint256 deadline;
	}

	struct RecoverWithSig {
		uint256 id;
		uint256 amount;
		address owner;
		uint256 nonce;
		uint256 deadline;
	}

	struct UnwrapWithSig {
		uint256 id;
		uint256 amount;
		string offchainAccount;
		address owner;
		uint256 nonce;
		uint256 deadline;
	}

	struct RetireWithSig {
		uint256 tokenId;
		uint256 amount;
		uint256 detailsId;
		address receiver;
		address owner;
		uint256 nonce;
		uint256 deadline;
	}

	struct AuthMessage {
		string content;
	}

	struct BtOptionOrder {
		string orderId;
		string btOptionId;
		uint64 quantity;
	}

	interface IRegistry {
		function sigNonces(address owner) external view returns (uint256);
		function getCharacteristicsBytes(uint256 id, bytes32[] keys) external view returns (bytes);
		function requests(uint256 requestId) external view returns (uint8 status, address maker, uint256 tokenId, uint256 amount);
		function unwrap(uint256 id, uint256 amount, string offchainAccount) external;
		function unwrapWithSig(uint256 id, uint256 amount, string offchainAccount, address owner, SigData sig, SigData vccSig) external;
		function retire(uint256 tokenId, uint256 amount, address receiver) external;
		function retireWithSig(uint256 tokenId, uint256 amount, uint256 detailsId, address receiver, address owner, SigData sig, SigData vccSig) external;
		function requestRetireFungible(uint256 vintage, uint256 amount, uint256 tokenId) external returns (uint256);

		event UnwrapRequested(uint256 indexed requestId, uint256 indexed tokenId, uint256 amount, string offchainAccount);
		event RetireFungibleRequested(uint256 indexed requestId, uint256 vintage, uint256 amount);
	}

	interface IBaseTokenManager {
		function baseCharacteristics() external view returns (uint256 vintage, uint256 sdgsCount, uint256 rating);
		function baseTokens(uint256 vintage) external view returns (address);
		function sigNonces(address owner) external view returns (uint256);
		function convert(uint256 id, uint256 amount) external;
		function convertWithSig(uint256 id, uint256 amount, address owner, SigData sig, SigData permit) external;
		function recover(uint256 id, uint256 amount) external;
		function recoverWithSig(uint256 id, uint256 amount, address owner, SigData sig, SigData[] permits) external;

		event Converted(uint256 indexed tokenId, uint256 amount);
		event Recovered(uint256 indexed tokenId, uint256 amount, address msgSender);
	}

	interface ITheaERC20 {
		function name() external view returns (string);
		function balanceOf(address owner) external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
		function sigNonces(address owner) external view returns (uint256);
	}

	interface ITheaERC1155 {
		function name() external view returns (string);
		function balanceOf(address owner, uint256 id) external view returns (uint256);
		function isApprovedForAll(address owner, address operator) external view returns (bool);
		function setApprovalForAll(address operator, bool approved) external;
		function sigNonces(address owner) external view returns (uint256);
	}

	interface ITheaOptions {
		function baseToken() external view returns (address);
		function usdc() external view returns (address);
		function exercise(string orderId) external;
	}

	interface ITheaOptionsVault {
		function deposit(address token, uint256 amount) external;
		function withdraw(address token, uint256 amount) external;
		function balanceOf(address owner, address token) external view returns (uint256);
	}
}

/// ERC-20 permit layout.
pub mod erc20_permit {
	alloy_sol_types::sol! {
		struct Permit {
			address owner;
			address spender;
			uint256 value;
			uint256 nonce;
			uint256 deadline;
		}
	}
}

/// ERC-1155 operator permit layout.
pub mod erc1155_permit {
	alloy_sol_types::sol! {
		struct Permit {
			address owner;
			address operator;
			bool approved;
			uint256 nonce;
			uint256 deadline;
		}
	}
}

impl From<SignedPermit> for SigData {
	fn from(permit: SignedPermit) -> Self {
		SigData {
			v: permit.signature.v,
			r: permit.signature.r,
			s: permit.signature.s,
			deadline: U256::from(permit.deadline),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{keccak256, Address, B256};
	use alloy_sol_types::{SolCall, SolEvent, SolStruct};
	use thea_types::EcSignature;

	#[test]
	fn test_event_signatures() {
		assert_eq!(
			IBaseTokenManager::Recovered::SIGNATURE_HASH,
			keccak256("Recovered(uint256,uint256,address)")
		);
		assert_eq!(
			IBaseTokenManager::Converted::SIGNATURE_HASH,
			keccak256("Converted(uint256,uint256)")
		);
		assert_eq!(
			IRegistry::UnwrapRequested::SIGNATURE_HASH,
			keccak256("UnwrapRequested(uint256,uint256,uint256,string)")
		);
	}

	#[test]
	fn test_struct_type_encodings() {
		assert_eq!(
			ConvertWithSig::eip712_root_type(),
			"ConvertWithSig(uint256 id,uint256 amount,address owner,uint256 nonce,uint256 deadline)"
		);
		assert_eq!(
			RetireWithSig::eip712_root_type(),
			"RetireWithSig(uint256 tokenId,uint256 amount,uint256 detailsId,address receiver,address owner,uint256 nonce,uint256 deadline)"
		);
		assert_eq!(
			erc1155_permit::Permit::eip712_root_type(),
			"Permit(address owner,address operator,bool approved,uint256 nonce,uint256 deadline)"
		);
		assert_eq!(AuthMessage::eip712_root_type(), "AuthMessage(string content)");
	}

	#[test]
	fn test_signed_permit_into_sig_data() {
		let permit = SignedPermit {
			signature: EcSignature {
				v: 28,
				r: B256::repeat_byte(0x11),
				s: B256::repeat_byte(0x22),
			},
			deadline: 1_700_000_000,
		};
		let sig: SigData = permit.into();
		assert_eq!(sig.v, 28);
		assert_eq!(sig.deadline, U256::from(1_700_000_000u64));
	}

	#[test]
	fn test_retire_uses_three_arguments() {
		let call = IRegistry::retireCall {
			tokenId: U256::from(1),
			amount: U256::from(10),
			receiver: Address::repeat_byte(0x33),
		};
		assert_eq!(call.abi_encode().len(), 4 + 3 * 32);
	}
}
