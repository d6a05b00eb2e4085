//! Signature types and the raw-signature codec.
//!
//! Wallets and RPC nodes disagree on how a 65-byte ECDSA signature is laid
//! out: most return `r || s || v`, some return `v || r || s`, and the recovery
//! id may be given as `0/1` or `27/28`. [`parse_raw_signature`] normalises all
//! of them into an [`EcSignature`] whose `v` is always 27 or 28.

use crate::{TheaError, with_0x_prefix, without_0x_prefix};
use alloy_primitives::{B256, Signature, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a raw ECDSA signature with recovery id.
pub const SIGNATURE_LENGTH: usize = 65;

/// Raw signature bytes as returned by a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignature(pub Vec<u8>);

impl From<Signature> for RawSignature {
	fn from(sig: Signature) -> Self {
		// r || s || v with v in {27, 28}
		let mut bytes = Vec::with_capacity(SIGNATURE_LENGTH);
		bytes.extend_from_slice(&sig.r().to_be_bytes::<32>());
		bytes.extend_from_slice(&sig.s().to_be_bytes::<32>());
		bytes.push(if sig.v() { 28 } else { 27 });
		RawSignature(bytes)
	}
}

impl RawSignature {
	/// Formats the signature the way the Thea backend expects it: `V.R.S`,
	/// upper-case hex, with `v` taken from the last byte.
	pub fn to_backend_format(&self) -> String {
		let hex = hex::encode(&self.0);
		if hex.len() < 4 {
			return hex.to_uppercase();
		}
		let (body, v) = hex.split_at(hex.len() - 2);
		let split = body.len().min(64);
		let (r, s) = body.split_at(split);
		format!("{}.{}.{}", v, r, s).to_uppercase()
	}
}

impl fmt::Display for RawSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", with_0x_prefix(&hex::encode(&self.0)))
	}
}

/// Canonical `{v, r, s}` signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcSignature {
	/// Recovery id, always 27 or 28.
	pub v: u8,
	pub r: B256,
	pub s: B256,
}

/// A signature together with the deadline it was signed for.
///
/// Used both for token permits and for the action's own `*WithSig` request;
/// the verifying contract rejects it once `deadline` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPermit {
	pub signature: EcSignature,
	/// Unix timestamp in seconds.
	pub deadline: u64,
}

impl SignedPermit {
	pub fn deadline_u256(&self) -> U256 {
		U256::from(self.deadline)
	}
}

fn is_recovery_id(byte: u8) -> bool {
	matches!(byte, 0 | 1 | 27 | 28)
}

fn normalize_v(byte: u8) -> u8 {
	if byte < 27 { byte + 27 } else { byte }
}

impl EcSignature {
	/// Decodes 65 raw bytes, preferring the `r || s || v` layout.
	///
	/// The last byte is checked first; only when it is not a recovery id is the
	/// first byte tried as `v` of a `v || r || s` layout.
	pub fn from_raw(raw: &[u8]) -> Result<Self, TheaError> {
		if raw.len() != SIGNATURE_LENGTH {
			return Err(TheaError::InvalidSignatureSize(raw.len()));
		}

		let last = raw[64];
		if is_recovery_id(last) {
			return Ok(Self {
				v: normalize_v(last),
				r: B256::from_slice(&raw[0..32]),
				s: B256::from_slice(&raw[32..64]),
			});
		}

		let first = raw[0];
		if !is_recovery_id(first) {
			return Err(TheaError::InvalidSignatureLayout);
		}

		Ok(Self {
			v: normalize_v(first),
			r: B256::from_slice(&raw[1..33]),
			s: B256::from_slice(&raw[33..65]),
		})
	}

	/// Re-encodes as `r || s || v`.
	pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
		let mut out = [0u8; SIGNATURE_LENGTH];
		out[0..32].copy_from_slice(self.r.as_slice());
		out[32..64].copy_from_slice(self.s.as_slice());
		out[64] = self.v;
		out
	}
}

/// Parses a hex-encoded raw signature (with or without `0x`).
///
/// Input that is not valid hex is reported as a size error, like any other
/// input that does not decode to exactly 65 bytes.
pub fn parse_raw_signature(raw: &str) -> Result<EcSignature, TheaError> {
	let bytes = hex::decode(without_0x_prefix(raw)).map_err(|_| TheaError::InvalidSignatureSize(0))?;
	EcSignature::from_raw(&bytes)
}

impl TryFrom<&RawSignature> for EcSignature {
	type Error = TheaError;

	fn try_from(raw: &RawSignature) -> Result<Self, Self::Error> {
		EcSignature::from_raw(&raw.0)
	}
}
