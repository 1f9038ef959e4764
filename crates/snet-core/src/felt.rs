//! # Field-Element Encoding
//!
//! The settlement chain's native scalar domain is a 252-bit field element
//! ("felt"). Every contract call argument — receipt identifiers, party
//! commitments, amounts, proof hashes — must be encoded into this domain
//! before submission.
//!
//! ## The reference mapping
//!
//! [`Felt::encode_reference`] is the single string→felt mapping of the
//! stack, and it is deterministic and documented because it affects
//! on-chain identity matching:
//!
//! - Decimal strings (`"123"`) parse as integers.
//! - `0x`-prefixed hex strings parse as integers.
//! - Any other string is treated as a *short string*: its UTF-8 bytes are
//!   interpreted as a big-endian integer. At most **31 bytes** are allowed,
//!   which keeps the value comfortably below the field prime and makes the
//!   mapping lossless — [`Felt::decode_short_string`] inverts it exactly.
//!
//! Longer identifiers must be hashed into the domain by the caller (see
//! [`Felt::from_hash_bytes`]); the encoder rejects them rather than
//! truncating silently.
//!
//! ## Domain bound
//!
//! All values are strictly below the Stark prime
//! `2^251 + 17·2^192 + 1`; constructors reject anything larger.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// The Stark prime `2^251 + 17·2^192 + 1`, big-endian.
const FIELD_PRIME: [u8; 32] = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// Maximum UTF-8 byte length for a short-string encoding.
pub const MAX_SHORT_STRING_BYTES: usize = 31;

/// Errors from field-element encoding and decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeltError {
    /// The input reference was empty.
    #[error("empty reference cannot be encoded as a field element")]
    Empty,

    /// The value does not fit below the field prime.
    #[error("value out of field range: {0}")]
    OutOfRange(String),

    /// A string exceeded the 31-byte short-string limit.
    #[error("string too long for short-string encoding: {len} bytes (max {MAX_SHORT_STRING_BYTES})")]
    StringTooLong {
        /// UTF-8 byte length of the rejected string.
        len: usize,
    },

    /// A hex string contained non-hex characters or no digits.
    #[error("invalid hex literal: {0:?}")]
    InvalidHex(String),

    /// A decimal string overflowed 256 bits or contained no digits.
    #[error("invalid decimal literal: {0:?}")]
    InvalidDecimal(String),

    /// The felt does not decode to valid UTF-8.
    #[error("field element is not a valid short string")]
    NotAShortString,
}

/// A field element of the settlement chain, stored as 32 big-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Felt([u8; 32]);

impl Felt {
    /// The zero element.
    pub const ZERO: Felt = Felt([0u8; 32]);

    /// From a machine integer. Always in range.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// From big-endian bytes. At most 32 bytes; the value must be below
    /// the field prime.
    pub fn from_bytes_be(bytes: &[u8]) -> Result<Self, FeltError> {
        if bytes.len() > 32 {
            return Err(FeltError::OutOfRange(format!(
                "{} bytes exceeds the 32-byte field width",
                bytes.len()
            )));
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(bytes);
        if out >= FIELD_PRIME {
            return Err(FeltError::OutOfRange(hex_render(&out)));
        }
        Ok(Self(out))
    }

    /// From the leading 31 bytes of a hash digest.
    ///
    /// A 31-byte value is always below the prime, so this is the canonical
    /// way to fold arbitrary-length material (SHA-256 output, long
    /// identifiers) into the field.
    pub fn from_hash_bytes(digest: &[u8]) -> Self {
        let take = digest.len().min(MAX_SHORT_STRING_BYTES);
        let mut out = [0u8; 32];
        out[32 - take..].copy_from_slice(&digest[..take]);
        Self(out)
    }

    /// Parse a hex literal, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, FeltError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > 64 {
            return Err(FeltError::InvalidHex(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        // Right-align: walk nibbles from the least significant end.
        for (i, c) in digits.chars().rev().enumerate() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| FeltError::InvalidHex(s.to_string()))? as u8;
            let byte_index = 31 - i / 2;
            if i % 2 == 0 {
                bytes[byte_index] |= nibble;
            } else {
                bytes[byte_index] |= nibble << 4;
            }
        }
        if bytes >= FIELD_PRIME {
            return Err(FeltError::OutOfRange(hex_render(&bytes)));
        }
        Ok(Self(bytes))
    }

    /// Parse a decimal literal.
    pub fn from_decimal(s: &str) -> Result<Self, FeltError> {
        if s.is_empty() {
            return Err(FeltError::InvalidDecimal(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        for c in s.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| FeltError::InvalidDecimal(s.to_string()))?
                as u8;
            mul_add_small(&mut bytes, 10, digit)
                .map_err(|_| FeltError::InvalidDecimal(s.to_string()))?;
        }
        if bytes >= FIELD_PRIME {
            return Err(FeltError::OutOfRange(hex_render(&bytes)));
        }
        Ok(Self(bytes))
    }

    /// Encode a short string (≤ 31 UTF-8 bytes) as a big-endian integer.
    pub fn encode_short_string(s: &str) -> Result<Self, FeltError> {
        let bytes = s.as_bytes();
        if bytes.is_empty() {
            return Err(FeltError::Empty);
        }
        if bytes.len() > MAX_SHORT_STRING_BYTES {
            return Err(FeltError::StringTooLong { len: bytes.len() });
        }
        // 31 bytes always fit below the prime.
        Self::from_bytes_be(bytes)
    }

    /// The stack-wide reference encoding: numeric strings pass through as
    /// integers, everything else is short-string encoded.
    pub fn encode_reference(s: &str) -> Result<Self, FeltError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(FeltError::Empty);
        }
        if trimmed.starts_with("0x") {
            return Self::from_hex(trimmed);
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Self::from_decimal(trimmed);
        }
        Self::encode_short_string(trimmed)
    }

    /// Invert [`Felt::encode_short_string`]: strip leading zero bytes and
    /// interpret the rest as UTF-8.
    pub fn decode_short_string(&self) -> Result<String, FeltError> {
        let start = self
            .0
            .iter()
            .position(|&b| b != 0)
            .ok_or(FeltError::NotAShortString)?;
        String::from_utf8(self.0[start..].to_vec()).map_err(|_| FeltError::NotAShortString)
    }

    /// The full 32-byte big-endian representation.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.0
    }

    /// Minimal `0x`-prefixed lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex_render(&self.0)
    }

    /// Whether this is the zero element.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

/// Fold a payment reference (transaction id or settlement id) into the
/// field domain.
///
/// The reference's hex body is split into two halves, the halves are
/// hashed together, and the leading 31 digest bytes become the felt. The
/// split keeps the derivation aligned with chain-side implementations
/// that hash a txid as two field elements.
pub fn proof_hash_for_reference(reference: &str) -> Result<Felt, FeltError> {
    let body = reference.trim().strip_prefix("0x").unwrap_or(reference.trim());
    if body.is_empty() {
        return Err(FeltError::Empty);
    }
    // Split on bytes: byte 31 need not be a char boundary.
    let bytes = body.as_bytes();
    let (first, second) = bytes.split_at(bytes.len().min(31));
    let mut hasher = Sha256::new();
    hasher.update(first);
    hasher.update(b":");
    hasher.update(second);
    Ok(Felt::from_hash_bytes(&hasher.finalize()))
}

/// Minimal hex rendering of a big-endian value, `0x0` for zero.
fn hex_render(bytes: &[u8; 32]) -> String {
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{trimmed}")
    }
}

/// `bytes = bytes * mul + add` over a 256-bit big-endian value.
/// Errors on 256-bit overflow.
fn mul_add_small(bytes: &mut [u8; 32], mul: u8, add: u8) -> Result<(), ()> {
    let mut carry = add as u32;
    for i in (0..32).rev() {
        let v = bytes[i] as u32 * mul as u32 + carry;
        bytes[i] = (v & 0xff) as u8;
        carry = v >> 8;
    }
    if carry != 0 {
        Err(())
    } else {
        Ok(())
    }
}

impl std::fmt::Display for Felt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Serialize as the hex rendering; accept hex or decimal on the way in.
impl Serialize for Felt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Felt::encode_reference(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_u64_roundtrips_through_hex() {
        let felt = Felt::from_u64(100_000_000);
        assert_eq!(felt.to_hex(), "0x5f5e100");
        assert_eq!(Felt::from_hex("0x5f5e100").unwrap(), felt);
    }

    #[test]
    fn decimal_parse_matches_u64() {
        assert_eq!(
            Felt::from_decimal("100000000").unwrap(),
            Felt::from_u64(100_000_000)
        );
        assert_eq!(Felt::from_decimal("0").unwrap(), Felt::ZERO);
    }

    #[test]
    fn hex_without_prefix_is_accepted() {
        assert_eq!(Felt::from_hex("ff").unwrap(), Felt::from_u64(255));
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(Felt::from_hex("0xzz").is_err());
        assert!(Felt::from_hex("0x").is_err());
        assert!(Felt::from_hex("").is_err());
    }

    #[test]
    fn prime_is_out_of_range() {
        assert!(matches!(
            Felt::from_bytes_be(&FIELD_PRIME),
            Err(FeltError::OutOfRange(_))
        ));
        // One below the prime is fine.
        let mut below = FIELD_PRIME;
        below[31] = 0x00;
        assert!(Felt::from_bytes_be(&below).is_ok());
    }

    #[test]
    fn short_string_roundtrip() {
        let felt = Felt::encode_short_string("INV-1727").unwrap();
        assert_eq!(felt.decode_short_string().unwrap(), "INV-1727");
    }

    #[test]
    fn short_string_rejects_32_bytes() {
        let long = "a".repeat(32);
        assert_eq!(
            Felt::encode_short_string(&long),
            Err(FeltError::StringTooLong { len: 32 })
        );
    }

    #[test]
    fn encode_reference_dispatches() {
        // Decimal passes through as an integer, not a short string.
        assert_eq!(
            Felt::encode_reference("123").unwrap(),
            Felt::from_u64(123)
        );
        // Hex passes through as an integer.
        assert_eq!(
            Felt::encode_reference("0xff").unwrap(),
            Felt::from_u64(255)
        );
        // Everything else is a short string.
        assert_eq!(
            Felt::encode_reference("receipt-9").unwrap(),
            Felt::encode_short_string("receipt-9").unwrap()
        );
    }

    #[test]
    fn encode_reference_rejects_empty_and_whitespace() {
        assert_eq!(Felt::encode_reference(""), Err(FeltError::Empty));
        assert_eq!(Felt::encode_reference("   "), Err(FeltError::Empty));
    }

    #[test]
    fn proof_hash_is_deterministic_and_in_range() {
        let a = proof_hash_for_reference("0xabcdef0123456789").unwrap();
        let b = proof_hash_for_reference("0xabcdef0123456789").unwrap();
        assert_eq!(a, b);
        assert!(!a.is_zero());
        // Distinct references produce distinct hashes.
        let c = proof_hash_for_reference("0xabcdef0123456788").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn proof_hash_rejects_empty() {
        assert_eq!(proof_hash_for_reference(""), Err(FeltError::Empty));
        assert_eq!(proof_hash_for_reference("0x"), Err(FeltError::Empty));
    }

    #[test]
    fn proof_hash_splits_multibyte_references_on_bytes() {
        // 40 bytes, with byte 31 landing mid-character.
        let reference = "é".repeat(20);
        let felt = proof_hash_for_reference(&reference).unwrap();
        assert!(!felt.is_zero());
        assert_eq!(felt, proof_hash_for_reference(&reference).unwrap());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let felt = Felt::from_u64(42);
        assert_eq!(serde_json::to_string(&felt).unwrap(), "\"0x2a\"");
        let parsed: Felt = serde_json::from_str("\"0x2a\"").unwrap();
        assert_eq!(parsed, felt);
    }

    proptest! {
        #[test]
        fn prop_u64_decimal_roundtrip(value: u64) {
            let felt = Felt::from_decimal(&value.to_string()).unwrap();
            prop_assert_eq!(felt, Felt::from_u64(value));
        }

        #[test]
        fn prop_short_string_roundtrip(s in "[ -~]{1,31}") {
            let felt = Felt::encode_short_string(&s).unwrap();
            prop_assert_eq!(felt.decode_short_string().unwrap(), s);
        }

        #[test]
        fn prop_hex_roundtrip(value: u64) {
            let felt = Felt::from_u64(value);
            prop_assert_eq!(Felt::from_hex(&felt.to_hex()).unwrap(), felt);
        }
    }
}
