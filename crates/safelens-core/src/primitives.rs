//! 20/32-byte primitives, the hex codec, and keccak256.
//!
//! SafeLens never invents its own fixed-width integer or address type —
//! `alloy_primitives` already gives us checksum-agnostic equality (two
//! `Address` values compare equal regardless of the casing they were
//! parsed from) and a `U256` backed by `ruint`, so "case-insensitive
//! compare" and "fixed-width 256-bit integer" fall out of the type system
//! instead of needing bespoke logic here.

pub use alloy_primitives::{keccak256, Address, Bytes, B256, U256};

/// A 32-byte digest. `B256` is reused verbatim; this alias just gives call
/// sites in this crate a name that matches the spec's vocabulary.
pub type Digest = B256;

/// Parses a decimal string into a `U256`, enforcing the spec's "no leading
/// zeros beyond a single `0`" rule before handing the string to `ruint`.
///
/// `ruint`'s own `FromStr` is more permissive than the spec wants (it would
/// happily accept `"007"`), so the leading-zero check has to live here.
pub fn parse_u256_decimal(s: &str) -> Result<U256, IntegerParseError> {
    if s.is_empty() {
        return Err(IntegerParseError::Empty);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IntegerParseError::NotDecimal);
    }
    if s.len() > 1 && s.as_bytes()[0] == b'0' {
        return Err(IntegerParseError::LeadingZero);
    }
    s.parse::<U256>().map_err(|_| IntegerParseError::Overflow)
}

/// Parses a decimal string into a `u64` (used for `chainId` and `nonce`,
/// which the spec bounds to 64 bits rather than 256).
pub fn parse_u64_decimal(s: &str) -> Result<u64, IntegerParseError> {
    let value = parse_u256_decimal(s)?;
    u64::try_from(value).map_err(|_| IntegerParseError::Overflow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntegerParseError {
    #[error("empty integer string")]
    Empty,
    #[error("not a decimal integer string")]
    NotDecimal,
    #[error("leading zero not permitted")]
    LeadingZero,
    #[error("integer does not fit in the target width")]
    Overflow,
}

/// Decodes a `0x`-prefixed (or bare) hex string into bytes. An empty string
/// or bare `"0x"` decodes to an empty `Vec`, matching the spec's `data:
/// "0x"` convention for an empty calldata payload.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
}

/// Encodes bytes as a lowercase `0x`-prefixed hex string, the canonical
/// byte-string representation the report codec (§6) requires.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
