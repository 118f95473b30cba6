//! Fixture helpers shared across integration tests. Signs with a real
//! secp256k1 key at test time instead of hardcoding a `(digest, r, s, v)`
//! vector no one can check by eye.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use safelens_core::primitives::{keccak256, Address, Digest, U256};
use safelens_core::signature::SECP256K1N_HALF;

/// A fixed, non-zero scalar well under the curve order — good enough for a
/// deterministic test key, not meant to hold anything of value.
pub fn owner_key() -> SigningKey {
    SigningKey::from_slice(&[0x42u8; 32]).expect("fixed scalar is a valid private key")
}

/// Derives the Ethereum-style address for a signing key: the low 20 bytes
/// of keccak256 over the uncompressed public key's `X || Y` (§4.2).
pub fn owner_address(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..32])
}

/// Produces a 65-byte standard EIP-712 ECDSA signature (`v` = 27/28) over
/// `digest`, normalized to low-`s` form per EIP-2.
pub fn sign_eip712(key: &SigningKey, digest: Digest) -> Vec<u8> {
    let (sig, recid) = key
        .sign_prehash_recoverable(digest.as_slice())
        .expect("signing a 32-byte prehash never fails");
    let bytes = sig.to_bytes();
    let r: [u8; 32] = bytes[0..32].try_into().unwrap();
    let s_val = U256::from_be_slice(&bytes[32..64]);
    let y_parity = recid.to_byte();

    let n = SECP256K1N_HALF * U256::from(2u8) + U256::from(1u8);
    let (s_final, y_final) = if s_val > SECP256K1N_HALF {
        (n - s_val, 1 - y_parity)
    } else {
        (s_val, y_parity)
    };

    let mut out = Vec::with_capacity(65);
    out.extend_from_slice(&r);
    out.extend_from_slice(&s_final.to_be_bytes::<32>());
    out.push(27 + y_final);
    out
}
