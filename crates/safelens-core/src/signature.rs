//! Signature decoding and verification across the four coexisting Safe
//! signature schemes (spec §4.2).

use crate::error::SignatureOutcome;
use crate::primitives::{Address, Digest, U256};
use crate::schema::Confirmation;
use alloy_primitives::Signature as EcdsaSignature;

/// `N / 2` for secp256k1, the EIP-2 malleability bound: a valid signature's
/// `s` must not exceed this. Exposed so test fixtures can normalize a
/// freshly-generated signature to low-`s` form without duplicating the
/// curve order elsewhere.
pub const SECP256K1N_HALF: U256 =
    alloy_primitives::uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// The four schemes a confirmation's signature bytes can select, dispatched
/// purely by `(length, v)` — generalizing the `Eip712`/`EthSign`/`Eip1271`/
/// `PreSign` tag cowprotocol's driver uses for order signatures to Safe's
/// four on-chain-flag variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// EIP-1271 dynamic contract signature. Cannot be checked offline.
    Eip1271Contract,
    /// Owner pre-approved the hash on-chain. Cannot be checked offline.
    PreApprovedHash,
    /// `eth_sign`-wrapped ECDSA (`v` = 31/32).
    EthSign,
    /// Plain EIP-712 ECDSA (`v` = 27/28).
    Eip712Ecdsa,
}

/// Classifies a confirmation's raw signature bytes. Any length/`v`
/// combination outside the table in §4.2 is reported as an `Err` with a
/// human-readable reason, which becomes `SignatureOutcome::Unsupported`.
pub fn classify(signature: &[u8]) -> Result<SignatureScheme, String> {
    if signature.len() < 65 {
        return Err(format!(
            "signature is {} bytes, shorter than the minimum 65",
            signature.len()
        ));
    }
    let v = signature[64];
    match (signature.len(), v) {
        (len, 0) if len >= 65 => Ok(SignatureScheme::Eip1271Contract),
        (65, 1) => Ok(SignatureScheme::PreApprovedHash),
        (65, 31) | (65, 32) => Ok(SignatureScheme::EthSign),
        (65, 27) | (65, 28) => Ok(SignatureScheme::Eip712Ecdsa),
        (65, other) => Err(format!("unrecognized v byte {other} on a 65-byte signature")),
        (len, other) => Err(format!(
            "unrecognized signature shape: {len} bytes, v={other}"
        )),
    }
}

/// Verifies one confirmation's signature against the recomputed
/// `safeTxHash`, returning the per-signature outcome (§4.2, §7). Never
/// panics on malformed input — classification failures and recovery
/// failures both surface as `Unsupported`/`Invalid`, never an `Err`.
pub fn verify(digest: Digest, signature: &[u8], owner: Address) -> SignatureOutcome {
    let scheme = match classify(signature) {
        Ok(scheme) => scheme,
        Err(reason) => return SignatureOutcome::Unsupported { reason },
    };

    match scheme {
        SignatureScheme::Eip1271Contract => SignatureOutcome::Unsupported {
            reason: "Contract signature".to_string(),
        },
        SignatureScheme::PreApprovedHash => SignatureOutcome::Unsupported {
            reason: "Pre-approved hash".to_string(),
        },
        SignatureScheme::EthSign => recover_and_compare(
            eth_signed_message_hash(digest),
            signature,
            signature[64] - 4,
            owner,
        ),
        SignatureScheme::Eip712Ecdsa => {
            recover_and_compare(digest, signature, signature[64], owner)
        }
    }
}

fn eth_signed_message_hash(digest: Digest) -> Digest {
    let mut preimage = Vec::with_capacity(26 + 32);
    preimage.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    preimage.extend_from_slice(digest.as_slice());
    crate::primitives::keccak256(&preimage)
}

fn recover_and_compare(
    prehash: Digest,
    signature: &[u8],
    v: u8,
    claimed_owner: Address,
) -> SignatureOutcome {
    let r = U256::from_be_slice(&signature[0..32]);
    let s = U256::from_be_slice(&signature[32..64]);

    if s > SECP256K1N_HALF {
        return SignatureOutcome::Unsupported {
            reason: "Malleable signature".to_string(),
        };
    }

    // v is 27/28 by this point; y_parity is 0 for 27, 1 for 28.
    let y_parity = v == 28;
    let ecdsa = EcdsaSignature::new(r, s, y_parity);

    match ecdsa.recover_address_from_prehash(&prehash) {
        Ok(recovered) if recovered == claimed_owner => SignatureOutcome::Valid,
        Ok(recovered) => SignatureOutcome::Invalid {
            recovered: Some(recovered),
        },
        Err(_) => SignatureOutcome::Invalid { recovered: None },
    }
}

/// The proposer is the owner of the chronologically earliest confirmation,
/// ties broken by list order (spec §4.2). `Iterator::min_by_key` already
/// returns the first of equally-minimal elements, so list order falls out
/// for free.
pub fn proposer(confirmations: &[Confirmation]) -> Option<Address> {
    confirmations
        .iter()
        .min_by_key(|c| c.submission_date)
        .map(|c| c.owner)
}
