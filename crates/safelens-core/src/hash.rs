//! The EIP-712 hash engine (spec §4.1).
//!
//! Rather than hand-concatenating the domain separator and struct-hash
//! preimages, we lean on `alloy_sol_types`'s `sol!` macro the same way the
//! teacher's `safe_contract_abi.rs` declares the `ISafe` ABI with `sol!` —
//! here it declares the `SafeTx` EIP-712 struct, which gets
//! `eip712_type_hash`/`eip712_hash_struct`/`eip712_signing_hash` for free
//! and keeps us from ever emitting a floating-point path or hand-rolled
//! bignum arithmetic (§9).

use crate::primitives::{Address, Digest, U256};
use crate::schema::{Operation, SafeTx as SafeTxRecord};
use alloy_sol_types::{eip712_domain, SolStruct};

// The identifier here becomes the EIP-712 type name baked into
// `encodeType`/`eip712_root_type()` — it must read exactly `SafeTx` to match
// the spec's `"SafeTx(address to,uint256 value,...)"` type string (§4.1
// point 2). `crate::schema::SafeTx` is imported above under a different name
// so this identifier is free.
alloy_sol_types::sol! {
    #[derive(Debug)]
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}

/// The three hashes the CLI can display for hardware-wallet verification
/// (§4.1): the per-chain/per-Safe domain separator, the struct hash of the
/// transaction alone, and the final EIP-712 digest that ties the two
/// together.
#[derive(Debug, Clone, Copy)]
pub struct HashTriple {
    pub domain_separator: Digest,
    pub message_hash: Digest,
    pub safe_tx_hash: Digest,
}

/// Recomputes the canonical SafeTx digest and compares it against the
/// package's declared `safeTxHash`.
///
/// Returns the triple regardless of whether the declared hash matches —
/// callers that only care about the mismatch should inspect
/// `triple.safe_tx_hash != declared` themselves; [`recompute_and_verify`]
/// does that for the driver.
pub fn recompute(chain_id: u64, safe_address: Address, tx: &SafeTxRecord) -> HashTriple {
    let domain = eip712_domain! {
        chain_id: chain_id,
        verifying_contract: safe_address,
    };

    let sol_tx = SafeTx {
        to: tx.to,
        value: tx.value,
        data: tx.data.clone(),
        operation: match tx.operation {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        },
        safeTxGas: tx.safe_tx_gas,
        baseGas: tx.base_gas,
        gasPrice: tx.gas_price,
        gasToken: tx.gas_token,
        refundReceiver: tx.refund_receiver,
        nonce: U256::from(tx.nonce),
    };

    HashTriple {
        domain_separator: domain.separator(),
        message_hash: sol_tx.eip712_hash_struct(),
        safe_tx_hash: sol_tx.eip712_signing_hash(&domain),
    }
}

/// Recomputes the digest and returns it alongside whether it matched the
/// declared `safeTxHash`. The driver uses the boolean to decide whether to
/// record a hash-mismatch warning without aborting the rest of the report.
pub fn recompute_and_verify(
    chain_id: u64,
    safe_address: Address,
    tx: &SafeTxRecord,
    declared: Digest,
) -> (HashTriple, bool) {
    let triple = recompute(chain_id, safe_address, tx);
    let matches = triple.safe_tx_hash == declared;
    (triple, matches)
}
