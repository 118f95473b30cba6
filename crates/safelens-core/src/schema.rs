//! The evidence-package data model (spec §3) and its two-stage schema
//! validator: a loose `serde`-derived "raw" layer that accepts anything
//! shaped roughly like the wire format, and a `validate()` step that
//! produces the strongly-typed record the rest of the pipeline consumes,
//! collecting every violation (not just the first) into path-qualified
//! [`SchemaError`]s.

use crate::error::{SchemaError, SchemaErrors};
use crate::primitives::{self, Address, Bytes, Digest, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `1.0` literal `EvidencePackage.version` must equal.
pub const SUPPORTED_VERSION: &str = "1.0";

// ---------------------------------------------------------------------
// Raw (loosely-typed) wire format
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvidencePackageRaw {
    pub version: String,
    #[serde(rename = "safeAddress")]
    pub safe_address: String,
    #[serde(rename = "safeTxHash")]
    pub safe_tx_hash: String,
    #[serde(rename = "chainId", deserialize_with = "de_flexible_uint")]
    pub chain_id: String,
    pub transaction: SafeTxRaw,
    #[serde(default)]
    pub confirmations: Vec<ConfirmationRaw>,
    #[serde(rename = "confirmationsRequired")]
    pub confirmations_required: u32,
    #[serde(default, rename = "ethereumTxHash")]
    pub ethereum_tx_hash: Option<String>,
    #[serde(default, rename = "dataDecoded")]
    pub data_decoded: Option<DataDecoded>,
    pub sources: SourceRefsRaw,
    #[serde(rename = "packagedAt")]
    pub packaged_at: DateTime<Utc>,
    #[serde(default)]
    pub simulation: Option<serde_json::Value>,
    #[serde(default, rename = "simulationWitness")]
    pub simulation_witness: Option<serde_json::Value>,
    #[serde(default, rename = "consensusProof")]
    pub consensus_proof: Option<serde_json::Value>,
    #[serde(default, rename = "onchainPolicyProof")]
    pub onchain_policy_proof: Option<serde_json::Value>,
    #[serde(default, rename = "exportContract")]
    pub export_contract: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SafeTxRaw {
    pub to: String,
    pub value: String,
    #[serde(default = "default_empty_data")]
    pub data: String,
    pub operation: u8,
    #[serde(rename = "safeTxGas")]
    pub safe_tx_gas: String,
    #[serde(rename = "baseGas")]
    pub base_gas: String,
    #[serde(rename = "gasPrice")]
    pub gas_price: String,
    #[serde(rename = "gasToken")]
    pub gas_token: String,
    #[serde(rename = "refundReceiver")]
    pub refund_receiver: String,
    #[serde(deserialize_with = "de_flexible_uint")]
    pub nonce: String,
}

fn default_empty_data() -> String {
    "0x".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmationRaw {
    pub owner: String,
    pub signature: String,
    #[serde(rename = "submissionDate")]
    pub submission_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceRefsRaw {
    #[serde(default, rename = "safeApiUrl")]
    pub safe_api_url: Option<String>,
    #[serde(default, rename = "transactionUrl")]
    pub transaction_url: Option<String>,
}

/// The recursive decoded-call tree. `Other` is the explicit escape hatch
/// (§9 design note): a `dataDecoded` blob that doesn't match the expected
/// `{method, parameters}` shape is never a parse failure, it just carries
/// its raw JSON forward unexamined.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataDecoded {
    Known(DecodedCallRaw),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecodedCallRaw {
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<DecodedParamRaw>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecodedParamRaw {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, rename = "valueDecoded")]
    pub value_decoded: Option<Vec<InnerTransactionRaw>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InnerTransactionRaw {
    #[serde(default)]
    pub operation: Option<u8>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default = "default_empty_data")]
    pub data: String,
    #[serde(default, rename = "dataDecoded")]
    pub data_decoded: Option<Box<DataDecoded>>,
}

/// Accepts either a JSON number or a numeral string for fields the spec
/// calls "unsigned integer" without pinning the wire representation
/// (`chainId`, `nonce`). Real Safe transaction-service payloads emit both
/// depending on endpoint version; rejecting one would be a needless
/// interoperability failure. See DESIGN.md for this Open Question call.
fn de_flexible_uint<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct FlexibleUint;
    impl<'de> Visitor<'de> for FlexibleUint {
        type Value = String;
        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("an unsigned integer or numeral string")
        }
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }
    }
    deserializer.deserialize_any(FlexibleUint)
}

// ---------------------------------------------------------------------
// Typed record
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Operation {
    Call = 0,
    DelegateCall = 1,
}

#[derive(Debug, Clone)]
pub struct SafeTx {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: u64,
}

#[derive(Debug, Clone)]
pub struct Confirmation {
    pub owner: Address,
    pub signature: Vec<u8>,
    pub submission_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SourceRefs {
    pub safe_api_url: Option<String>,
    pub transaction_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Envelope {
    pub simulation: Option<serde_json::Value>,
    pub simulation_witness: Option<serde_json::Value>,
    pub consensus_proof: Option<serde_json::Value>,
    pub onchain_policy_proof: Option<serde_json::Value>,
    pub export_contract: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct EvidencePackage {
    pub version: String,
    pub safe_address: Address,
    pub safe_tx_hash: Digest,
    pub chain_id: u64,
    pub transaction: SafeTx,
    pub confirmations: Vec<Confirmation>,
    pub confirmations_required: u32,
    pub ethereum_tx_hash: Option<Digest>,
    pub data_decoded: Option<DataDecoded>,
    pub sources: SourceRefs,
    pub packaged_at: DateTime<Utc>,
    pub envelope: Envelope,
}

/// Collects every field violation instead of bailing on the first one, so
/// a caller fixing up a hand-edited evidence package sees the whole list
/// in a single round trip.
struct Collector {
    errors: Vec<SchemaError>,
}

impl Collector {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(SchemaError::new(path, message));
    }

    fn address(&mut self, path: &str, raw: &str) -> Address {
        raw.parse().unwrap_or_else(|e| {
            self.push(path, format!("invalid address: {e}"));
            Address::ZERO
        })
    }

    fn digest(&mut self, path: &str, raw: &str) -> Digest {
        raw.parse().unwrap_or_else(|e| {
            self.push(path, format!("invalid 32-byte hash: {e}"));
            Digest::ZERO
        })
    }

    fn u256(&mut self, path: &str, raw: &str) -> U256 {
        primitives::parse_u256_decimal(raw).unwrap_or_else(|e| {
            self.push(path, format!("invalid unsigned 256-bit integer: {e}"));
            U256::ZERO
        })
    }

    fn u64(&mut self, path: &str, raw: &str) -> u64 {
        primitives::parse_u64_decimal(raw).unwrap_or_else(|e| {
            self.push(path, format!("invalid unsigned 64-bit integer: {e}"));
            0
        })
    }

    fn bytes(&mut self, path: &str, raw: &str) -> Bytes {
        primitives::decode_hex(raw)
            .map(Bytes::from)
            .unwrap_or_else(|e| {
                self.push(path, format!("invalid hex byte string: {e}"));
                Bytes::new()
            })
    }
}

impl EvidencePackageRaw {
    /// Validates and lowers this raw record into a typed [`EvidencePackage`].
    /// Every violation is collected; the function only returns `Err` once,
    /// with the complete list attached.
    pub fn validate(self) -> Result<EvidencePackage, SchemaErrors> {
        let mut c = Collector::new();

        if self.version != SUPPORTED_VERSION {
            c.push(
                "version",
                format!(
                    "unsupported evidence package version {:?}, expected {:?}",
                    self.version, SUPPORTED_VERSION
                ),
            );
        }

        let safe_address = c.address("safeAddress", &self.safe_address);
        let safe_tx_hash = c.digest("safeTxHash", &self.safe_tx_hash);
        let chain_id = c.u64("chainId", &self.chain_id);
        if chain_id == 0 {
            c.push("chainId", "chainId must be >= 1");
        }

        let operation = match self.transaction.operation {
            0 => Operation::Call,
            1 => Operation::DelegateCall,
            other => {
                c.push(
                    "transaction.operation",
                    format!("operation must be 0 (Call) or 1 (DelegateCall), got {other}"),
                );
                Operation::Call
            }
        };

        let transaction = SafeTx {
            to: c.address("transaction.to", &self.transaction.to),
            value: c.u256("transaction.value", &self.transaction.value),
            data: c.bytes("transaction.data", &self.transaction.data),
            operation,
            safe_tx_gas: c.u256("transaction.safeTxGas", &self.transaction.safe_tx_gas),
            base_gas: c.u256("transaction.baseGas", &self.transaction.base_gas),
            gas_price: c.u256("transaction.gasPrice", &self.transaction.gas_price),
            gas_token: c.address("transaction.gasToken", &self.transaction.gas_token),
            refund_receiver: c.address(
                "transaction.refundReceiver",
                &self.transaction.refund_receiver,
            ),
            nonce: c.u64("transaction.nonce", &self.transaction.nonce),
        };

        let mut seen_owners = std::collections::HashSet::new();
        let confirmations: Vec<Confirmation> = self
            .confirmations
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let owner = c.address(&format!("confirmations[{i}].owner"), &raw.owner);
                let signature = primitives::decode_hex(&raw.signature).unwrap_or_else(|e| {
                    c.push(
                        format!("confirmations[{i}].signature"),
                        format!("invalid hex byte string: {e}"),
                    );
                    Vec::new()
                });
                if !seen_owners.insert(owner) {
                    // Duplicate owners are a warning at the driver level, not
                    // a schema violation — recorded here only for the
                    // driver to pick up, see Warning::DuplicateOwner.
                }
                Confirmation {
                    owner,
                    signature,
                    submission_date: raw.submission_date,
                }
            })
            .collect();

        if self.confirmations_required == 0 {
            c.push(
                "confirmationsRequired",
                "threshold must be at least 1",
            );
        }

        let ethereum_tx_hash = match &self.ethereum_tx_hash {
            Some(raw) => Some(c.digest("ethereumTxHash", raw)),
            None => None,
        };

        if c.errors.is_empty() {
            Ok(EvidencePackage {
                version: self.version,
                safe_address,
                safe_tx_hash,
                chain_id,
                transaction,
                confirmations,
                confirmations_required: self.confirmations_required,
                ethereum_tx_hash,
                data_decoded: self.data_decoded,
                sources: SourceRefs {
                    safe_api_url: self.sources.safe_api_url,
                    transaction_url: self.sources.transaction_url,
                },
                packaged_at: self.packaged_at,
                envelope: Envelope {
                    simulation: self.simulation,
                    simulation_witness: self.simulation_witness,
                    consensus_proof: self.consensus_proof,
                    onchain_policy_proof: self.onchain_policy_proof,
                    export_contract: self.export_contract,
                },
            })
        } else {
            Err(SchemaErrors(c.errors))
        }
    }
}

/// Duplicate owners in `confirmations` are malformed-but-tolerated input
/// (spec §3): the driver calls this to decide whether to emit the
/// `Duplicate owner in confirmations` warning, rather than the schema
/// validator rejecting the package outright.
pub fn duplicate_owners(confirmations: &[Confirmation]) -> Vec<Address> {
    let mut seen = std::collections::HashSet::new();
    let mut dupes = Vec::new();
    for confirmation in confirmations {
        if !seen.insert(confirmation.owner) && !dupes.contains(&confirmation.owner) {
            dupes.push(confirmation.owner);
        }
    }
    dupes
}
