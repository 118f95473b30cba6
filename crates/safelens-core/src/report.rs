//! The verification report (spec §3, §6): the driver's sole output, with a
//! stable field order and sorted map keys so JSON output is reproducible
//! byte-for-byte across runs on the same input.

use crate::calldata::{CallOperation, CallStep, DecodedParam};
use crate::error::SignatureOutcome;
use crate::interpreters::Interpretation;
use crate::primitives::{Address, Digest, U256};
use crate::sources::SourceEntry;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SignatureSummary {
    pub total: u32,
    pub valid: u32,
    pub invalid: u32,
    pub unsupported: u32,
}

impl SignatureSummary {
    pub fn record(&mut self, outcome: &SignatureOutcome) {
        self.total += 1;
        match outcome {
            SignatureOutcome::Valid => self.valid += 1,
            SignatureOutcome::Invalid { .. } => self.invalid += 1,
            SignatureOutcome::Unsupported { .. } => self.unsupported += 1,
        }
    }
}

/// Mirrors [`SignatureOutcome`] one-to-one, but owns a serializable shape
/// (`status` tag plus whichever payload the variant carries) instead of the
/// library-internal enum.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignatureStatus {
    Valid,
    Invalid { recovered: Option<Address> },
    Unsupported { reason: String },
}

impl From<&SignatureOutcome> for SignatureStatus {
    fn from(outcome: &SignatureOutcome) -> Self {
        match outcome {
            SignatureOutcome::Valid => SignatureStatus::Valid,
            SignatureOutcome::Invalid { recovered } => SignatureStatus::Invalid {
                recovered: *recovered,
            },
            SignatureOutcome::Unsupported { reason } => SignatureStatus::Unsupported {
                reason: reason.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureResult {
    pub owner: Address,
    #[serde(flatten)]
    pub status: SignatureStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureReport {
    pub summary: SignatureSummary,
    pub list: Vec<SignatureResult>,
    #[serde(rename = "byOwner")]
    pub by_owner: BTreeMap<Address, SignatureResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Danger,
    Warn,
}

#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub level: WarningLevel,
    pub message: String,
}

impl Warning {
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: WarningLevel::Danger,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: WarningLevel::Warn,
            message: message.into(),
        }
    }
}

/// A serializable projection of [`CallStep`]. `value` is rendered as a
/// decimal string rather than alloy's default hex quantity encoding — the
/// report's numeric fields follow the wire convention in §6 ("larger
/// integers are decimal strings"), distinct from the byte-string hex
/// convention used for addresses and hashes.
#[derive(Debug, Clone, Serialize)]
pub struct CallStepView {
    pub index: u32,
    pub to: Address,
    #[serde(serialize_with = "serialize_u256_decimal")]
    pub value: U256,
    pub operation: CallOperation,
    pub method: Option<String>,
    pub params: Vec<DecodedParam>,
    #[serde(rename = "rawData")]
    pub raw_data: String,
}

impl From<&CallStep> for CallStepView {
    fn from(step: &CallStep) -> Self {
        Self {
            index: step.index,
            to: step.to,
            value: step.value,
            operation: step.operation,
            method: step.method.clone(),
            params: step.params.clone(),
            raw_data: crate::primitives::encode_hex(&step.raw_data),
        }
    }
}

fn serialize_u256_decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub ok: bool,
    #[serde(rename = "safeTxHash")]
    pub safe_tx_hash: Digest,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(rename = "safeAddress")]
    pub safe_address: Address,
    pub proposer: Option<Address>,
    pub signatures: SignatureReport,
    pub warnings: Vec<Warning>,
    pub sources: Vec<SourceEntry>,
    pub calls: Vec<CallStepView>,
    pub interpretations: Vec<Interpretation>,
}
