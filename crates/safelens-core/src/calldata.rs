//! Calldata normalization into an ordered sequence of [`CallStep`]s,
//! including `multiSend` batch unpacking (spec §4.3).
//!
//! The decoder never trusts `dataDecoded` as authoritative — it is only a
//! convenience the API attached. [`crate::selector`] reconciles every step
//! it produces here against the raw bytes.

use crate::primitives::{self, Address, U256};
use crate::schema::{DataDecoded, DecodedParamRaw, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum CallOperation {
    Call,
    DelegateCall,
}

impl From<Operation> for CallOperation {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Call => CallOperation::Call,
            Operation::DelegateCall => CallOperation::DelegateCall,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DecodedParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub value: serde_json::Value,
}

/// One normalized sub-call. Constructed here, consumed by
/// [`crate::selector`] and [`crate::interpreters`], then serialized.
/// Never mutated after construction.
#[derive(Debug, Clone)]
pub struct CallStep {
    pub index: u32,
    pub to: Address,
    pub value: U256,
    pub operation: CallOperation,
    pub method: Option<String>,
    pub params: Vec<DecodedParam>,
    pub raw_data: Vec<u8>,
}

const MULTI_SEND_METHOD: &str = "multiSend";

/// Normalizes a transaction's `(to, value, operation, data)` plus its
/// optional decoded-call tree into an ordered `CallStep` list.
pub fn normalize(
    tx_to: Address,
    tx_value: U256,
    tx_operation: Operation,
    tx_data: &[u8],
    data_decoded: Option<&DataDecoded>,
) -> Vec<CallStep> {
    let known = match data_decoded {
        Some(DataDecoded::Known(call)) => call,
        // No tree, or a shape we don't recognize: selector-only inspection
        // of the raw bytes, no decoded sub-calls.
        Some(DataDecoded::Other(_)) | None => return Vec::new(),
    };

    if known.method != MULTI_SEND_METHOD {
        return vec![CallStep {
            index: 0,
            to: tx_to,
            value: tx_value,
            operation: tx_operation.into(),
            method: Some(known.method.clone()),
            params: known.parameters.iter().map(to_decoded_param).collect(),
            raw_data: tx_data.to_vec(),
        }];
    }

    let transactions_param = known
        .parameters
        .iter()
        .find(|p| p.name == "transactions" && p.param_type == "bytes");

    let Some(inner_list) = transactions_param.and_then(|p| p.value_decoded.as_ref()) else {
        // multiSend declared but no unpacked inner list to work with:
        // nothing to normalize beyond selector-only inspection.
        return Vec::new();
    };

    inner_list
        .iter()
        .enumerate()
        .map(|(i, inner)| {
            let operation = match inner.operation {
                Some(1) => CallOperation::DelegateCall,
                _ => CallOperation::Call,
            };
            let to = inner
                .to
                .as_deref()
                .and_then(|s| s.parse::<Address>().ok())
                .unwrap_or(tx_to);
            let value = inner
                .value
                .as_deref()
                .and_then(|v| primitives::parse_u256_decimal(v).ok())
                .unwrap_or(U256::ZERO);
            let (method, params) = match inner.data_decoded.as_deref() {
                Some(DataDecoded::Known(c)) => (
                    Some(c.method.clone()),
                    c.parameters.iter().map(to_decoded_param).collect(),
                ),
                Some(DataDecoded::Other(_)) | None => (None, Vec::new()),
            };
            let raw_data = primitives::decode_hex(&inner.data).unwrap_or_default();

            CallStep {
                index: i as u32,
                to,
                value,
                operation,
                method,
                params,
                raw_data,
            }
        })
        .collect()
}

fn to_decoded_param(raw: &DecodedParamRaw) -> DecodedParam {
    DecodedParam {
        name: raw.name.clone(),
        param_type: raw.param_type.clone(),
        value: raw.value.clone(),
    }
}
