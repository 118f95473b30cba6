//! Recognizes a Safe calling itself to change its own owner set or
//! threshold — one of the highest-risk shapes a proposed transaction can
//! take, since it can silently change who controls the wallet.

use super::{Interpretation, Severity};
use crate::calldata::CallStep;
use crate::primitives::Address;

const ADD_OWNER: &str = "addOwnerWithThreshold";
const REMOVE_OWNER: &str = "removeOwner";
const SWAP_OWNER: &str = "swapOwner";
const CHANGE_THRESHOLD: &str = "changeThreshold";

pub fn interpret(step: &CallStep, _all_steps: &[CallStep], safe_address: Address) -> Option<Interpretation> {
    let method = step.method.as_deref()?;
    if step.to != safe_address {
        return None;
    }
    if !matches!(method, ADD_OWNER | REMOVE_OWNER | SWAP_OWNER | CHANGE_THRESHOLD) {
        return None;
    }

    let mut owners_affected = Vec::new();
    let mut new_threshold: Option<String> = None;
    for param in &step.params {
        match param.name.as_str() {
            "owner" | "oldOwner" | "newOwner" => {
                if let Some(value) = param.value.as_str() {
                    owners_affected.push(value.to_string());
                }
            }
            "_threshold" => {
                new_threshold = param
                    .value
                    .as_str()
                    .map(str::to_string)
                    .or_else(|| param.value.as_u64().map(|n| n.to_string()));
            }
            _ => {}
        }
    }

    let action = match method {
        ADD_OWNER => "add_owner",
        REMOVE_OWNER => "remove_owner",
        SWAP_OWNER => "swap_owner",
        CHANGE_THRESHOLD => "change_threshold",
        _ => unreachable!(),
    };

    let summary = match method {
        ADD_OWNER => format!(
            "Adds owner {} and sets the confirmation threshold to {}",
            owners_affected.first().map(String::as_str).unwrap_or("<unknown>"),
            new_threshold.as_deref().unwrap_or("<unknown>"),
        ),
        REMOVE_OWNER => format!(
            "Removes owner {} and sets the confirmation threshold to {}",
            owners_affected.last().map(String::as_str).unwrap_or("<unknown>"),
            new_threshold.as_deref().unwrap_or("<unknown>"),
        ),
        SWAP_OWNER => format!(
            "Replaces owner {} with {}",
            owners_affected.first().map(String::as_str).unwrap_or("<unknown>"),
            owners_affected.get(1).map(String::as_str).unwrap_or("<unknown>"),
        ),
        CHANGE_THRESHOLD => format!(
            "Changes the confirmation threshold to {}",
            new_threshold.as_deref().unwrap_or("<unknown>"),
        ),
        _ => unreachable!(),
    };

    Some(Interpretation {
        id: "safe-policy".to_string(),
        protocol: "Safe".to_string(),
        action: action.to_string(),
        severity: Severity::Elevated,
        summary,
        details: serde_json::json!({
            "method": method,
            "ownersAffected": owners_affected,
            "newThreshold": new_threshold,
        }),
    })
}
