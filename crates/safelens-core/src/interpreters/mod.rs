//! The interpreter registry (spec §4.5): an ordered, fixed-at-compile-time
//! sequence of pure functions, each recognizing one specific high-risk call
//! shape. First-match-wins — the registry never tries a second interpreter
//! once one has produced a result for a given call.

mod safe_policy;
mod twap;

use crate::calldata::CallStep;
use crate::primitives::Address;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Elevated,
    Critical,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Interpretation {
    pub id: String,
    pub protocol: String,
    pub action: String,
    pub severity: Severity,
    pub summary: String,
    pub details: serde_json::Value,
}

type InterpreterFn = fn(&CallStep, &[CallStep], Address) -> Option<Interpretation>;

/// Registration is static: new interpreters are added here, in order.
/// Configuration-addressable by `id` via the `disabled` set passed to
/// [`run`].
const REGISTRY: &[(&str, InterpreterFn)] = &[
    ("safe-policy", safe_policy::interpret),
    ("twap-order", twap::interpret),
];

/// Runs the registry against one call step, in the context of the full
/// call list (needed for cross-call patterns like "preceded by an
/// approval"). Skips any interpreter whose `id` is in `disabled`.
pub fn run(
    step: &CallStep,
    all_steps: &[CallStep],
    safe_address: Address,
    disabled: &HashSet<String>,
) -> Option<Interpretation> {
    for (id, interpreter) in REGISTRY {
        if disabled.contains(*id) {
            continue;
        }
        if let Some(result) = interpreter(step, all_steps, safe_address) {
            return Some(result);
        }
    }
    None
}

/// Runs the registry over every step, producing at most one interpretation
/// per step, in step order.
pub fn run_all(
    steps: &[CallStep],
    safe_address: Address,
    disabled: &HashSet<String>,
) -> Vec<Interpretation> {
    steps
        .iter()
        .filter_map(|step| run(step, steps, safe_address, disabled))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ids_are_unique() {
        let mut ids: Vec<&str> = REGISTRY.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), REGISTRY.len());
    }
}
