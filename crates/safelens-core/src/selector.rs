//! Recomputes the 4-byte function selector from a decoded method's
//! signature and compares it to the raw calldata prefix (spec §4.4).

use crate::calldata::CallStep;
use crate::primitives::keccak256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorCheck {
    /// The decoded method's selector matches the raw calldata prefix.
    Verified,
    /// The API's decoding disagrees with the bytes. Never fails the whole
    /// package, surfaced as a warning by the driver.
    Mismatch {
        declared_method: String,
        raw_prefix: [u8; 4],
    },
    /// Empty `rawData` (e.g. a plain ETH transfer) — nothing to check.
    NoData,
    /// A parameter type is nested more than one level deep (§9 Open
    /// Question). The shallow signature-string builder here can't resolve
    /// it correctly, so verification is skipped rather than silently
    /// reporting a false match or false mismatch.
    NotAttempted,
}

/// Checks one [`CallStep`]'s selector. Steps with empty `rawData` or no
/// decoded `method` both resolve to [`SelectorCheck::NoData`] — the spec
/// only asks the verifier to *attempt* a check when both are present.
pub fn check(step: &CallStep) -> SelectorCheck {
    if step.raw_data.is_empty() {
        return SelectorCheck::NoData;
    }
    let Some(method) = step.method.as_ref() else {
        return SelectorCheck::NoData;
    };

    let types: Vec<&str> = step.params.iter().map(|p| p.param_type.as_str()).collect();
    if max_paren_depth(&types) > 1 {
        return SelectorCheck::NotAttempted;
    }

    let signature = format!("{method}({})", types.join(","));
    let hash = keccak256(signature.as_bytes());
    let expected = &hash[0..4];

    if step.raw_data.len() < 4 {
        let mut raw_prefix = [0u8; 4];
        raw_prefix[..step.raw_data.len()].copy_from_slice(&step.raw_data);
        return SelectorCheck::Mismatch {
            declared_method: method.clone(),
            raw_prefix,
        };
    }

    let actual = &step.raw_data[0..4];
    if actual == expected {
        SelectorCheck::Verified
    } else {
        let mut raw_prefix = [0u8; 4];
        raw_prefix.copy_from_slice(actual);
        SelectorCheck::Mismatch {
            declared_method: method.clone(),
            raw_prefix,
        }
    }
}

/// The source decoder's tuple-type parser is shallow: it only reconstructs
/// `method(type1,type2,...)` from top-level parameter types, so anything
/// with parentheses nested more than one level (a tuple-of-tuples, or an
/// array of tuples containing a tuple) is outside what it can faithfully
/// reproduce.
fn max_paren_depth(types: &[&str]) -> usize {
    let mut max_depth = 0usize;
    for t in types {
        let mut depth = 0usize;
        for ch in t.chars() {
            match ch {
                '(' => {
                    depth += 1;
                    max_depth = max_depth.max(depth);
                }
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }
    max_depth
}
