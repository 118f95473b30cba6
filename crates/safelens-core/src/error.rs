//! Error taxonomy (spec §7). Every variant is a structured return value —
//! nothing in this crate unwinds across a public API boundary.

use crate::primitives::Address;
use thiserror::Error;

/// Raised while parsing/validating an [`crate::schema::EvidencePackage`].
/// Fatal: the driver aborts before any hashing is attempted.
#[derive(Debug, Clone, Error)]
#[error("{path}: {message}")]
pub struct SchemaError {
    /// JSON-pointer-style path, e.g. `"transaction.nonce"`.
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Per-signature outcome (§4.2, §7). Not an error type in the Rust sense —
/// every confirmation produces exactly one of these, aggregated by the
/// driver into `summary` and `byOwner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureOutcome {
    Valid,
    Invalid { recovered: Option<Address> },
    Unsupported { reason: String },
}

/// Top-level error surfaced by the CLI when the pipeline cannot produce a
/// report at all (schema or I/O failure). Hash mismatches and invalid
/// signatures are *not* represented here — those are recorded inside a
/// still-produced [`crate::report::VerificationReport`].
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaErrors),
}

/// A non-empty collection of [`SchemaError`]s, gathered so the caller sees
/// every violation in one pass instead of one-at-a-time.
#[derive(Debug, Clone, Error)]
#[error("{} schema violation(s): {}", .0.len(), join_schema_errors(.0))]
pub struct SchemaErrors(pub Vec<SchemaError>);

fn join_schema_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
