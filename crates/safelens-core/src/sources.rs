//! The fixed source catalog (spec §4.6, §6): a stable, ordered list of
//! provenance records the driver attaches to every report, each carrying a
//! runtime status and a trust tag so a reader knows exactly how much to
//! trust each part of the report.

use crate::schema::EvidencePackage;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Enabled,
    Disabled,
    #[serde(rename = "n/a")]
    NotApplicable,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceEntry {
    pub id: &'static str,
    pub status: SourceStatus,
    pub trust: &'static str,
}

/// The exact ten ids from §6, in the fixed order the spec lists them,
/// paired with a trust tag describing how much independent weight each
/// carries.
const CATALOG: &[(&str, &str)] = &[
    ("evidence_package", "self-declared"),
    ("hash_recompute", "cryptographic"),
    ("signatures", "cryptographic"),
    ("signature_scheme_coverage", "cryptographic"),
    ("safe_owners_threshold", "unverified"),
    ("onchain_policy_proof", "unverified"),
    ("decoded_calldata", "api-provided"),
    ("simulation", "unverified"),
    ("consensus_proof", "unverified"),
    ("settings", "local-config"),
];

/// Prints the catalog with a placeholder status (the `sources` CLI
/// subcommand, §6, reports the catalog on its own, independent of any
/// particular package).
pub fn catalog() -> Vec<SourceEntry> {
    CATALOG
        .iter()
        .map(|(id, trust)| SourceEntry {
            id,
            status: SourceStatus::Enabled,
            trust,
        })
        .collect()
}

/// Computes the catalog's runtime status for one verified package. Only
/// `settings`, `onchain_policy_proof`, `simulation`, `consensus_proof`, and
/// `decoded_calldata` vary per package; the cryptographic core sources are
/// always performed.
pub fn for_package(package: &EvidencePackage, settings_provided: bool) -> Vec<SourceEntry> {
    CATALOG
        .iter()
        .map(|(id, trust)| {
            let status = match *id {
                "evidence_package" | "hash_recompute" | "signatures"
                | "signature_scheme_coverage" => SourceStatus::Enabled,
                // The verifier never independently learns the owner set —
                // it only records the declared threshold (§3) — so this
                // source never carries independent weight.
                "safe_owners_threshold" => SourceStatus::NotApplicable,
                "onchain_policy_proof" => presence(package.envelope.onchain_policy_proof.is_some()),
                "decoded_calldata" => presence(package.data_decoded.is_some()),
                "simulation" => presence(package.envelope.simulation.is_some()),
                "consensus_proof" => presence(package.envelope.consensus_proof.is_some()),
                "settings" => presence(settings_provided),
                _ => unreachable!("catalog ids are exhaustively matched above"),
            };
            SourceEntry { id, status, trust }
        })
        .collect()
}

fn presence(is_present: bool) -> SourceStatus {
    if is_present {
        SourceStatus::Enabled
    } else {
        SourceStatus::Disabled
    }
}
