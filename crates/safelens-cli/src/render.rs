//! Deterministic text rendering (spec §6): labeled sections with
//! byte-stable leading characters on addresses/hashes so grep still works
//! even if a terminal ellipsizes a long column.

use safelens_core::report::VerificationReport;
use safelens_core::EvidencePackage;

pub fn print_text(package: &EvidencePackage, report: &VerificationReport) {
    if report.ok {
        println!("Evidence verified.");
    } else {
        println!("Evidence FAILED verification.");
    }

    println!("  Safe address:   {}", report.safe_address);
    println!("  SafeTx digest:  {}", report.safe_tx_hash);
    println!("  Chain id:       {}", report.chain_id);
    println!(
        "  Signatures:     {} total, {} valid, {} invalid, {} unsupported",
        report.signatures.summary.total,
        report.signatures.summary.valid,
        report.signatures.summary.invalid,
        report.signatures.summary.unsupported,
    );
    if let Some(proposer) = report.proposer {
        println!("  Proposer:       {proposer}");
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  [{:?}] {}", warning.level, warning.message);
        }
    }

    println!();
    println!("Execution safety:");
    if report.calls.is_empty() {
        println!("  (no decoded sub-calls; raw transaction only)");
    }
    for call in &report.calls {
        println!(
            "  #{} {:?} -> {} value={} method={} nonce={}",
            call.index,
            call.operation,
            call.to,
            call.value,
            call.method.as_deref().unwrap_or("<none>"),
            package.transaction.nonce,
        );
    }

    if !report.interpretations.is_empty() {
        println!();
        println!("Interpretations:");
        for interp in &report.interpretations {
            println!(
                "  [{:?}] {} ({}): {}",
                interp.severity, interp.protocol, interp.action, interp.summary
            );
        }
    }

    if package.envelope.simulation.is_some() {
        println!();
        println!("Transaction simulation: present (pass-through, not replayed).");
    }
}
