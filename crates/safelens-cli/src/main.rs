use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use safelens_core::report::VerificationReport;
use safelens_core::settings::{JsonSettingsStore, NullSettingsStore, SettingsStore};
use safelens_core::{EvidencePackage, VerifyError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Parser)]
#[command(name = "safelens", about = "Verify Safe multisig evidence packages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recompute hashes, verify signatures, decode calldata, and interpret an evidence package.
    Verify(VerifyArgs),
    /// Print the fixed source catalog (§4.6) with trust tags.
    Sources,
}

#[derive(clap::Args)]
struct VerifyArgs {
    /// Evidence package path. Reads stdin when omitted.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Local settings store (address book / known-contract registry) as JSON.
    #[arg(long, conflicts_with = "no_settings")]
    settings: Option<PathBuf>,
    /// Explicitly run without a settings store.
    #[arg(long)]
    no_settings: bool,
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
    /// Interpreter ids to skip (§4.5); may be repeated.
    #[arg(long = "disable-interpreter")]
    disabled_interpreters: Vec<String>,
}

#[derive(Copy, Clone, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safelens=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Verify(args) => run_verify(args),
        Command::Sources => run_sources(),
    }
}

fn run_sources() -> ExitCode {
    let catalog = safelens_core::sources::catalog();
    for entry in catalog {
        println!("{:<28} {:?} ({})", entry.id, entry.status, entry.trust);
    }
    ExitCode::SUCCESS
}

fn run_verify(args: VerifyArgs) -> ExitCode {
    let json = match read_input(args.file.as_deref()) {
        Ok(json) => json,
        Err(err) => {
            report_io_failure(&err, args.format);
            return ExitCode::FAILURE;
        }
    };

    let package = match safelens_core::parse(&json) {
        Ok(package) => package,
        Err(err) => {
            report_parse_failure(&err, args.format);
            return ExitCode::FAILURE;
        }
    };

    let (store, settings_provided): (Box<dyn SettingsStore>, bool) = match settings_store(&args) {
        Ok(pair) => pair,
        Err(err) => {
            report_io_failure(&err, args.format);
            return ExitCode::FAILURE;
        }
    };

    let disabled: HashSet<String> = args.disabled_interpreters.into_iter().collect();
    let report = safelens_core::verify(&package, store.as_ref(), settings_provided, &disabled);

    match args.format {
        Format::Json => print_json(&report),
        Format::Text => render::print_text(&package, &report),
    }

    if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_input(file: Option<&std::path::Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn settings_store(args: &VerifyArgs) -> anyhow::Result<(Box<dyn SettingsStore>, bool)> {
    if args.no_settings {
        return Ok((Box::new(NullSettingsStore), false));
    }
    match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let store = JsonSettingsStore::from_json(&json)?;
            Ok((Box::new(store), true))
        }
        None => Ok((Box::new(NullSettingsStore), false)),
    }
}

fn report_parse_failure(err: &VerifyError, format: Format) {
    match format {
        Format::Json => {
            let body = serde_json::json!({ "error": err.to_string() });
            println!("{body}");
        }
        Format::Text => eprintln!("{err}"),
    }
}

/// Reports a failure to read the input file/stdin or the settings file
/// (§4.11, §7: `IoError` is CLI-layer only). In JSON mode the error still
/// goes to stdout as a parseable object, matching `report_parse_failure`,
/// so a machine consumer never has to special-case IO errors against
/// schema/hash/signature ones.
fn report_io_failure(err: &anyhow::Error, format: Format) {
    match format {
        Format::Json => {
            let body = serde_json::json!({ "error": format!("Invalid input: {err}") });
            println!("{body}");
        }
        Format::Text => eprintln!("Invalid input: {err}"),
    }
}

fn print_json(report: &VerificationReport) {
    match serde_json::to_string_pretty(report) {
        Ok(body) => println!("{body}"),
        Err(err) => eprintln!("failed to serialize report: {err}"),
    }
}
