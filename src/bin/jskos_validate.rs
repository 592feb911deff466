//! JSKOS Validator CLI
//!
//! Validates an NDJSON file of JSKOS mappings, concepts and concept schemes.

use std::path::PathBuf;

use clap::Parser;
use datacite_jsonld::jskos::{self, RecordOutcome};
use datacite_jsonld::{DataciteConfig, JskosValidator};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jskos-validate")]
#[command(about = "Validate JSKOS records in an NDJSON file")]
struct Cli {
    /// NDJSON file (default: paths.mappings from configuration)
    path: Option<PathBuf>,

    /// Config file to load
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every record was valid
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = DataciteConfig::load_from(cli.config.as_deref())?;
    let path = cli.path.unwrap_or(config.paths.mappings);

    println!("🔍 Validating {}", path.display());
    let validator = JskosValidator::new()?;
    let summary = jskos::validate_file(&validator, &path)?;

    for report in summary.failures() {
        match &report.outcome {
            RecordOutcome::Invalid(kind, violations) => {
                println!("  ❌ line {} ({}):", report.line, kind);
                for violation in violations {
                    println!("     - {}", violation);
                }
            }
            RecordOutcome::Malformed(reason) => {
                println!("  ❌ line {}: malformed JSON: {}", report.line, reason);
            }
            _ => {}
        }
    }

    println!();
    println!("✅ valid:   {}", summary.valid);
    println!("❌ invalid: {}", summary.invalid);
    println!("⏭️  skipped: {}", summary.skipped);

    Ok(summary.all_valid())
}
