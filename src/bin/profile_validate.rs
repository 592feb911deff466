//! Profile Validator CLI
//!
//! Validates JSON documents against a bundled or file-based JSON Schema.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use datacite_jsonld::profile::{collect_documents, DocumentReport};
use datacite_jsonld::schema::bundled;
use datacite_jsonld::ProfileValidator;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "profile-validate")]
#[command(about = "Validate JSON documents against a schema profile")]
struct Cli {
    /// Bundled schema name or schema file path
    #[arg(short, long, default_value = bundled::DOI_SUBMISSION)]
    schema: String,

    /// Documents or directories to validate
    paths: Vec<PathBuf>,

    /// Compile every bundled schema and report failures
    #[arg(long)]
    check_schemas: bool,

    /// Write a JSON summary to this file
    #[arg(short, long)]
    report: Option<PathBuf>,
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

fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    if cli.check_schemas {
        return Ok(check_schemas());
    }
    if cli.paths.is_empty() {
        return Err("no documents given".into());
    }

    let validator = ProfileValidator::resolve(&cli.schema)?;
    println!("🔍 Validating against {}", validator.name());

    let mut reports: Vec<DocumentReport> = Vec::new();
    for path in collect_documents(&cli.paths) {
        reports.extend(validator.validate_path(&path)?);
    }

    for report in &reports {
        if report.is_valid() {
            println!("  ✅ {}", report.source);
        } else {
            println!("  ❌ {}", report.source);
            for violation in &report.violations {
                println!("     - {}", violation);
            }
        }
    }

    let invalid = reports.iter().filter(|r| !r.is_valid()).count();
    let valid = reports.len() - invalid;
    println!();
    println!("Summary: {} valid, {} invalid", valid, invalid);

    if let Some(path) = cli.report {
        let summary = json!({
            "generated_at": Utc::now().to_rfc3339(),
            "schema": validator.name(),
            "valid": valid,
            "invalid": invalid,
            "documents": reports,
        });
        fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        println!("📄 Report written to {}", path.display());
    }

    Ok(invalid == 0)
}

fn check_schemas() -> bool {
    println!("🔍 Compiling bundled schemas...");
    let mut all_valid = true;
    for (name, result) in bundled::check_all() {
        match result {
            Ok(()) => println!("  ✅ {}", name),
            Err(e) => {
                println!("  ❌ {} - {}", name, e);
                all_valid = false;
            }
        }
    }
    all_valid
}
