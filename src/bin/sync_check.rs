//! Enum Sync CLI
//!
//! Checks that profile `$defs` enums, their `iriMap` tables and the
//! `enum_lists/` JSON-LD files agree.

use std::path::PathBuf;

use clap::Parser;
use datacite_jsonld::{DataciteConfig, SyncChecker};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "enum-sync-check")]
#[command(about = "Check profile enums against iriMap tables and enum lists")]
struct Cli {
    /// Profile JSON Schema (default: paths.profile)
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Enumeration list directory (default: paths.enum_dir)
    #[arg(short, long)]
    enum_dir: Option<PathBuf>,

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

/// Returns whether the check found no issues
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = DataciteConfig::load_from(cli.config.as_deref())?;
    if let Some(profile) = cli.profile {
        config.paths.profile = profile;
    }
    if let Some(enum_dir) = cli.enum_dir {
        config.paths.enum_dir = enum_dir;
    }

    let issues = SyncChecker::from_config(&config).run()?;
    if issues.is_empty() {
        println!("✅ All enums are in sync with their iriMap tables and enum lists");
        return Ok(true);
    }

    println!("❌ Found {} sync issue(s):", issues.len());
    for issue in &issues {
        println!("  - {}", issue);
    }
    Ok(false)
}
