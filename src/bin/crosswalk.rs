//! SKOS to JSKOS CLI
//!
//! Converts the SKOS crosswalk JSON-LD document into JSKOS mapping NDJSON.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use datacite_jsonld::crosswalk::write_ndjson;
use datacite_jsonld::{CrosswalkConverter, DataciteConfig};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skos-to-jskos")]
#[command(about = "Convert the SKOS crosswalk into JSKOS mappings")]
struct Cli {
    /// Crosswalk JSON-LD document (default: paths.crosswalk)
    input: Option<PathBuf>,

    /// NDJSON output (default: paths.mappings)
    output: Option<PathBuf>,

    /// RFC 3339 timestamp for the `created` field
    #[arg(long)]
    created: Option<String>,

    /// Config file to load
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DataciteConfig::load_from(cli.config.as_deref())?;
    let input = cli.input.unwrap_or_else(|| config.paths.crosswalk.clone());
    let output = cli.output.unwrap_or_else(|| config.paths.mappings.clone());

    let mut converter = CrosswalkConverter::from_config(&config)?;
    if let Some(created) = cli.created.as_deref() {
        converter = converter.with_created(created)?;
    }

    let text = fs::read_to_string(&input)
        .with_context(|| format!("reading crosswalk {}", input.display()))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing crosswalk {}", input.display()))?;
    let mappings = converter.convert(&document);
    info!("converted {} mappings from {}", mappings.len(), input.display());

    let file = File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    write_ndjson(&mappings, BufWriter::new(file))?;
    println!("✅ Wrote {} JSKOS mappings to {}", mappings.len(), output.display());
    Ok(())
}
