//! DataCite XML to JSON CLI
//!
//! Converts a DataCite kernel-4 XML record to the JSON:API body used by the
//! DataCite REST API.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use datacite_jsonld::config::OutputFormat;
use datacite_jsonld::{build_json_from_xml, DataciteConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datacite-xml2json")]
#[command(about = "Convert DataCite XML to DataCite JSON:API")]
struct Cli {
    /// DataCite XML file
    xml_file: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compact output
    #[arg(long)]
    compact: bool,

    /// Emit the attributes as a JSON-LD document
    #[arg(long)]
    jsonld: bool,

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
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = DataciteConfig::load_from(cli.config.as_deref())?;
    let xml = fs::read_to_string(&cli.xml_file)?;
    let mut document = build_json_from_xml(&xml)?;

    if cli.jsonld {
        let attributes = document["data"]["attributes"].take();
        document = config.namespaces().to_jsonld(attributes, "schema:Dataset");
    }

    let format = if cli.compact {
        OutputFormat::Compact
    } else {
        config.output.format
    };
    let rendered = format.render(&document)?;

    match cli.output {
        Some(path) => {
            fs::write(&path, format!("{}\n", rendered))?;
            eprintln!("✅ Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
