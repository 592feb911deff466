//! DataCite Config CLI
//!
//! Inspects the layered `datacite.toml` settings shared by the other tools
//! and writes a starter file.

use clap::{Parser, Subcommand, ValueEnum};
use datacite_jsonld::DataciteConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datacite-config")]
#[command(about = "Inspect the paths, IRI bases and aliases the DataCite tools run with")]
struct Cli {
    /// Extra TOML file layered over datacite.toml and the user config dir
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective settings after all layers are merged
    Show {
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Text)]
        format: ShowFormat,
    },

    /// Write the built-in defaults as a starter TOML file
    Init {
        /// Destination; picked up automatically when left at the default
        #[arg(short, long, default_value = "datacite.toml")]
        output: String,
    },

    /// Load every layer and check the JSKOS `created` stamp
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowFormat {
    Text,
    Toml,
    Json,
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
    match cli.command {
        Commands::Show { format } => {
            let cfg = DataciteConfig::load_from(cli.config.as_deref())?;

            match format {
                ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&cfg)?),
                ShowFormat::Toml => println!("{}", ::toml::to_string_pretty(&cfg)?),
                ShowFormat::Text => print_text(&cfg),
            }
        }

        Commands::Init { output } => {
            let cfg = DataciteConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate => match DataciteConfig::load_from(cli.config.as_deref()) {
            Ok(cfg) => {
                if let Err(e) = chrono::DateTime::parse_from_rfc3339(&cfg.jskos.created) {
                    eprintln!("❌ jskos.created is not RFC 3339: {}", e);
                    std::process::exit(1);
                }
                println!("✅ Configuration is valid");
                println!("   Profile: {:?}", cfg.paths.profile);
                println!("   Enum lists: {:?}", cfg.paths.enum_dir);
                println!("   Namespaces: {}", cfg.namespaces().iter().count());
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn print_text(cfg: &DataciteConfig) {
    println!("📋 DataCite Tooling Configuration\n");
    println!("Paths:");
    println!("  Profile: {:?}", cfg.paths.profile);
    println!("  Enum lists: {:?}", cfg.paths.enum_dir);
    println!("  Mappings: {:?}", cfg.paths.mappings);
    println!("  Crosswalk: {:?}", cfg.paths.crosswalk);

    println!("\nIRIs:");
    println!("  Enum base: {}", cfg.iri.enum_base);
    println!("  Concept base: {}", cfg.iri.concept_base);
    println!("  Mapping base: {}", cfg.iri.mapping_base);

    println!("\nJSKOS:");
    println!("  Creator: {}", cfg.jskos.creator);
    println!("  Created: {}", cfg.jskos.created);

    println!("\nSync:");
    for (from, to) in &cfg.sync.aliases {
        println!("  Alias: {} -> {}", from, to);
    }
    println!("  Ignored suffixes: {:?}", cfg.sync.ignore_suffixes);

    println!("\nOutput:");
    println!("  Format: {:?}", cfg.output.format);

    println!("\nNamespaces:");
    for (prefix, iri) in cfg.namespaces().iter() {
        println!("  {} -> {}", prefix, iri);
    }
}
