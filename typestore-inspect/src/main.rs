//! typestore dictionary inspector
//!
//! Usage:
//!   typestore-inspect check types.dict --runtime runtime.dict
//!   typestore-inspect normalize types.dict > normalized.dict
//!   typestore-inspect plan types.dict --config mapping.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use typestore_legacy::MappingConfig;

#[derive(Parser, Debug)]
#[command(name = "typestore-inspect")]
#[command(about = "Inspect typestore type dictionaries and legacy type mappings")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a dictionary and summarize its lineages
    Check {
        dictionary: PathBuf,

        /// Definitions of the running program, bound as runtime definitions
        #[arg(short, long)]
        runtime: Option<PathBuf>,
    },
    /// Print a dictionary in canonical form
    Normalize { dictionary: PathBuf },
    /// Show how every outdated definition maps onto its current type
    Plan {
        dictionary: PathBuf,

        #[arg(short, long)]
        runtime: Option<PathBuf>,

        /// Mapping configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load(dictionary: &Path, runtime: Option<&Path>) -> Result<typestore_schema::TypeDictionary> {
    let text = read(dictionary)?;
    let runtime = runtime.map(read).transpose()?;
    typestore_inspect::load(&text, runtime.as_deref())
        .with_context(|| format!("Invalid dictionary {}", dictionary.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Check { dictionary, runtime } => {
            let loaded = load(&dictionary, runtime.as_deref())?;
            let summary = typestore_inspect::check(&loaded);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{summary}");
            }
        }
        Command::Normalize { dictionary } => {
            let loaded = load(&dictionary, None)?;
            print!("{}", typestore_inspect::normalize(&loaded));
        }
        Command::Plan {
            dictionary,
            runtime,
            config,
        } => {
            let loaded = load(&dictionary, runtime.as_deref())?;
            let config = match config {
                Some(path) => MappingConfig::load_from(&path)
                    .with_context(|| format!("Invalid mapping configuration {}", path.display()))?,
                None => MappingConfig::default(),
            };
            let plans = typestore_inspect::plan(&loaded, &config)?;
            info!("Planned {} legacy type handlers", plans.len());
            if args.json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                for plan in &plans {
                    print!("{plan}");
                }
            }
        }
    }
    Ok(())
}
