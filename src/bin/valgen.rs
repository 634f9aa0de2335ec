//! Valgen CLI
//!
//! Generates validation code from record descriptors.
//!
//! Usage:
//!   valgen generate --input records.json --output src/user_schema.rs
//!   valgen check --input records.json --against src/user_schema.rs
//!   valgen parse --input descriptors/ --type User
//!   valgen locales
//!   valgen config --save valgen.toml

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use valgen::{generate, load_records, parse_schemas, select_records, DriftReport, MessageCatalog, RecordDescriptor, ValgenConfig};

#[derive(Parser)]
#[command(name = "valgen")]
#[command(about = "Compile validation annotations into Rust validators")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct InputArgs {
    /// Descriptor file, or a directory of `*.json` descriptor files
    #[arg(short, long)]
    input: PathBuf,

    /// Only these record types (comma-separated)
    #[arg(short = 't', long = "type", value_delimiter = ',')]
    types: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one output unit
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: config `[output] path`, else stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Message locale (overrides config)
        #[arg(short, long)]
        locale: Option<String>,

        /// Identifier prefix (overrides config)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Regenerate and diff against an existing file; exits 1 on drift
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Previously generated file
        #[arg(short, long)]
        against: PathBuf,

        /// Message locale (overrides config)
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Print the parsed schemas as JSON
    Parse {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List available message locales and their rule keys
    Locales,

    /// Show the effective configuration
    Config {
        /// Write it to this TOML file instead
        #[arg(long)]
        save: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = match cli.config.as_deref() {
        Some(path) => ValgenConfig::load_from(Some(path)),
        None => ValgenConfig::load(),
    }
    .context("loading configuration")?;

    match cli.command {
        Commands::Generate {
            input,
            output,
            locale,
            prefix,
        } => {
            if let Some(locale) = locale {
                config.generator.locale = locale;
            }
            if let Some(prefix) = prefix {
                config.generator.prefix = prefix;
            }
            let records = read_input(&input)?;
            let unit = generate(&records, &config)?;

            for krate in &unit.external_crates {
                info!(krate = %krate, "generated code depends on an external crate");
            }

            match output.or_else(|| config.output.path.clone()) {
                Some(path) => {
                    write_output(&path, &unit.source)?;
                    eprintln!(
                        "✅ Wrote {} ({} records, {} validators)",
                        path.display(),
                        records.len(),
                        unit.validators.len()
                    );
                }
                None => print!("{}", unit.source),
            }
        }

        Commands::Check { input, against, locale } => {
            if let Some(locale) = locale {
                config.generator.locale = locale;
            }
            let records = read_input(&input)?;
            let unit = generate(&records, &config)?;
            let existing =
                fs::read_to_string(&against).with_context(|| format!("reading {}", against.display()))?;

            let report = DriftReport::compare(&existing, &unit.source);
            if report.is_clean() {
                println!("✅ {} is up to date", against.display());
                return Ok(0);
            }

            if report.input_changed() {
                println!("⚠️  Input descriptors changed since {} was generated", against.display());
            }
            println!(
                "❌ Drift detected: +{} -{} lines\n\n{}",
                report.added, report.removed, report.diff
            );
            return Ok(1);
        }

        Commands::Parse { input } => {
            let records = read_input(&input)?;
            let schemas = parse_schemas(&records, &config.parse_options())?;
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }

        Commands::Locales => {
            let catalog = MessageCatalog::with_files(&config.catalog.paths)?;
            for locale in catalog.locales() {
                let templates = catalog.templates(locale)?;
                println!("{} ({} rules)", locale, templates.len());
                for (rule, template) in templates {
                    println!("  {:<18} {}", rule, template);
                }
            }
        }

        Commands::Config { save } => match save {
            Some(path) => {
                config.save(&path)?;
                println!("✅ Saved configuration: {}", path);
            }
            None => print!("{}", toml::to_string_pretty(&config)?),
        },
    }

    Ok(0)
}

fn read_input(input: &InputArgs) -> Result<Vec<RecordDescriptor>> {
    let records = load_records(&input.input).with_context(|| format!("reading {}", input.input.display()))?;
    if records.is_empty() {
        bail!("no record descriptors found in {}", input.input.display());
    }
    Ok(select_records(records, &input.types)?)
}

fn write_output(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, source).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
