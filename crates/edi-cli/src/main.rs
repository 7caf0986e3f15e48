//! # edi-cli
//!
//! Command-line front end of the EDIFACT toolkit.
//!
//! `edi parse` prints an interchange (or one node of it) as EDIFACT, XML or
//! JSON; `edi validate` reports whether an interchange parses.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use edi_edifact::{EdifactParser, Interchange, ParserOptions, Standard};
use edi_schema::DirectorySchemaProvider;
use edi_tree::{Cursor, Element};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// The interchange did not parse or the command failed
const EXIT_FAILURE: u8 = 1;
/// The configuration file is unusable
const EXIT_FATAL: u8 = 3;

const DEFAULT_SCHEMA_DIR: &str = "schemas";
const DEFAULT_STANDARD: &str = "EDIFACT";

#[derive(Parser)]
#[command(name = "edi")]
#[command(about = "EDIFACT interchange parser")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory of the definition files
    #[arg(short, long)]
    schemas: Option<PathBuf>,

    /// Reject values violating their declared length or type
    #[arg(long)]
    strict: bool,

    /// Replace coded values by their description
    #[arg(long)]
    translate_codes: bool,

    /// Interchange standard
    #[arg(long)]
    standard: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an interchange and print it
    Parse {
        /// Input file path
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Edi)]
        format: Format,

        /// Add description comments to XML output
        #[arg(short, long)]
        verbose: bool,

        /// Print only the node at this path (e.g. "ORDERS/BGM/1004")
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Check that an interchange parses
    Validate {
        /// Input file path
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Edi,
    Xml,
    Json,
}

/// Command-line flags merged over the configuration file
struct Settings {
    schema_dir: PathBuf,
    standard: String,
    options: ParserOptions,
    verbose_xml: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Self {
        Self {
            schema_dir: cli
                .schemas
                .clone()
                .or(config.schema_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_DIR)),
            standard: cli
                .standard
                .clone()
                .or(config.standard)
                .unwrap_or_else(|| DEFAULT_STANDARD.to_string()),
            options: ParserOptions::new()
                .strict_validation(cli.strict || config.strict_validation)
                .translate_codes(cli.translate_codes || config.translate_codes),
            verbose_xml: config.verbose_xml,
        }
    }

    fn parser(&self) -> anyhow::Result<EdifactParser> {
        let standard: Standard = self.standard.parse()?;
        let provider = DirectorySchemaProvider::new(&self.schema_dir);
        info!(
            "Using {} definitions from {}",
            standard,
            self.schema_dir.display()
        );
        Ok(standard.parser(Arc::new(provider)).with_options(self.options))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(Config::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("ERROR: {err}");
            return ExitCode::from(EXIT_FATAL);
        }
    };
    let settings = Settings::resolve(&cli, config);

    match run(cli.command, &settings) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(command: Commands, settings: &Settings) -> anyhow::Result<ExitCode> {
    let parser = settings.parser()?;
    match command {
        Commands::Parse {
            input,
            format,
            verbose,
            path,
        } => {
            info!("Parsing {}", input.display());
            let interchange = parser
                .parse_file(&input)
                .with_context(|| format!("failed to parse {}", input.display()))?;
            let verbose = verbose || settings.verbose_xml;
            let mut output = match path {
                Some(path) => {
                    let element = Cursor::new(&interchange.root)
                        .navigate(&path)
                        .with_context(|| format!("no node at {path}"))?;
                    render_element(&interchange, element, format, verbose)?
                }
                None => render(&interchange, format, verbose)?,
            };
            if !output.ends_with('\n') {
                output.push('\n');
            }
            print!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { input } => Ok(validate(&parser, &input)),
    }
}

fn render(interchange: &Interchange, format: Format, verbose: bool) -> anyhow::Result<String> {
    Ok(match format {
        Format::Edi => interchange.to_edi(),
        Format::Xml => interchange.to_xml(verbose),
        Format::Json => serde_json::to_string_pretty(interchange)?,
    })
}

fn render_element(
    interchange: &Interchange,
    element: &Element,
    format: Format,
    verbose: bool,
) -> anyhow::Result<String> {
    Ok(match format {
        Format::Edi => interchange.element_to_edi(element),
        Format::Xml => interchange.element_to_xml(element, verbose),
        Format::Json => serde_json::to_string_pretty(element)?,
    })
}

fn validate(parser: &EdifactParser, input: &Path) -> ExitCode {
    info!("Validating {}", input.display());
    match parser.parse_file(input) {
        Ok(_) => {
            println!("valid");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("invalid: {err}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
