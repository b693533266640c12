//! CLI Application logic
//!
//! Contains the command-line interface implementation. Every command loads
//! its own [`DeckConfig`]; [`run_cli`] is the single place where errors are
//! reported.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use namedeck_core::{DeckConfig, RunReport, SelfTestReport, StepOutcome, CONFIG_FILE_NAME};
use namedeck_data::CsvSource;
use namedeck_pptx::DeckWriter;

use crate::connector::FileConnector;
use crate::logging::init_logging;

/// Presentation written by `init`
const STARTER_DECK: &str = "deck.pptx";

/// Name list written by `init`
const STARTER_NAMES: &str = "names.csv";

const SAMPLE_NAMES: [&str; 4] = ["Name", "Ada Lovelace", "Alan Turing", "Grace Hopper"];

#[derive(Parser)]
#[command(name = "namedeck")]
#[command(author, version, about = "One slide per name", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append one slide per name, in random order
    Generate {
        /// Seed for a reproducible order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Delete every slide after the first `keep_count`
    Cleanup,

    /// Check the spreadsheet and presentation without changing anything
    SelfTest,

    /// Write a starter configuration, name list and presentation
    Init {
        /// Target directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI application
///
/// Parses arguments, installs logging and dispatches to the command. Any
/// error is logged here and turned into a failing exit status.
pub fn run_cli() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate { seed } => {
            let report = generate_command(&cli.config, seed)?;
            println!(
                "Created {} slides from {} names",
                report.slides_created.len(),
                report.names_read
            );
        }
        Commands::Cleanup => {
            let removed = cleanup_command(&cli.config)?;
            println!("Removed {} slides", removed);
        }
        Commands::SelfTest => {
            let report = self_test_command(&cli.config)?;
            print_self_test(&report);
            if !report.passed() {
                bail!("self-test failed");
            }
        }
        Commands::Init { dir, force } => {
            for path in init_command(&dir, force)? {
                println!("  Created: {}", path.display());
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<DeckConfig> {
    DeckConfig::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Execute the generate command
pub fn generate_command(config_path: &Path, seed: Option<u64>) -> Result<RunReport> {
    let config = load_config(config_path)?;

    let report = match seed {
        Some(seed) => {
            info!("Shuffling with seed {}", seed);
            namedeck_core::run(&config, &FileConnector, &mut StdRng::seed_from_u64(seed))
        }
        None => namedeck_core::run(&config, &FileConnector, &mut rand::rng()),
    }
    .context("Slide generation failed")?;

    Ok(report)
}

/// Execute the cleanup command
pub fn cleanup_command(config_path: &Path) -> Result<usize> {
    let config = load_config(config_path)?;
    namedeck_core::cleanup(&config, &FileConnector).context("Cleanup failed")
}

/// Execute the self-test command
pub fn self_test_command(config_path: &Path) -> Result<SelfTestReport> {
    let config = load_config(config_path)?;
    Ok(namedeck_core::self_test(&config, &FileConnector))
}

fn print_self_test(report: &SelfTestReport) {
    for step in &report.steps {
        let (mark, detail) = match &step.outcome {
            StepOutcome::Passed(detail) => ("ok", detail),
            StepOutcome::Failed(detail) => ("FAIL", detail),
            StepOutcome::Skipped(detail) => ("skip", detail),
        };
        println!("  [{:>4}] {}: {}", mark, step.step.label(), detail);
    }

    let passed = report
        .steps
        .iter()
        .filter(|s| matches!(s.outcome, StepOutcome::Passed(_)))
        .count();
    println!("{}/{} checks passed", passed, report.steps.len());
}

/// Execute the init command.
///
/// Writes `namedeck.toml`, a sample `names.csv` and a starter `deck.pptx`
/// into `dir`. Existing files are only replaced with `force`. Returns the
/// paths written.
pub fn init_command(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    let names_path = dir.join(STARTER_NAMES);
    let deck_path = dir.join(STARTER_DECK);

    if !force {
        for path in [&config_path, &names_path, &deck_path] {
            if path.exists() {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
        }
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let config = DeckConfig::starter(STARTER_NAMES, STARTER_DECK);
    fs::write(&config_path, config.to_toml_string()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    CsvSource::write_column(&names_path, &SAMPLE_NAMES)
        .with_context(|| format!("Failed to write {}", names_path.display()))?;

    DeckWriter::starter()
        .write_to_file(&deck_path)
        .with_context(|| format!("Failed to write {}", deck_path.display()))?;

    info!("Initialized namedeck project in {}", dir.display());
    Ok(vec![config_path, names_path, deck_path])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate() {
        let args = vec!["namedeck", "generate", "--seed", "42"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from(CONFIG_FILE_NAME));
        assert!(!cli.verbose);
        match cli.command {
            Commands::Generate { seed } => assert_eq!(seed, Some(42)),
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_global_options_after_subcommand() {
        let args = vec!["namedeck", "cleanup", "--config", "talks/deck.toml", "-v"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("talks/deck.toml"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Cleanup));
    }

    #[test]
    fn test_cli_parse_self_test() {
        let args = vec!["namedeck", "-c", "other.toml", "self-test"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::SelfTest));
    }

    #[test]
    fn test_cli_parse_init() {
        let args = vec!["namedeck", "init", "--dir", "talks", "--force"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Init { dir, force } => {
                assert_eq!(dir, PathBuf::from("talks"));
                assert!(force);
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_parse_init_defaults() {
        let cli = Cli::try_parse_from(vec!["namedeck", "init"]).unwrap();

        match cli.command {
            Commands::Init { dir, force } => {
                assert_eq!(dir, PathBuf::from("."));
                assert!(!force);
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(vec!["namedeck"]).is_err());
        assert!(Cli::try_parse_from(vec!["namedeck", "generate", "--seed", "x"]).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }
}
