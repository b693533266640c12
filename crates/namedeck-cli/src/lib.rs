//! namedeck CLI - Command-line interface library
//!
//! This library provides the CLI functionality for namedeck:
//! - Generate: one slide per spreadsheet name, in random order
//! - Cleanup: drop generated slides, keeping the leading ones
//! - Self-test: check that the spreadsheet and presentation are usable
//! - Init: write a starter configuration, name list and deck
//!
//! # Binary Usage
//!
//! ```bash
//! namedeck init --dir talks
//! namedeck --config talks/namedeck.toml generate --seed 7
//! namedeck --config talks/namedeck.toml self-test
//! namedeck --config talks/namedeck.toml cleanup
//! ```

pub mod app;
pub mod connector;
pub mod logging;

pub use app::{cleanup_command, generate_command, init_command, run_cli, self_test_command};
pub use connector::FileConnector;
pub use logging::init_logging;
