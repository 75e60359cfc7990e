//! Command-line interface for jsast.
//!
//! ## Commands
//!
//! - `parse <file> [--json]` - Parse a file and report syntax errors (or dump the tree)
//! - `tokens <file>` - List the recorded tokens
//! - `deps <file>` - List module dependencies and environment hints
//! - `lint <file>... [--compact]` - Run the lint rules
//!
//! ## Design
//!
//! Arguments are parsed with clap derive. Every file goes through one
//! [`crate::manager::AstManager`], sized by `--cache-capacity`.
//! Commands report failure through [`CliResult`]; [`run`] alone turns it into a process exit.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::config::{AstManagerConfig, DEFAULT_CACHE_CAPACITY};

// ============================================================================
// Errors and exit codes
// ============================================================================

/// Process exit status of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// A command failure: what to print on stderr and the status to exit with.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// JavaScript AST toolkit: parse, tokenize, extract dependencies and lint
#[derive(Parser, Debug)]
#[command(name = "jsast")]
#[command(version)]
#[command(about = "Parse, tokenize and lint JavaScript with an error-tolerant parser", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Number of parsed files kept in the AST cache
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a file and report syntax errors
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Print the annotated tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tokens recorded while parsing
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List module dependencies and environment hints
    Deps {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Run lint rules over one or more files
    Lint {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// One `file:line:col` line per finding
        #[arg(long)]
        compact: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Parse arguments, run the command and exit with its status.
pub fn run() {
    let code = match execute(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            if !err.message.is_empty() {
                eprintln!("{err}");
            }
            err.exit_code
        }
    };
    if !code.is_success() {
        process::exit(code.0);
    }
}

/// Run a parsed command line on a fresh single-threaded runtime.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = AstManagerConfig::default().with_cache_capacity(cli.cache_capacity);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::failure(format!("Error starting runtime: {e}")))?;
    let session = commands::Session::new(config);

    runtime.block_on(async {
        match cli.command {
            Command::Parse { file, json } => session.parse_file(&file, json).await,
            Command::Tokens { file } => session.tokens_file(&file).await,
            Command::Deps { file } => session.deps_file(&file).await,
            Command::Lint { files, compact } => session.lint_files(&files, compact).await,
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
