//! CLI module for blockdoc
//!
//! ## Commands
//!
//! - `build <src>` - Rewrite pages with visible renderings (and write doctests)
//! - `doctests <src>` - Write doctest files only
//! - `normalize [file]` - Normalize a single block (debug)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::DoctestConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create a failure error rendered from a diagnostic (source snippet, code, help).
    pub fn diagnostic<E>(err: E) -> Self
    where
        E: miette::Diagnostic + Send + Sync + 'static,
    {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Executable documentation blocks
#[derive(Parser, Debug)]
#[command(name = "blockdoc")]
#[command(version = VERSION)]
#[command(about = "Render documentation code blocks and extract them as doctests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by commands that scan pages
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Number of page-scanning workers (default: available parallelism)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Extra language tag whose blocks are normalized (repeatable)
    #[arg(long = "lang", value_name = "TAG")]
    pub languages: Vec<String>,
}

impl ScanArgs {
    /// Build the doctest config these flags describe.
    pub fn config(&self) -> DoctestConfig {
        let mut config = DoctestConfig::new();
        if let Some(jobs) = self.jobs {
            config = config.with_jobs(jobs);
        }
        for tag in &self.languages {
            config = config.with_language(tag.clone());
        }
        config
    }
}

/// Which rendering `normalize` prints
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Show {
    /// Both renderings, labelled
    #[default]
    Both,
    /// Only the executable rendering
    Executable,
    /// Only the visible rendering
    Visible,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite pages with visible renderings and write doctests
    Build {
        /// Source directory (or single page)
        #[arg(value_name = "SRC")]
        src: PathBuf,
        /// Output directory for rewritten pages (default: SRC/_build)
        #[arg(short = 'o', long = "out", value_name = "OUT")]
        out: Option<PathBuf>,
        /// Do not write doctests into SRC/_doctests
        #[arg(long = "no-doctests")]
        no_doctests: bool,
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Write doctest files only
    Doctests {
        /// Source directory (or single page)
        #[arg(value_name = "SRC")]
        src: PathBuf,
        /// Output directory for doctests (default: SRC/_doctests)
        #[arg(short = 'o', long = "out", value_name = "OUT")]
        out: Option<PathBuf>,
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Normalize one block read from a file or stdin
    Normalize {
        /// File holding the block (default: stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
        /// Line number the block starts at
        #[arg(long = "line", value_name = "N", default_value_t = 1)]
        line: usize,
        /// Which rendering to print
        #[arg(long = "show", value_enum, default_value_t = Show::Both)]
        show: Show,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Build {
            src,
            out,
            no_doctests,
            scan,
        } => {
            let config = scan.config().with_write_doctests(!no_doctests);
            commands::build(&src, out.as_deref(), &config)
        }
        Command::Doctests { src, out, scan } => commands::write_doctests(&src, out.as_deref(), &scan.config()),
        Command::Normalize { file, line, show } => commands::normalize_file(file.as_deref(), line, show),
    }
}

// ============================================================================
// Tests
// ============================================================================
