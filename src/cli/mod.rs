//! CLI module for tlua
//!
//! ## Commands
//!
//! - `tlua <file>` - Analyze, print diagnostics, then print the source with inferred typings
//! - `check <file>` - Analyze and print diagnostics only
//! - `fmt <file>` - Unparse a file (`--check`, `--diff`, `--write`, `--typings`)
//! - `--parse <file>` - Dump the syntax tree (debug)
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//! - `prelude` - Standard-library declarations handed to the analyzer
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
pub mod prelude;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;

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
#[derive(Debug, Error)]
#[error("{message}")]
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
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Type checker and unparser for a gradually-typed Lua dialect
#[derive(Parser, Debug)]
#[command(name = "tlua")]
#[command(version = VERSION)]
#[command(about = "Type checker and unparser for a gradually-typed Lua dialect", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// File to analyze (default action when no subcommand given)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Parse only and dump the syntax tree (debug)
    #[arg(long = "parse", value_name = "FILE", conflicts_with = "file")]
    pub parse_file: Option<PathBuf>,

    /// Analyze without the standard-library declarations
    #[arg(long, global = true)]
    pub no_prelude: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a file and report diagnostics
    Check {
        /// Source file to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Unparse a file
    Fmt {
        /// Source file to unparse
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Exit with an error if the file would change
        #[arg(long)]
        check: bool,
        /// Show diff of the changes
        #[arg(long)]
        diff: bool,
        /// Write the result back to the file instead of printing it
        #[arg(long, conflicts_with_all = ["check", "diff"])]
        write: bool,
        /// Embed inferred typings as long comments
        #[arg(long)]
        typings: bool,
        /// Re-emit type annotations
        #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
        keep_annotations: bool,
        /// Put every statement on its own line instead of keeping source lines
        #[arg(long)]
        compact: bool,
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
    let prelude = !cli.no_prelude;

    // Handle debug flags first
    if let Some(file) = cli.parse_file {
        return commands::parse_file(&file.to_string_lossy());
    }

    match cli.command {
        Some(Command::Check { file }) => commands::check_file(&file.to_string_lossy(), prelude),
        Some(Command::Fmt {
            file,
            check,
            diff,
            write,
            typings,
            keep_annotations,
            compact,
        }) => {
            let options = commands::FormatOptions {
                check,
                diff,
                write,
                prelude,
            };
            let config = crate::format::FormatConfig::new()
                .with_emit_typings(typings)
                .with_keep_annotations(keep_annotations)
                .with_preserve_lines(!compact);
            commands::format_file(&file.to_string_lossy(), &config, options)
        }
        None => {
            // Default: analyze the file and print it back with its typings
            if let Some(file) = cli.file {
                commands::run_file(&file.to_string_lossy(), prelude)
            } else {
                // No command and no file - show help
                Err(CliError::failure("No input file. Run `tlua --help` for usage."))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
