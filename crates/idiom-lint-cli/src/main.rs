//! idiom-lint CLI tool.
//!
//! Usage:
//! ```bash
//! idiom-lint check [OPTIONS] [PATH]
//! idiom-lint manifest [PATH]
//! idiom-lint list-rules
//! idiom-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use idiom_lint_core::Severity;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Heuristic idiom analyzer for Rust sources and manifests
#[derive(Parser)]
#[command(name = "idiom-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source file or directory
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only report these categories (comma-separated, e.g. async,errors)
        #[arg(long)]
        category: Option<String>,

        /// Only report these patterns (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Exit non-zero when findings at or above this severity exist
        #[arg(long)]
        fail_on: Option<FailOn>,
    },

    /// Check a Cargo.toml and the project layout around it
    Manifest {
        /// Project directory or manifest path (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exit non-zero when findings at or above this severity exist
        #[arg(long)]
        fail_on: Option<FailOn>,
    },

    /// List available patterns
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Diagnostics with source excerpts.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-finding compact format.
    Compact,
    /// Markdown report.
    Markdown,
}

/// Failure threshold given on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FailOn {
    /// Fail on errors only.
    Error,
    /// Fail on warnings and errors.
    Warning,
    /// Fail on any non-positive finding.
    Info,
}

impl From<FailOn> for Severity {
    fn from(value: FailOn) -> Self {
        match value {
            FailOn::Error => Self::Error,
            FailOn::Warning => Self::Warning,
            FailOn::Info => Self::Info,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            category,
            rules,
            exclude,
            fail_on,
        } => commands::check::run(
            &path,
            format,
            &commands::check::Filters {
                categories: category,
                rules,
                exclude,
            },
            fail_on.map(Severity::from),
            cli.config.as_deref(),
        ),
        Commands::Manifest {
            path,
            format,
            fail_on,
        } => commands::manifest::run(
            &path,
            format,
            fail_on.map(Severity::from),
            cli.config.as_deref(),
        ),
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
