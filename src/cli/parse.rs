//! CLI parse: clap types for mrd. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mean rate distribution calculator
#[derive(Parser)]
#[command(name = "mrd")]
#[command(about = "Compute mean rate distributions of two correlated intensity measures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a calculation from a JSON job file and store the result
    Compute {
        /// Job file (JSON)
        #[arg(long)]
        job: PathBuf,

        /// First intensity measure type, e.g. PGA or SA(0.2)
        #[arg(long)]
        imt1: Option<String>,

        /// Second intensity measure type
        #[arg(long)]
        imt2: Option<String>,

        /// Cross-correlation model name
        #[arg(long)]
        cross_correlation: Option<String>,

        /// Target number of work units
        #[arg(long)]
        concurrent_tasks: Option<usize>,

        /// Result store directory (defaults to storage.store_path)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Show a stored dataset
    Show {
        /// Result store directory (defaults to storage.store_path)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Dataset name
        #[arg(long, default_value = "mrd")]
        name: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Commands {
    /// Short command name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Compute { .. } => "compute",
            Commands::Show { .. } => "show",
            Commands::Config => "config",
        }
    }
}
