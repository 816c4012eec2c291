//! mrd CLI Binary
//!
//! Command-line interface for the mean rate distribution calculator.

use clap::Parser;
use mrd::cli::{Cli, RunContext};
use mrd::config::ConfigLoader;
use mrd::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = match build_logging_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", mrd::cli::map_error(&e));
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("mrd starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", mrd::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", mrd::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> Result<LoggingConfig, mrd::error::MrdError> {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.parse()?;
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.parse()?;
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    Ok(config)
}
