//! Snapshots CLI Binary
//!
//! Command-line interface for content-addressed filesystem snapshots.

use clap::Parser;
use merkle_snapshots::cli::{Cli, RunContext};
use merkle_snapshots::config::{xdg, ConfigLoader};
use merkle_snapshots::logging::{default_log_file, init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Snapshots CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing workspace: {}", e);
            eprintln!("{}", merkle_snapshots::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", merkle_snapshots::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    // If --verbose is not set, disable logging
    if !cli.verbose {
        return LoggingConfig {
            level: "off".to_string(),
            ..LoggingConfig::default()
        };
    }

    let mut config = match cli.config {
        Some(ref config_path) if config_path.exists() => ConfigLoader::load_from_file(config_path)
            .map(|c| c.logging)
            .unwrap_or_default(),
        _ => ConfigLoader::load(&cli.workspace)
            .map(|c| c.logging)
            .unwrap_or_default(),
    };

    // CLI arguments take precedence
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    } else if config.file == default_log_file() {
        // Resolve default log file path to XDG data directory
        if let Ok(data_dir) = xdg::workspace_data_dir(&cli.workspace) {
            config.file = data_dir.join("snapshots.log");
        }
    }

    config
}
