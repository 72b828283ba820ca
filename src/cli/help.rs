//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{Commands, ConfigCommands, HistoryCommands};

/// Command name string for log spans (e.g. "scan", "history.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Scan { .. } => "scan".to_string(),
        Commands::Check { .. } => "check".to_string(),
        Commands::History { command } => format!("history.{}", history_command_name(command)),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn history_command_name(command: &HistoryCommands) -> &'static str {
    match command {
        HistoryCommands::Show { .. } => "show",
        HistoryCommands::Clear { .. } => "clear",
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Init { .. } => "init",
        ConfigCommands::Show => "show",
    }
}
