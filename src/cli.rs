//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, HistoryCommands};
pub use presentation::{
    format_decision_json, format_decision_text, format_history_json, format_history_text,
    format_scan_json, format_scan_text, render_tree,
};
pub use route::RunContext;
