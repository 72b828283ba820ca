//! CLI presentation: text and json formatters per command family.

mod history;
mod scan;

pub use history::{
    format_decision_json, format_decision_text, format_history_json, format_history_text,
};
pub use scan::{format_scan_json, format_scan_text, render_tree};

use crate::error::{ApiError, StorageError};

fn to_pretty_json(value: &serde_json::Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::StorageError(StorageError::InvalidPath(e.to_string())))
}
