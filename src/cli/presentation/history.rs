//! Execution history presentation: build-avoidance decisions and stored records.

use super::to_pretty_json;
use crate::error::ApiError;
use crate::execution::ExecutionDecision;
use crate::types::hash_to_hex;
use crate::workspace::ExecutionRecord;
use serde_json::{json, Value};

pub fn format_decision_text(
    identity: &str,
    decision: &ExecutionDecision,
    recorded: Option<&ExecutionRecord>,
) -> String {
    let mut s = match decision {
        ExecutionDecision::UpToDate { record } => format!(
            "{}: up to date (last successful run {})",
            identity,
            record.recorded_at.to_rfc3339()
        ),
        ExecutionDecision::Changed { previous } if !previous.successful => format!(
            "{}: out of date (last run failed at {})",
            identity,
            previous.recorded_at.to_rfc3339()
        ),
        ExecutionDecision::Changed { previous } => format!(
            "{}: out of date (inputs changed since {})",
            identity,
            previous.recorded_at.to_rfc3339()
        ),
        ExecutionDecision::NoHistory => format!("{}: out of date (no execution history)", identity),
    };
    if let Some(record) = recorded {
        s.push_str(&format!(
            "\nRecorded inputs {}",
            hash_label(record.snapshot_hash.as_ref())
        ));
    }
    s
}

pub fn format_decision_json(
    identity: &str,
    decision: &ExecutionDecision,
    recorded: Option<&ExecutionRecord>,
) -> Result<String, ApiError> {
    let (status, previous) = match decision {
        ExecutionDecision::UpToDate { record } => ("up_to_date", Some(record)),
        ExecutionDecision::Changed { previous } => ("changed", Some(previous)),
        ExecutionDecision::NoHistory => ("no_history", None),
    };
    let out = json!({
        "identity": identity,
        "status": status,
        "up_to_date": decision.is_up_to_date(),
        "previous": previous.map(record_json),
        "recorded": recorded.map(record_json),
    });
    to_pretty_json(&out)
}

pub fn format_history_text(identity: &str, record: Option<&ExecutionRecord>) -> String {
    match record {
        None => format!("No execution history for {}", identity),
        Some(record) => format!(
            "Execution history for {}:\n  Recorded at: {}\n  Successful: {}\n  Input hash: {}",
            identity,
            record.recorded_at.to_rfc3339(),
            record.successful,
            hash_label(record.snapshot_hash.as_ref())
        ),
    }
}

pub fn format_history_json(
    identity: &str,
    record: Option<&ExecutionRecord>,
) -> Result<String, ApiError> {
    let out = json!({
        "identity": identity,
        "record": record.map(record_json),
    });
    to_pretty_json(&out)
}

fn record_json(record: &ExecutionRecord) -> Value {
    json!({
        "snapshot_hash": record.snapshot_hash.as_ref().map(hash_to_hex),
        "recorded_at": record.recorded_at.to_rfc3339(),
        "successful": record.successful,
    })
}

fn hash_label(hash: Option<&[u8; 32]>) -> String {
    hash.map(hash_to_hex)
        .unwrap_or_else(|| "(no input)".to_string())
}
