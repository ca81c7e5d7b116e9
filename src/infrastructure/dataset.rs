use std::path::Path;
use tracing::instrument;

use crate::domain::{DomainError, RawFaqRecord};

/// Reads FAQ records from a `.jsonl` file (one object per line) or a `.json`
/// file holding an array of objects.
#[instrument]
pub async fn read_records(path: &Path) -> Result<Vec<RawFaqRecord>, DomainError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::not_found(format!("{}: {e}", path.display())))?;

    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    let records = if is_jsonl {
        parse_jsonl(&contents)?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| DomainError::validation(format!("{}: {e}", path.display())))?
    };

    tracing::info!(count = records.len(), "dataset read");
    Ok(records)
}

fn parse_jsonl(contents: &str) -> Result<Vec<RawFaqRecord>, DomainError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| DomainError::validation(format!("line {}: {e}", i + 1)))
        })
        .collect()
}
