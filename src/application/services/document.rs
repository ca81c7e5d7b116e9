use std::collections::HashSet;
use tracing::{instrument, warn};

use crate::domain::{Document, DomainError, LoadReport, RawFaqRecord, SkippedRecord};

/// Turns raw FAQ records into documents ready for indexing.
#[derive(Debug, Clone, Default)]
pub struct DocumentService;

impl DocumentService {
    pub fn new() -> Self {
        Self
    }

    /// Loads every valid record. Records with a missing or blank question or answer
    /// are skipped and listed in the report, never fatal.
    #[instrument(skip_all)]
    pub fn load<I>(&self, records: I) -> LoadReport
    where
        I: IntoIterator<Item = RawFaqRecord>,
    {
        let mut report = LoadReport::default();
        let mut seen = HashSet::new();

        for (index, record) in records.into_iter().enumerate() {
            match Document::from_record(index, record) {
                Ok(doc) => {
                    if !seen.insert(doc.id.clone()) {
                        warn!(id = %doc.id, index, "duplicate document id, later record wins");
                    }
                    report.documents.push(doc);
                }
                Err(DomainError::MalformedRecord { index, reason }) => {
                    warn!(index, %reason, "skipping malformed record");
                    report.skipped.push(SkippedRecord { index, reason });
                }
                Err(e) => {
                    warn!(index, error = %e, "skipping record");
                    report.skipped.push(SkippedRecord {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            loaded = report.documents.len(),
            skipped = report.skipped_count(),
            "records loaded"
        );
        report
    }
}
