//! Submission import
//!
//! Field devices hand in batches of match records. Each record is inserted
//! on its own; a rejected record is reported and the rest of the batch
//! still goes in.

use crate::data::store::MatchStore;
use crate::{Alliance, MatchRecord, Result, ScoutingError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A batch of submitted records, as uploaded from the field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SubmissionBatch {
    Wrapped { submissions: Vec<MatchRecord> },
    Bare(Vec<MatchRecord>),
}

/// A record the store refused
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub match_number: u32,
    pub alliance: Alliance,
    pub reason: String,
}

/// Outcome of importing one or more batches
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub submitted: usize,
    pub inserted: usize,
    pub rejections: Vec<Rejection>,
}

impl ImportSummary {
    pub fn merge(&mut self, other: ImportSummary) {
        self.submitted += other.submitted;
        self.inserted += other.inserted;
        self.rejections.extend(other.rejections);
    }
}

/// Decode a JSON submission batch: either `[record, ...]` or
/// `{"submissions": [record, ...]}`
pub fn parse_submissions(json: &str) -> Result<Vec<MatchRecord>> {
    let batch: SubmissionBatch = serde_json::from_str(json)
        .map_err(|e| ScoutingError::MalformedInput(format!("invalid submission batch: {}", e)))?;
    Ok(match batch {
        SubmissionBatch::Wrapped { submissions } => submissions,
        SubmissionBatch::Bare(records) => records,
    })
}

/// Insert every record, collecting duplicate and malformed records as
/// rejections. Storage failures abort the import.
pub fn import_records<S: MatchStore + ?Sized>(
    store: &S,
    records: &[MatchRecord],
) -> Result<ImportSummary> {
    for record in records {
        log::info!("Found match {} ({})", record.match_number, record.alliance);
    }
    log::info!("Found {} submissions, sending to database", records.len());

    let mut summary = ImportSummary {
        submitted: records.len(),
        ..Default::default()
    };

    for record in records {
        match store.insert_match(record) {
            Ok(()) => summary.inserted += 1,
            Err(e @ ScoutingError::DuplicateRecord { .. })
            | Err(e @ ScoutingError::MalformedInput(_)) => {
                log::warn!(
                    "Rejected match {} ({}): {}",
                    record.match_number,
                    record.alliance,
                    e
                );
                summary.rejections.push(Rejection {
                    match_number: record.match_number,
                    alliance: record.alliance,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Finished uploading {} submissions ({} rejected)",
        summary.inserted,
        summary.rejections.len()
    );
    Ok(summary)
}

/// Read and import one submission file
pub fn import_file<S: MatchStore + ?Sized, P: AsRef<Path>>(
    store: &S,
    path: P,
) -> Result<ImportSummary> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let records = parse_submissions(&content).map_err(|e| match e {
        ScoutingError::MalformedInput(msg) => {
            ScoutingError::MalformedInput(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;
    import_records(store, &records)
}
