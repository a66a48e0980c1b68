//! Match record storage abstraction

use crate::{MatchRecord, Result, ScoutingError};
use std::sync::{Arc, RwLock};

/// Source of truth for match records. Statistics only ever read from it.
pub trait MatchStore {
    /// All stored records, ordered by match number ascending
    fn fetch_all_matches(&self) -> Result<Vec<MatchRecord>>;

    /// Insert a new record. Fails with `DuplicateRecord` if the
    /// (match number, alliance) pair is already stored.
    fn insert_match(&self, record: &MatchRecord) -> Result<()>;
}

/// Checks a candidate record against what is already stored
pub fn check_insert<'a, I>(stored: I, record: &MatchRecord) -> Result<()>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    record.validate()?;

    for existing in stored {
        if existing.match_number != record.match_number {
            continue;
        }
        if existing.alliance == record.alliance {
            return Err(ScoutingError::DuplicateRecord {
                match_number: record.match_number,
                alliance: record.alliance,
            });
        }
        if existing.win_result != record.win_result.opposite() {
            return Err(ScoutingError::MalformedInput(format!(
                "match {} ({}) recorded {} but {} recorded {}",
                record.match_number,
                record.alliance,
                record.win_result,
                existing.alliance,
                existing.win_result
            )));
        }
    }

    Ok(())
}

/// Vec-backed store for tests and one-shot runs. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<MatchRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, rejecting any that would fail `insert_match`
    pub fn with_records(records: Vec<MatchRecord>) -> Result<Self> {
        let store = Self::new();
        for record in &records {
            store.insert_match(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> Result<usize> {
        self.records
            .read()
            .map(|r| r.len())
            .map_err(|_| ScoutingError::StorageUnavailable("lock poisoned".into()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl MatchStore for InMemoryStore {
    fn fetch_all_matches(&self) -> Result<Vec<MatchRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| ScoutingError::StorageUnavailable("lock poisoned".into()))?;
        let mut matches = records.clone();
        matches.sort_by_key(|r| (r.match_number, r.alliance));
        Ok(matches)
    }

    fn insert_match(&self, record: &MatchRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ScoutingError::StorageUnavailable("lock poisoned".into()))?;
        check_insert(records.iter(), record)?;
        records.push(record.clone());
        Ok(())
    }
}
