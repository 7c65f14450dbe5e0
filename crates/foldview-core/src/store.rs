//! # Store Module
//!
//! The record source interface consumed by the evaluation harness, plus an
//! in-memory append-only log implementing it.
//!
//! The real record store (durability, indexing, write-side validation) lives
//! outside this crate. All the harness needs is one stable, ordered snapshot
//! per evaluation, which is what [`RecordSource::fetch`] promises.

use crate::record::{Record, RecordId};
use crate::{Error, Result};
use serde_json::Value;

// =============================================================================
// RECORDSOURCE TRAIT
// =============================================================================

/// A queryable, ordered view of the record log.
pub trait RecordSource {
    /// Fetch every record matching `filter` as one consistent snapshot.
    ///
    /// Implementations should return records in ascending id order; the
    /// harness re-sorts if they do not.
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<Record>>;
}

/// Type/name filter applied by the store before folding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub kind: Option<String>,
    pub name: Option<String>,
}

impl RecordFilter {
    /// Match every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match records with the given type tag.
    #[must_use]
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            name: None,
        }
    }

    /// Narrow the filter to records with the given name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check a record against the filter.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.kind.as_deref().is_none_or(|kind| record.kind == kind)
            && self.name.as_deref().is_none_or(|name| record.name == name)
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Borrowed, immutable prefix of a [`RecordLog`].
///
/// While a snapshot is alive the log cannot be appended to, so every
/// evaluation over it sees the same records.
#[derive(Debug, Clone, Copy)]
pub struct LogSnapshot<'a> {
    records: &'a [Record],
}

impl<'a> LogSnapshot<'a> {
    /// Records in ascending id order.
    #[must_use]
    pub fn records(&self) -> &'a [Record] {
        self.records
    }

    /// Last id in the snapshot.
    #[must_use]
    pub fn head(&self) -> Option<RecordId> {
        self.records.last().map(|r| r.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for LogSnapshot<'_> {
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}

// =============================================================================
// IN-MEMORY LOG
// =============================================================================

/// In-memory append-only record log.
///
/// Ids are strictly increasing; records are never mutated or removed.
#[derive(Debug, Clone, Default)]
pub struct RecordLog {
    records: Vec<Record>,
}

impl RecordLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from records in any order.
    ///
    /// Records are sorted by id first; a repeated id is rejected.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Result<Self> {
        let mut records: Vec<Record> = records.into_iter().collect();
        records.sort_by_key(|r| r.id);

        let mut log = Self::new();
        for record in records {
            log.push(record)?;
        }
        Ok(log)
    }

    /// Append a new record, assigning the next id.
    ///
    /// Fails with [`Error::IdExhausted`] once the head id is `u64::MAX`.
    pub fn append(
        &mut self,
        kind: impl Into<String>,
        name: impl Into<String>,
        operation: impl Into<String>,
        data: Value,
    ) -> Result<RecordId> {
        let id = self.next_id()?;
        self.push(Record::new(id, kind, name, operation, data))
    }

    /// Append a record that already carries its id.
    ///
    /// Fails with [`Error::OutOfOrder`] unless the id is greater than the
    /// current head.
    pub fn push(&mut self, record: Record) -> Result<RecordId> {
        if let Some(previous) = self.head()
            && record.id <= previous
        {
            return Err(Error::OutOfOrder {
                previous,
                next: record.id,
            });
        }
        let id = record.id;
        self.records.push(record);
        Ok(id)
    }

    /// Borrow the current contents as a stable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LogSnapshot<'_> {
        LogSnapshot {
            records: &self.records,
        }
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .and_then(|idx| self.records.get(idx))
    }

    /// Last id in the log.
    #[must_use]
    pub fn head(&self) -> Option<RecordId> {
        self.records.last().map(|r| r.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn next_id(&self) -> Result<RecordId> {
        match self.head() {
            None => Ok(RecordId(1)),
            Some(head) => head.next().ok_or(Error::IdExhausted(head)),
        }
    }
}

impl RecordSource for RecordLog {
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        self.snapshot().fetch(filter)
    }
}

// =============================================================================
// TESTS
// =============================================================================
