//! Side-channel registry mapping (table, rowid) to row provenance.
//!
//! Provenance cannot ride inside a row's SQL payload without occupying a
//! real column, so cursors record it here as rows are produced and the
//! `*_path`/`*_line_number` scalar functions read it back by rowid. The
//! registry is owned by the engine and shared with every cursor; entries
//! are keyed by (table identity, rowid) so concurrent cursors on different
//! tables never cross-contaminate.
//!
//! Entries are upserted per row and never bulk-cleared: a rescan overwrites
//! the rowids it reaches, and a shorter rescan leaves stale entries for
//! higher rowids readable. Lookups for rowids nothing recorded return
//! `None`, which the scalar layer renders as NULL.

use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;

use crate::types::{RowId, TableId};

/// Path and line number of one produced row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceEntry {
    pub path: Arc<str>,
    pub line: u64,
}

/// Registry written by cursors and read by the provenance scalar functions.
#[derive(Debug, Default)]
pub struct ProvenanceRegistry {
    entries: Mutex<FxHashMap<(TableId, RowId), ProvenanceEntry>>,
}

impl ProvenanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the provenance of one produced row.
    pub fn record(&self, table: TableId, rowid: RowId, path: Arc<str>, line: u64) {
        self.lock().insert((table, rowid), ProvenanceEntry { path, line });
    }

    /// Source path of the row `rowid` most recently produced by `table`.
    pub fn path(&self, table: TableId, rowid: RowId) -> Option<Arc<str>> {
        self.lock().get(&(table, rowid)).map(|entry| Arc::clone(&entry.path))
    }

    /// 1-based line number of the row `rowid` most recently produced by
    /// `table`.
    pub fn line_number(&self, table: TableId, rowid: RowId) -> Option<u64> {
        self.lock().get(&(table, rowid)).map(|entry| entry.line)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<(TableId, RowId), ProvenanceEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
