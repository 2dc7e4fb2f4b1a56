//! Raw-record tables: the `*_records` form.
//!
//! Exposes the record splitter directly: each emitted row is one raw
//! record, trailing newline preserved, with no field splitting and no
//! header handling. Rowids start at 0 per invocation. Like the reader
//! form, the source path arrives per call through a hidden `_source`
//! column.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use xtab_record::{RecordSplitter, SplitOptions};
use xtab_result::{Error, Result};
use xtab_source::Source;

use crate::cursor::ScanOptions;
use crate::definition::{ColumnSpec, TableDefinition};
use crate::provenance::ProvenanceRegistry;
use crate::types::{RowId, TableId};

#[derive(Debug)]
pub struct RecordsTable {
    id: TableId,
    definition: TableDefinition,
    schema: Arc<[ColumnSpec]>,
    provenance: Arc<ProvenanceRegistry>,
}

/// One raw record row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub rowid: RowId,
    /// Raw record text, trailing newline preserved when present.
    pub record: String,
    pub path: Arc<str>,
    pub line: u64,
}

impl RecordsTable {
    pub fn create(
        id: TableId,
        definition: TableDefinition,
        provenance: Arc<ProvenanceRegistry>,
    ) -> Result<RecordsTable> {
        if !definition.columns.is_empty() {
            return Err(Error::InvalidArgumentError(format!(
                "'{}' does not accept column declarations",
                definition.table_name
            )));
        }
        let schema: Arc<[ColumnSpec]> = vec![
            ColumnSpec::new("record", crate::types::Affinity::Text),
            ColumnSpec::hidden("_source"),
        ]
        .into();
        Ok(RecordsTable {
            id,
            definition,
            schema,
            provenance,
        })
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.definition.table_name
    }

    pub fn schema(&self) -> &[ColumnSpec] {
        &self.schema
    }

    /// A scan with no path argument: the required access pattern is absent.
    pub fn scan(&self) -> Result<RecordsCursor> {
        Err(Error::MissingArgument(format!(
            "'{}' requires a source path argument",
            self.definition.table_name
        )))
    }

    pub fn scan_path(&self, path: &str) -> Result<RecordsCursor> {
        self.scan_path_with(path, ScanOptions::default())
    }

    pub fn scan_path_with(&self, path: &str, options: ScanOptions) -> Result<RecordsCursor> {
        if path.is_empty() {
            return Err(Error::MissingArgument(format!(
                "'{}' requires a source path argument",
                self.definition.table_name
            )));
        }
        let source = Source::resolve(path)?;
        Ok(RecordsCursor {
            table_id: self.id,
            source,
            options: self.definition.split_options(),
            splitter: None,
            file_index: 0,
            started: false,
            exhausted: false,
            current_path: Arc::from(""),
            next_rowid: 0,
            provenance: Arc::clone(&self.provenance),
            interrupt: options.interrupt,
        })
    }
}

/// Pull-based cursor over raw records.
pub struct RecordsCursor {
    table_id: TableId,
    source: Source,
    options: SplitOptions,
    splitter: Option<RecordSplitter<Box<dyn Read>>>,
    file_index: usize,
    started: bool,
    exhausted: bool,
    current_path: Arc<str>,
    next_rowid: RowId,
    provenance: Arc<ProvenanceRegistry>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for RecordsCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordsCursor")
            .field("table_id", &self.table_id)
            .field("source", &self.source)
            .field("options", &self.options)
            .field("file_index", &self.file_index)
            .field("started", &self.started)
            .field("exhausted", &self.exhausted)
            .field("current_path", &self.current_path)
            .field("next_rowid", &self.next_rowid)
            .finish_non_exhaustive()
    }
}

impl RecordsCursor {
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Pull the next raw record, or `None` once every file is drained.
    pub fn next_record(&mut self) -> Result<Option<RecordRow>> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(flag) = &self.interrupt {
            if flag.load(Ordering::Relaxed) {
                self.release();
                return Err(Error::Interrupted);
            }
        }
        loop {
            if self.splitter.is_none() {
                if self.started {
                    self.file_index += 1;
                }
                self.started = true;
                if self.file_index >= self.source.len() {
                    self.release();
                    return Ok(None);
                }
                let stream = match self.source.open(self.file_index) {
                    Ok(stream) => stream,
                    Err(err) => {
                        self.release();
                        return Err(err);
                    }
                };
                self.current_path =
                    Arc::from(self.source.paths()[self.file_index].display().to_string());
                self.splitter = Some(RecordSplitter::new(stream, self.options));
                tracing::debug!(path = %self.current_path, "opened records source file");
            }

            let next = match self.splitter.as_mut() {
                Some(splitter) => splitter.next_record(),
                None => return Ok(None),
            };
            match next {
                Ok(Some(record)) => {
                    let rowid = self.next_rowid;
                    self.next_rowid += 1;
                    self.provenance.record(
                        self.table_id,
                        rowid,
                        Arc::clone(&self.current_path),
                        record.line,
                    );
                    return Ok(Some(RecordRow {
                        rowid,
                        record: record.text,
                        path: Arc::clone(&self.current_path),
                        line: record.line,
                    }));
                }
                Ok(None) => {
                    // Current file drained; drop its handle before moving on.
                    self.splitter = None;
                }
                Err(err) => {
                    self.release();
                    return Err(err);
                }
            }
        }
    }

    fn release(&mut self) {
        self.splitter = None;
        self.exhausted = true;
    }
}
