//! The pull-based row engine.
//!
//! A [`RowCursor`] walks a resolved [`Source`] one file at a time, pulls
//! raw records through the splitter, enforces the document's field arity,
//! coerces fields to their declared affinities, and assigns one global
//! rowid sequence across the whole scan. Provenance (path, line) is
//! recorded into the registry as each row is emitted.
//!
//! The cursor is an explicit state machine:
//!
//! ```text
//! Init -> Opened -> (Reading <-> AdvancingFile) -> Exhausted
//! ```
//!
//! `Init` opens the first file, `Opened` consumes the header when header
//! mode is active, `Reading` emits rows, and `AdvancingFile` drops the
//! current stream before opening the next path (so at most one file handle
//! is ever open). Dropping the cursor early releases the stream the same
//! way.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use xtab_record::{RecordSplitter, SplitOptions, split_fields};
use xtab_result::{Error, Result};
use xtab_source::Source;

use crate::definition::ColumnSpec;
use crate::provenance::ProvenanceRegistry;
use crate::types::{RowId, TableId, Value};

/// Options controlling a single scan.
#[derive(Clone, Default)]
pub struct ScanOptions {
    /// Cooperative cancellation flag, checked at each row boundary.
    pub interrupt: Option<Arc<AtomicBool>>,
}

/// One emitted row: typed values plus identity and provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub rowid: RowId,
    pub values: Vec<Value>,
    pub path: Arc<str>,
    pub line: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Init,
    Opened,
    Reading,
    AdvancingFile,
    Exhausted,
}

pub struct RowCursor {
    table_id: TableId,
    source: Source,
    options: SplitOptions,
    header: bool,
    columns: Arc<[ColumnSpec]>,
    state: CursorState,
    splitter: Option<RecordSplitter<Box<dyn Read>>>,
    file_index: usize,
    current_path: Arc<str>,
    next_rowid: RowId,
    arity: Option<usize>,
    provenance: Arc<ProvenanceRegistry>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowCursor")
            .field("table_id", &self.table_id)
            .field("source", &self.source)
            .field("options", &self.options)
            .field("header", &self.header)
            .field("columns", &self.columns)
            .field("state", &self.state)
            .field("file_index", &self.file_index)
            .field("current_path", &self.current_path)
            .field("next_rowid", &self.next_rowid)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl RowCursor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        table_id: TableId,
        source: Source,
        options: SplitOptions,
        header: bool,
        columns: Arc<[ColumnSpec]>,
        first_rowid: RowId,
        provenance: Arc<ProvenanceRegistry>,
        scan: ScanOptions,
    ) -> RowCursor {
        RowCursor {
            table_id,
            source,
            options,
            header,
            columns,
            state: CursorState::Init,
            splitter: None,
            file_index: 0,
            current_path: Arc::from(""),
            next_rowid: first_rowid,
            arity: None,
            provenance,
            interrupt: scan.interrupt,
        }
    }

    /// The identity rowid-keyed provenance lookups are scoped to.
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Pull the next row, or `None` once every file is drained.
    ///
    /// Fatal errors (arity mismatch, encoding, I/O) leave the cursor
    /// exhausted; rows already returned stand.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        match self.advance() {
            Ok(row) => Ok(row),
            Err(err) => {
                self.release();
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<Row>> {
        if let Some(flag) = &self.interrupt {
            if flag.load(Ordering::Relaxed) {
                self.release();
                return Err(Error::Interrupted);
            }
        }
        loop {
            match self.state {
                CursorState::Init => {
                    self.open_file(0)?;
                    self.state = CursorState::Opened;
                }
                CursorState::Opened => {
                    if self.header {
                        match self.next_record()? {
                            Some(record) => {
                                let fields = split_fields(&record.text, &self.options);
                                self.check_arity(fields.len(), record.line)?;
                            }
                            None => {
                                self.state = CursorState::AdvancingFile;
                                continue;
                            }
                        }
                    }
                    self.state = CursorState::Reading;
                }
                CursorState::Reading => match self.next_record()? {
                    Some(record) => {
                        let fields = split_fields(&record.text, &self.options);
                        self.check_arity(fields.len(), record.line)?;
                        return Ok(Some(self.emit(&fields, record.line)));
                    }
                    None => {
                        self.state = CursorState::AdvancingFile;
                    }
                },
                CursorState::AdvancingFile => {
                    self.splitter = None;
                    self.file_index += 1;
                    if self.file_index >= self.source.len() {
                        self.state = CursorState::Exhausted;
                    } else {
                        self.open_file(self.file_index)?;
                        self.state = CursorState::Opened;
                    }
                }
                CursorState::Exhausted => return Ok(None),
            }
        }
    }

    fn open_file(&mut self, index: usize) -> Result<()> {
        let stream = self.source.open(index)?;
        self.current_path = Arc::from(self.source.paths()[index].display().to_string());
        self.splitter = Some(RecordSplitter::new(stream, self.options));
        tracing::debug!(path = %self.current_path, file_index = index, "opened source file");
        Ok(())
    }

    fn next_record(&mut self) -> Result<Option<xtab_record::Record>> {
        match self.splitter.as_mut() {
            Some(splitter) => splitter.next_record(),
            None => Err(Error::Internal(
                "cursor has no open stream while reading".to_owned(),
            )),
        }
    }

    /// The first record of the scan establishes the document arity; every
    /// later record, header rows of subsequent files included, must match.
    fn check_arity(&mut self, actual: usize, line: u64) -> Result<()> {
        match self.arity {
            None => {
                self.arity = Some(actual);
                Ok(())
            }
            Some(expected) if expected == actual => Ok(()),
            Some(expected) => Err(Error::FieldCount {
                expected,
                actual,
                path: self.current_path.to_string(),
                line,
            }),
        }
    }

    fn emit(&mut self, fields: &[String], line: u64) -> Row {
        let rowid = self.next_rowid;
        self.next_rowid += 1;

        let mut values = Vec::with_capacity(self.columns.len());
        for (index, column) in self.columns.iter().enumerate() {
            match fields.get(index) {
                Some(raw) => values.push(Value::coerce(raw, column.affinity)),
                // Declared columns beyond the document's arity read as NULL.
                None => values.push(Value::Null),
            }
        }

        self.provenance
            .record(self.table_id, rowid, Arc::clone(&self.current_path), line);
        Row {
            rowid,
            values,
            path: Arc::clone(&self.current_path),
            line,
        }
    }

    fn release(&mut self) {
        self.splitter = None;
        self.state = CursorState::Exhausted;
    }
}
