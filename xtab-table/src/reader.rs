//! Per-call-source tables: the `*_reader` table-valued-function form.
//!
//! A reader table fixes the shape (columns, delimiter, quoting) at creation
//! and takes the source path as a call argument, so one declared shape can
//! be scanned against many files inside a single query. The bound path is
//! surfaced through a hidden leading `_source` column; supplying it is the
//! only usable access pattern, and a call without a resolvable path fails
//! rather than scanning nothing.

use std::sync::Arc;

use xtab_result::{Error, Result};
use xtab_source::Source;

use crate::cursor::{RowCursor, ScanOptions};
use crate::definition::{ColumnSpec, TableDefinition};
use crate::provenance::ProvenanceRegistry;
use crate::types::TableId;

#[derive(Debug)]
pub struct ReaderTable {
    id: TableId,
    definition: TableDefinition,
    schema: Arc<[ColumnSpec]>,
    value_columns: Arc<[ColumnSpec]>,
    header: bool,
    provenance: Arc<ProvenanceRegistry>,
}

impl ReaderTable {
    pub fn create(
        id: TableId,
        definition: TableDefinition,
        provenance: Arc<ProvenanceRegistry>,
    ) -> Result<ReaderTable> {
        if definition.columns.is_empty() {
            return Err(Error::InvalidArgumentError(format!(
                "'{}' requires at least one column declaration",
                definition.table_name
            )));
        }
        let header = definition.has_header();
        let mut schema = Vec::with_capacity(definition.columns.len() + 1);
        schema.push(ColumnSpec::hidden("_source"));
        schema.extend(definition.columns.iter().cloned());
        let value_columns: Arc<[ColumnSpec]> = definition.columns.clone().into();
        Ok(ReaderTable {
            id,
            definition,
            schema: schema.into(),
            value_columns,
            header,
            provenance,
        })
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.definition.table_name
    }

    /// Full schema, hidden `_source` column first.
    pub fn schema(&self) -> &[ColumnSpec] {
        &self.schema
    }

    /// Columns shown by `select *` (the hidden path column excluded).
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.schema.iter().filter(|column| !column.hidden)
    }

    /// A scan with no path argument: the required access pattern is absent.
    pub fn scan(&self) -> Result<RowCursor> {
        Err(Error::MissingArgument(format!(
            "'{}' requires a source path argument",
            self.definition.table_name
        )))
    }

    pub fn scan_path(&self, path: &str) -> Result<RowCursor> {
        self.scan_path_with(path, ScanOptions::default())
    }

    /// Scan one invocation's source. Rowids restart at 1 for every
    /// invocation, unlike fixed-source tables where they run across the
    /// whole glob.
    pub fn scan_path_with(&self, path: &str, options: ScanOptions) -> Result<RowCursor> {
        if path.is_empty() {
            return Err(Error::MissingArgument(format!(
                "'{}' requires a source path argument",
                self.definition.table_name
            )));
        }
        let source = Source::resolve(path)?;
        Ok(RowCursor::new(
            self.id,
            source,
            self.definition.split_options(),
            self.header,
            Arc::clone(&self.value_columns),
            1,
            Arc::clone(&self.provenance),
            options,
        ))
    }
}
