//! Fixed-source module tables (`csv`, `tsv`, `xsv`).

use std::sync::Arc;

use xtab_record::{RecordSplitter, split_fields};
use xtab_result::{Error, Result};
use xtab_source::Source;

use crate::cursor::{RowCursor, ScanOptions};
use crate::definition::{ColumnSpec, TableDefinition};
use crate::provenance::ProvenanceRegistry;
use crate::types::{Affinity, TableId};

/// A virtual table bound to one file or glob at creation time.
///
/// The schema is settled when the table is created: declared columns win;
/// otherwise the first record of the first file supplies names (header
/// mode) or a field count to synthesize `c1..cN` from. Rowids run from 1,
/// globally across every file of a glob.
#[derive(Debug)]
pub struct Table {
    id: TableId,
    definition: TableDefinition,
    source: Source,
    schema: Arc<[ColumnSpec]>,
    header: bool,
    provenance: Arc<ProvenanceRegistry>,
}

impl Table {
    pub fn create(
        id: TableId,
        definition: TableDefinition,
        source: Source,
        provenance: Arc<ProvenanceRegistry>,
    ) -> Result<Table> {
        let header = definition.has_header();
        let schema: Arc<[ColumnSpec]> = if definition.columns.is_empty() {
            infer_schema(&source, &definition, header)?.into()
        } else {
            definition.columns.clone().into()
        };
        Ok(Table {
            id,
            definition,
            source,
            schema,
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

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    /// The table's columns, all visible for module tables.
    pub fn schema(&self) -> &[ColumnSpec] {
        &self.schema
    }

    pub fn scan(&self) -> Result<RowCursor> {
        self.scan_with(ScanOptions::default())
    }

    /// Open a fresh cursor over the table's source. Each scan restarts from
    /// the first file; re-scanning an unchanged source yields identical
    /// output.
    pub fn scan_with(&self, options: ScanOptions) -> Result<RowCursor> {
        Ok(RowCursor::new(
            self.id,
            self.source.clone(),
            self.definition.split_options(),
            self.header,
            Arc::clone(&self.schema),
            1,
            Arc::clone(&self.provenance),
            options,
        ))
    }
}

/// Read the first record of the first file to settle the schema: header
/// names when header mode is active, `c1..cN` otherwise.
fn infer_schema(
    source: &Source,
    definition: &TableDefinition,
    header: bool,
) -> Result<Vec<ColumnSpec>> {
    let stream = source.open(0)?;
    let mut splitter = RecordSplitter::new(stream, definition.split_options());
    let record = splitter.next_record()?.ok_or_else(|| {
        Error::InvalidArgumentError(format!(
            "cannot determine columns: '{}' is empty",
            source.paths()[0].display()
        ))
    })?;
    let fields = split_fields(&record.text, &definition.split_options());
    if header {
        Ok(fields
            .into_iter()
            .map(|name| ColumnSpec::new(name, Affinity::None))
            .collect())
    } else {
        Ok((1..=fields.len())
            .map(|i| ColumnSpec::new(format!("c{i}"), Affinity::None))
            .collect())
    }
}
