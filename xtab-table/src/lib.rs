//! Table layer of the xtab delimited-text engine.
//!
//! This crate turns validated configuration into scannable tables:
//!
//! - [`args`]: parses `key=value` arguments and column declarations into a
//!   [`TableDefinition`].
//! - [`cursor`]: the pull-based row engine driving a source through the
//!   record splitter, coercing fields and assigning rowids.
//! - [`provenance`]: the side-channel registry mapping (table, rowid) to
//!   source path and line number.
//! - [`table`]: fixed-source module tables (`csv`, `tsv`, `xsv`).
//! - [`reader`]: per-call-source tables (`csv_reader` and friends).
//! - [`records`]: raw-record tables (`csv_records` and friends).

pub mod args;
pub mod cursor;
pub mod definition;
pub mod provenance;
pub mod reader;
pub mod records;
pub mod table;
pub mod types;

pub use cursor::{Row, RowCursor, ScanOptions};
pub use definition::{ColumnSpec, HeaderMode, SourceBinding, TableDefinition};
pub use provenance::{ProvenanceEntry, ProvenanceRegistry};
pub use reader::ReaderTable;
pub use records::{RecordRow, RecordsCursor, RecordsTable};
pub use table::Table;
pub use types::{Affinity, RowId, TableId, Value};
