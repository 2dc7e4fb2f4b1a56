//! xtab: query delimited-text files as SQL tables.
//!
//! This crate is the entrypoint for the xtab engine. It binds the
//! underlying crates — byte sources, the record splitter, and the table
//! layer — under the externally visible module and function names, and
//! re-exports the public surface so hosts and bindings depend on one crate.
//!
//! # Quick start
//!
//! ```no_run
//! use xtab::{Engine, Value};
//!
//! let engine = Engine::new();
//! let table = engine
//!     .create_table("csv", "people", &["filename='people.csv'"])
//!     .unwrap();
//! let mut cursor = table.scan().unwrap();
//! while let Some(row) = cursor.next_row().unwrap() {
//!     println!("{} -> {:?}", row.rowid, row.values);
//! }
//! ```
//!
//! # Modules and functions
//!
//! - Module tables `csv`, `tsv`, `xsv`: fixed source (path or glob) given
//!   at creation, rowids global across the whole scan.
//! - `csv_reader`/`tsv_reader`/`xsv_reader`: declared shape, source path
//!   supplied per call, rowids restarting at 1 per invocation.
//! - `csv_records`/`tsv_records`/`xsv_records`: raw records, no field
//!   splitting, rowids from 0.
//! - Scalar functions `{csv,tsv,xsv}_field_at`,
//!   `{csv,tsv,xsv}_line_number`, `{csv,tsv,xsv}_path`, `xsv_version`,
//!   `xsv_debug`.
//!
//! Every `csv_*`/`tsv_*` name is its `xsv_*` counterpart with the
//! delimiter pre-bound to comma or tab.

mod functions;
mod registry;

pub use registry::{Engine, ModuleForm};

// Re-export result types for error handling
pub use xtab_result::{Error, Result};

// Re-export the source and record layers for hosts that need them directly
pub use xtab_record::{field_at, split_fields, Record, RecordSplitter, SplitOptions};
pub use xtab_source::{Source, SourceSpec};

// Re-export the table layer types that appear in the public API
pub use xtab_table::{
    Affinity, ColumnSpec, HeaderMode, ProvenanceRegistry, ReaderTable, RecordRow, RecordsCursor,
    RecordsTable, Row, RowCursor, RowId, ScanOptions, SourceBinding, Table, TableDefinition,
    TableId, Value,
};
