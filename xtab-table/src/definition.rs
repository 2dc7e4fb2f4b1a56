//! Validated table configuration, immutable once a table is created.

use xtab_record::SplitOptions;

use crate::types::Affinity;

/// Header handling for a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Header is present unless column declarations were given.
    #[default]
    Auto,
    Present,
    Absent,
}

impl HeaderMode {
    /// Resolve the mode against whether columns were declared.
    pub fn resolved(self, has_declared_columns: bool) -> bool {
        match self {
            HeaderMode::Present => true,
            HeaderMode::Absent => false,
            HeaderMode::Auto => !has_declared_columns,
        }
    }
}

/// Where a scan's bytes come from: bound at creation time, or supplied as a
/// call argument on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceBinding {
    /// A path or glob pattern fixed when the table was created.
    Fixed(String),
    /// The path arrives with each call (`*_reader`, `*_records`).
    PerCall,
}

/// One column of a table's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub affinity: Affinity,
    /// Hidden columns carry call arguments (`_source`) and are excluded
    /// from `select *` expansion.
    pub hidden: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, affinity: Affinity) -> Self {
        ColumnSpec {
            name: name.into(),
            affinity,
            hidden: false,
        }
    }

    pub fn hidden(name: impl Into<String>) -> Self {
        ColumnSpec {
            name: name.into(),
            affinity: Affinity::None,
            hidden: true,
        }
    }
}

/// Validated configuration for one virtual table.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub table_name: String,
    pub source: SourceBinding,
    pub delimiter: u8,
    pub quote: u8,
    pub header: HeaderMode,
    /// Declared columns; empty means "infer from the header or synthesize
    /// `c1..cN`" for fixed-source tables.
    pub columns: Vec<ColumnSpec>,
}

impl TableDefinition {
    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            delimiter: self.delimiter,
            quote: self.quote,
        }
    }

    /// Whether a leading record is consumed as the header.
    pub fn has_header(&self) -> bool {
        self.header.resolved(!self.columns.is_empty())
    }
}
