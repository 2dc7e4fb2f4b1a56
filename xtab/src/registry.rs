//! The module/function registry: the engine's single entry point.
//!
//! Binds the externally visible names (`csv`, `tsv_reader`,
//! `xsv_records`, `csv_field_at`, ...) to the table layer, dispatching
//! each family's pre-bound delimiter. Hosts create tables through the
//! engine and call scalar functions by name; provenance functions take the
//! table identity the host binding is scoped to, because their lookups are
//! keyed by (table identity, rowid).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use xtab_result::{Error, Result};
use xtab_source::Source;
use xtab_table::{
    args::parse_arguments, ProvenanceRegistry, ReaderTable, RecordsTable, SourceBinding, Table,
    TableDefinition, TableId, Value,
};

use crate::functions;

/// Which call shape a module name binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleForm {
    /// Fixed-source module table (`csv`, `tsv`, `xsv`).
    Table,
    /// Per-call-source reader (`*_reader`).
    Reader,
    /// Raw-record form (`*_records`).
    Records,
}

#[derive(Debug, Clone, Copy)]
struct ModuleBinding {
    form: ModuleForm,
    delimiter: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarBinding {
    FieldAt { delimiter: Option<u8> },
    LineNumber,
    Path,
    Version,
    Debug,
}

/// The engine: one registry of modules and functions plus the shared
/// provenance side channel. Table identities are allocated here, so two
/// engines never confuse each other's provenance entries.
pub struct Engine {
    provenance: Arc<ProvenanceRegistry>,
    next_table_id: AtomicU64,
    modules: FxHashMap<&'static str, ModuleBinding>,
    scalars: FxHashMap<&'static str, ScalarBinding>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Engine {
        let comma = Some(b',');
        let tab = Some(b'\t');

        let mut modules = FxHashMap::default();
        for (name, form, delimiter) in [
            ("csv", ModuleForm::Table, comma),
            ("tsv", ModuleForm::Table, tab),
            ("xsv", ModuleForm::Table, None),
            ("csv_reader", ModuleForm::Reader, comma),
            ("tsv_reader", ModuleForm::Reader, tab),
            ("xsv_reader", ModuleForm::Reader, None),
            ("csv_records", ModuleForm::Records, comma),
            ("tsv_records", ModuleForm::Records, tab),
            ("xsv_records", ModuleForm::Records, None),
        ] {
            modules.insert(name, ModuleBinding { form, delimiter });
        }

        let mut scalars = FxHashMap::default();
        for (name, binding) in [
            ("csv_field_at", ScalarBinding::FieldAt { delimiter: comma }),
            ("tsv_field_at", ScalarBinding::FieldAt { delimiter: tab }),
            ("xsv_field_at", ScalarBinding::FieldAt { delimiter: None }),
            ("csv_line_number", ScalarBinding::LineNumber),
            ("tsv_line_number", ScalarBinding::LineNumber),
            ("xsv_line_number", ScalarBinding::LineNumber),
            ("csv_path", ScalarBinding::Path),
            ("tsv_path", ScalarBinding::Path),
            ("xsv_path", ScalarBinding::Path),
            ("xsv_version", ScalarBinding::Version),
            ("xsv_debug", ScalarBinding::Debug),
        ] {
            scalars.insert(name, binding);
        }

        Engine {
            provenance: Arc::new(ProvenanceRegistry::new()),
            next_table_id: AtomicU64::new(1),
            modules,
            scalars,
        }
    }

    /// The provenance registry shared by every table of this engine.
    pub fn provenance(&self) -> &Arc<ProvenanceRegistry> {
        &self.provenance
    }

    /// Which form a module name binds to, if it is registered.
    pub fn module_form(&self, module: &str) -> Option<ModuleForm> {
        self.modules.get(module).map(|binding| binding.form)
    }

    /// Registered scalar function names.
    pub fn scalar_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.scalars.keys().copied()
    }

    /// Create a fixed-source module table (`csv`, `tsv`, `xsv`).
    ///
    /// `args` are the raw creation arguments: `key=value` pairs plus
    /// optional column declarations. When no `filename` is given the table
    /// name itself is tried as a path (inferred-name mode).
    pub fn create_table(&self, module: &str, table_name: &str, args: &[&str]) -> Result<Table> {
        let binding = self.module(module, ModuleForm::Table)?;
        let parsed = parse_arguments(args, binding.delimiter)?;
        let delimiter = parsed.delimiter.or(binding.delimiter).ok_or_else(|| {
            Error::InvalidArgumentError(
                "no delimiter given. Specify a delimiter to use with 'delimiter=\"\\t\"'"
                    .to_owned(),
            )
        })?;

        let (spec, source) = match parsed.filename {
            Some(filename) => {
                let source = Source::resolve(&filename)?;
                (filename, source)
            }
            None => match Source::resolve(table_name) {
                Ok(source) => (table_name.to_owned(), source),
                Err(_) => {
                    return Err(Error::InvalidArgumentError(
                        "no filename given. Specify a path to a CSV file to read from with \
                         'filename=\"path.csv\"'"
                            .to_owned(),
                    ));
                }
            },
        };
        tracing::debug!(table = table_name, files = source.len(), "resolved table source");

        let definition = TableDefinition {
            table_name: table_name.to_owned(),
            source: SourceBinding::Fixed(spec),
            delimiter,
            quote: parsed.quote.unwrap_or(b'"'),
            header: parsed.header,
            columns: parsed.columns,
        };
        Table::create(
            self.allocate_table_id(),
            definition,
            source,
            Arc::clone(&self.provenance),
        )
    }

    /// Create a per-call-source reader table (`*_reader`).
    pub fn create_reader(
        &self,
        module: &str,
        table_name: &str,
        args: &[&str],
    ) -> Result<ReaderTable> {
        let binding = self.module(module, ModuleForm::Reader)?;
        let definition = self.per_call_definition(module, table_name, args, binding)?;
        ReaderTable::create(
            self.allocate_table_id(),
            definition,
            Arc::clone(&self.provenance),
        )
    }

    /// Create a raw-record table (`*_records`).
    pub fn create_records(
        &self,
        module: &str,
        table_name: &str,
        args: &[&str],
    ) -> Result<RecordsTable> {
        let binding = self.module(module, ModuleForm::Records)?;
        let definition = self.per_call_definition(module, table_name, args, binding)?;
        RecordsTable::create(
            self.allocate_table_id(),
            definition,
            Arc::clone(&self.provenance),
        )
    }

    /// Call a stateless scalar function by name.
    ///
    /// `*_line_number` and `*_path` need a table scan context; use
    /// [`Engine::call_table_scalar`] for those.
    pub fn call_scalar(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.scalar(name)? {
            ScalarBinding::FieldAt { delimiter } => {
                functions::field_at_scalar(name, delimiter, args)
            }
            ScalarBinding::Version => Ok(Value::Text(functions::version())),
            ScalarBinding::Debug => Ok(Value::Text(functions::debug_info())),
            ScalarBinding::LineNumber | ScalarBinding::Path => {
                Err(Error::InvalidArgumentError(format!(
                    "'{name}' requires a table scan context"
                )))
            }
        }
    }

    /// Call a scalar function scoped to one table's rowid space.
    ///
    /// Provenance lookups for rowids nothing recorded resolve to NULL.
    pub fn call_table_scalar(&self, name: &str, table: TableId, args: &[Value]) -> Result<Value> {
        match self.scalar(name)? {
            ScalarBinding::LineNumber => {
                let rowid = rowid_argument(name, args)?;
                Ok(self
                    .provenance
                    .line_number(table, rowid)
                    .map(|line| Value::Integer(line as i64))
                    .unwrap_or(Value::Null))
            }
            ScalarBinding::Path => {
                let rowid = rowid_argument(name, args)?;
                Ok(self
                    .provenance
                    .path(table, rowid)
                    .map(|path| Value::Text(path.to_string()))
                    .unwrap_or(Value::Null))
            }
            _ => self.call_scalar(name, args),
        }
    }

    fn per_call_definition(
        &self,
        module: &str,
        table_name: &str,
        args: &[&str],
        binding: ModuleBinding,
    ) -> Result<TableDefinition> {
        let parsed = parse_arguments(args, binding.delimiter)?;
        if parsed.filename.is_some() {
            return Err(Error::InvalidArgumentError(format!(
                "'{module}' takes its source path per call, not a 'filename' argument"
            )));
        }
        let delimiter = parsed.delimiter.or(binding.delimiter).ok_or_else(|| {
            Error::InvalidArgumentError(
                "no delimiter given. Specify a delimiter to use with 'delimiter=\"\\t\"'"
                    .to_owned(),
            )
        })?;
        Ok(TableDefinition {
            table_name: table_name.to_owned(),
            source: SourceBinding::PerCall,
            delimiter,
            quote: parsed.quote.unwrap_or(b'"'),
            header: parsed.header,
            columns: parsed.columns,
        })
    }

    fn module(&self, name: &str, form: ModuleForm) -> Result<ModuleBinding> {
        let binding = self
            .modules
            .get(name)
            .copied()
            .ok_or_else(|| Error::InvalidArgumentError(format!("'{name}' is not a known module")))?;
        if binding.form != form {
            return Err(Error::InvalidArgumentError(format!(
                "'{name}' cannot be created with this form"
            )));
        }
        Ok(binding)
    }

    fn scalar(&self, name: &str) -> Result<ScalarBinding> {
        self.scalars
            .get(name)
            .copied()
            .ok_or_else(|| Error::InvalidArgumentError(format!("'{name}' is not a known function")))
    }

    fn allocate_table_id(&self) -> TableId {
        self.next_table_id.fetch_add(1, Ordering::Relaxed)
    }
}

fn rowid_argument(name: &str, args: &[Value]) -> Result<i64> {
    args.first().and_then(Value::as_integer).ok_or_else(|| {
        Error::InvalidArgumentError(format!("'{name}' expects a rowid as its argument"))
    })
}
