//! Common types for the table layer.

/// Identity of one virtual table within an engine.
pub type TableId = u64;

/// Row identifier type, as exposed to the host's `rowid`.
pub type RowId = i64;

/// Declared coercion target for a column.
///
/// Follows the usual SQL affinity substring rules: a declared type
/// containing `INT` is integer, `CHAR`/`CLOB`/`TEXT` is text,
/// `REAL`/`FLOA`/`DOUB` is real, anything else (including no declared type)
/// is none. Text and none both pass the raw field through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    Text,
    Integer,
    Real,
    #[default]
    None,
}

impl Affinity {
    /// Map a declared column type to its affinity.
    pub fn from_declared_type(declared: &str) -> Affinity {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            Affinity::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Affinity::Text
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Affinity::Real
        } else {
            Affinity::None
        }
    }
}

/// A single field value as handed to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Coerce a raw field toward `affinity`.
    ///
    /// Integer and real columns are best-effort: a field that does not parse
    /// resolves to `Null` rather than erroring.
    pub fn coerce(raw: &str, affinity: Affinity) -> Value {
        match affinity {
            Affinity::Text | Affinity::None => Value::Text(raw.to_owned()),
            Affinity::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or(Value::Null),
            Affinity::Real => raw
                .trim()
                .parse::<f64>()
                .map(Value::Real)
                .unwrap_or(Value::Null),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}
