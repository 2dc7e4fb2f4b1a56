//! Table-definition argument parsing.
//!
//! A table is configured with a list of raw argument strings: `key=value`
//! pairs (`filename`, `delimiter`, `quote`, `header`) and bare column
//! declarations (`id integer`, `"first name" text`). Anything containing an
//! `=` is a parameter; everything else is a column declaration.

use xtab_result::{Error, Result};

use crate::definition::{ColumnSpec, HeaderMode};
use crate::types::Affinity;

/// Parsed but not yet source-resolved table configuration.
#[derive(Debug, Default)]
pub struct ParsedArguments {
    pub filename: Option<String>,
    pub delimiter: Option<u8>,
    pub quote: Option<u8>,
    pub header: HeaderMode,
    pub columns: Vec<ColumnSpec>,
}

/// Parse the raw creation arguments of one table.
///
/// `bound_delimiter` is the module's pre-bound delimiter (`,` for `csv`,
/// tab for `tsv`); modules with a bound delimiter reject `delimiter=`
/// overrides.
pub fn parse_arguments(args: &[&str], bound_delimiter: Option<u8>) -> Result<ParsedArguments> {
    let mut parsed = ParsedArguments::default();
    for arg in args {
        match split_parameter(arg) {
            Some((key, value)) => match key.to_ascii_lowercase().as_str() {
                "filename" | "file" => {
                    parsed.filename = Some(quoted_value(key, value)?);
                }
                "delimiter" => {
                    parsed.delimiter = Some(parse_delimiter_value(value, bound_delimiter)?);
                }
                "quote" => {
                    parsed.quote = Some(parse_quote_value(value)?);
                }
                "header" => {
                    parsed.header = parse_header_value(value)?;
                }
                other => {
                    return Err(Error::InvalidArgumentError(format!(
                        "'{other}' is not a valid parameter key"
                    )));
                }
            },
            None => parsed.columns.push(parse_column_declaration(arg)?),
        }
    }
    Ok(parsed)
}

/// Split `key = value` arguments; anything without an `=` is a column
/// declaration.
fn split_parameter(arg: &str) -> Option<(&str, &str)> {
    let (key, value) = arg.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Strip matching single or double quotes from a parameter value.
///
/// Bare identifiers where a string is required are an error with guidance
/// to quote the value; empty values are always an error.
fn quoted_value(key: &str, value: &str) -> Result<String> {
    let inner = unquote(value).ok_or_else(|| {
        Error::InvalidArgumentError(format!(
            "'{key}' value must be a string, wrap in single or double quotes"
        ))
    })?;
    if inner.is_empty() {
        return Err(Error::InvalidArgumentError(format!(
            "'{key}' value cannot be empty"
        )));
    }
    Ok(inner.to_owned())
}

fn unquote(value: &str) -> Option<&str> {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[bytes.len() - 1] == bytes[0]
    {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

/// Parse `delimiter="|"`: a quoted single ASCII character, or the escaped
/// tab literal `'\t'`.
fn parse_delimiter_value(value: &str, bound_delimiter: Option<u8>) -> Result<u8> {
    if bound_delimiter.is_some() {
        return Err(Error::InvalidArgumentError(
            "cannot override delimiter in this virtual table".to_owned(),
        ));
    }
    parse_single_character("delimiter", value)
}

/// Parse `quote="'"`: a quoted single ASCII character.
fn parse_quote_value(value: &str) -> Result<u8> {
    parse_single_character("quote", value)
}

fn parse_single_character(key: &str, value: &str) -> Result<u8> {
    let inner = unquote(value).ok_or_else(|| {
        Error::InvalidArgumentError(format!(
            "'{key}' value must be a string, wrap in single or double quotes"
        ))
    })?;
    if inner == "\\t" {
        return Ok(b'\t');
    }
    let mut chars = inner.chars();
    let first = chars.next().ok_or_else(|| {
        Error::InvalidArgumentError(format!("{key} must have at least 1 character"))
    })?;
    if chars.next().is_some() {
        return Err(Error::InvalidArgumentError(format!(
            "{key} can only be 1 character long"
        )));
    }
    u8::try_from(first).map_err(|_| {
        Error::InvalidArgumentError(format!("{key} must be a single ASCII character"))
    })
}

/// Parse `header=yes|on|1|no|off|0`, case-insensitive, quoted or bare.
fn parse_header_value(value: &str) -> Result<HeaderMode> {
    let raw = unquote(value).unwrap_or(value);
    if raw.is_empty() {
        return Err(Error::InvalidArgumentError(
            "'header' value cannot be empty".to_owned(),
        ));
    }
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "on" | "1" => Ok(HeaderMode::Present),
        "no" | "off" | "0" => Ok(HeaderMode::Absent),
        other => Err(Error::InvalidArgumentError(format!(
            "'header' must be one of yes/no/on/off/1/0, got '{other}'"
        ))),
    }
}

/// Parse a column declaration: a name, optionally quoted, followed by an
/// optional declared type that maps to an affinity.
fn parse_column_declaration(arg: &str) -> Result<ColumnSpec> {
    let trimmed = arg.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgumentError(
            "empty column definition".to_owned(),
        ));
    }

    let (name, rest) = match trimmed.as_bytes()[0] {
        open @ (b'\'' | b'"') => {
            let inner = &trimmed[1..];
            let end = inner.find(open as char).ok_or_else(|| {
                Error::InvalidArgumentError(format!(
                    "unterminated quoted column name in '{trimmed}'"
                ))
            })?;
            (&inner[..end], inner[end + 1..].trim())
        }
        _ => match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        },
    };
    if name.is_empty() {
        return Err(Error::InvalidArgumentError(
            "empty column definition".to_owned(),
        ));
    }

    let affinity = if rest.is_empty() {
        Affinity::None
    } else {
        Affinity::from_declared_type(rest)
    };
    Ok(ColumnSpec::new(name, affinity))
}
