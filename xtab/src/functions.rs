//! Scalar helper functions: one-shot field extraction and build metadata.

use xtab_record::{field_at, SplitOptions};
use xtab_result::{Error, Result};
use xtab_table::Value;

/// `*_field_at(text, index [, delimiter])`: split `text` as a single record
/// and return the field at the zero-based `index`, or NULL when the index
/// is out of range.
pub(crate) fn field_at_scalar(
    name: &str,
    bound_delimiter: Option<u8>,
    args: &[Value],
) -> Result<Value> {
    let record = args.first().and_then(Value::as_text).ok_or_else(|| {
        Error::InvalidArgumentError(format!(
            "'{name}' expects record text as its 1st argument"
        ))
    })?;
    let index = args
        .get(1)
        .and_then(Value::as_integer)
        .ok_or_else(|| {
            Error::InvalidArgumentError(format!(
                "'{name}' expects a field index as its 2nd argument"
            ))
        })
        .and_then(|index| {
            usize::try_from(index)
                .map_err(|_| Error::InvalidArgumentError(format!("'{index}' is not a valid index")))
        })?;
    let delimiter = match bound_delimiter {
        Some(delimiter) => delimiter,
        None => args
            .get(2)
            .and_then(Value::as_text)
            .and_then(|text| text.as_bytes().first().copied())
            .ok_or_else(|| {
                Error::MissingArgument(format!("'{name}' requires a delimiter argument"))
            })?,
    };

    let options = SplitOptions::with_delimiter(delimiter);
    Ok(field_at(record, index, &options)
        .map(Value::Text)
        .unwrap_or(Value::Null))
}

/// `xsv_version()`: `vMAJOR.MINOR.PATCH[-prerelease]`.
pub(crate) fn version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

/// `xsv_debug()`: exactly two lines of build metadata.
pub(crate) fn debug_info() -> String {
    format!(
        "Version: v{}\nSource: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("XTAB_SOURCE_ID").unwrap_or("unknown")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_at_extracts_and_nulls_out_of_range() {
        let args = [Value::from("a,b,c"), Value::from(1)];
        assert_eq!(
            field_at_scalar("csv_field_at", Some(b','), &args).unwrap(),
            Value::Text("b".into())
        );
        let args = [Value::from("a,b,c"), Value::from(9)];
        assert_eq!(
            field_at_scalar("csv_field_at", Some(b','), &args).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn generic_variant_requires_a_delimiter() {
        let args = [Value::from("a|b"), Value::from(1)];
        let err = field_at_scalar("xsv_field_at", None, &args).unwrap_err();
        assert!(matches!(err, Error::MissingArgument(_)));

        let args = [Value::from("a|b"), Value::from(1), Value::from("|")];
        assert_eq!(
            field_at_scalar("xsv_field_at", None, &args).unwrap(),
            Value::Text("b".into())
        );
    }

    #[test]
    fn negative_index_is_rejected() {
        let args = [Value::from("a,b"), Value::from(-1)];
        let err = field_at_scalar("csv_field_at", Some(b','), &args).unwrap_err();
        assert!(err.to_string().contains("not a valid index"));
    }

    #[test]
    fn version_and_debug_shapes() {
        assert!(version().starts_with('v'));
        assert_eq!(debug_info().lines().count(), 2);
    }
}
