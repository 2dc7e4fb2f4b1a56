use std::io;

use thiserror::Error;

/// Unified error type for all xtab operations.
///
/// Every fatal failure in the engine surfaces as one of these variants. The
/// host query layer renders them with `Display` and aborts the statement;
/// rows already yielded before the failure stand.
///
/// Non-fatal conditions (numeric coercion failures, out-of-range `field_at`
/// indexes, provenance lookups for unknown rowids) never reach this type —
/// they resolve to NULL values instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    ///
    /// Wraps standard library I/O errors raised while opening or reading a
    /// source file, including decompression-stream failures. Transient I/O
    /// failures are not retried; they propagate to the caller as-is.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid table configuration or API parameter.
    ///
    /// Covers malformed `key=value` arguments (unknown keys, empty values,
    /// unquoted strings where a quoted string is required), bad column
    /// declarations, and invalid scalar-function parameters. The message
    /// states what was invalid and, where it helps, how to fix it.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// An explicitly named source file does not exist.
    #[error("filename '{0}' does not exist")]
    SourceNotFound(String),

    /// A glob pattern expanded to zero files.
    ///
    /// An empty scan is almost always a misconfigured pattern, so this is a
    /// hard error rather than an empty result set.
    #[error("glob pattern '{0}' matched no files")]
    GlobNoMatch(String),

    /// A glob pattern failed to parse.
    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Malformed document content.
    ///
    /// Raised for invalid UTF-8 anywhere in a document and for a quoted
    /// field left unterminated at end of stream. The message names the line
    /// the offending record starts on.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Record arity mismatch.
    ///
    /// Once the first record of a scan establishes the document's field
    /// count, every later record must match it exactly. Mismatches are fatal,
    /// never silently padded or truncated.
    #[error("expected {expected} fields at {path}:{line}, got {actual}")]
    FieldCount {
        expected: usize,
        actual: usize,
        path: String,
        line: u64,
    },

    /// A table-valued function was called without a resolvable source path.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// The scan was cancelled through its interrupt flag.
    ///
    /// Checked at each row boundary, so a cancelled host query stops after
    /// at most one more record instead of draining the whole file.
    #[error("scan interrupted")]
    Interrupted,

    /// Internal error indicating a bug or unexpected state.
    ///
    /// This should never occur during normal operation. The message includes
    /// details about which invariant was violated.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}
