//! Error types and result definitions for the xtab delimited-text engine.
//!
//! This crate provides the unified error type ([`Error`]) and result type
//! alias ([`Result<T>`]) used throughout all xtab crates. All operations that
//! could fail return `Result<T>`, where the error variant carries enough
//! context to be surfaced verbatim to the calling query.
//!
//! # Error Philosophy
//!
//! xtab uses a single error enum rather than crate-specific error types.
//! This approach:
//! - Simplifies error handling across crate boundaries
//! - Allows errors to propagate naturally with the `?` operator
//! - Provides clear error messages for end users
//! - Enables structured error matching for programmatic handling
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`]): file access, read failures
//! - **User input errors** ([`Error::InvalidArgumentError`]): malformed table
//!   configuration, bad scalar-function parameters
//! - **Source resolution** ([`Error::SourceNotFound`], [`Error::GlobNoMatch`],
//!   [`Error::Pattern`]): paths and glob patterns that resolve to nothing
//! - **Data format errors** ([`Error::Encoding`], [`Error::FieldCount`]):
//!   malformed document content
//! - **Call-shape errors** ([`Error::MissingArgument`]): table-valued
//!   functions invoked without their required path
//! - **Cancellation** ([`Error::Interrupted`]): the host asked the scan to stop
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
