//! Core contracts shared by the Dataveil crates.
//!
//! Defines the error kinds surfaced by the anonymization engine, the live
//! column metadata it works against, scalar values and the named-parameter
//! statements it emits.

pub mod error;
pub mod redaction;
pub mod schema;
pub mod statement;
pub mod value;

pub use error::{ConfigurationError, Error, ExecutionError, Result};
pub use redaction::redact_connection_string;
pub use schema::{ColumnMetadata, Driver, TableColumns};
pub use statement::{Statement, StatementKind};
pub use value::ScalarValue;
