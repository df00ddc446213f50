use thiserror::Error;

use crate::statement::StatementKind;

/// Declarative problems, discoverable from the configuration and the schema
/// shape alone. Always fatal to the current entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("No entities found. Have you loaded a configuration file?")]
    NotLoaded,
    #[error("No configuration for that entity ({0})")]
    UnknownEntity(String),
    #[error("Col {column} does not exist in {entity}")]
    UnknownColumn { entity: String, column: String },
    #[error("generator methods must produce scalar output: '{method}' forbidden (column {column})")]
    NonScalarOutput { method: String, column: String },
    #[error("unknown generator method '{method}' (column {column})")]
    UnknownMethod { method: String, column: String },
    #[error("invalid params for generator '{method}' (column {column}): {message}")]
    InvalidParams {
        method: String,
        column: String,
        message: String,
    },
    #[error("primary key {column} of {entity} cannot be anonymized by an update")]
    PrimaryKeyUpdate { entity: String, column: String },
    #[error("generator error: {0}")]
    Generator(String),
}

/// Runtime problems tied to the live schema or to statement execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Table {0} does not exist")]
    TableNotFound(String),
    #[error("Can't find a primary key for '{0}'")]
    MissingPrimaryKey(String),
    #[error("Query {kind} Error on {entity} ({message})")]
    Statement {
        kind: StatementKind,
        entity: String,
        message: String,
    },
    #[error("database error: {0}")]
    Db(String),
}

/// Error returned by an entity pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, Error::Execution(_))
    }
}

/// Convenience alias for results returned by Dataveil crates.
pub type Result<T> = std::result::Result<T, Error>;
