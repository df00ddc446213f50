use async_trait::async_trait;
use futures::stream::BoxStream;

use dataveil_core::{ColumnMetadata, Driver, ExecutionError, ScalarValue, Statement, TableColumns};

/// Forward-only stream of primary-key values. Dropping it releases the cursor.
pub type KeyStream<'a> = BoxStream<'a, Result<ScalarValue, ExecutionError>>;

/// A prepared primary-key scan for one table, ordered by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScan {
    pub table: String,
    pub column: String,
    pub sql: String,
}

/// Schema and execution capability used by the anonymizer.
///
/// Every lookup hits the live schema; implementations must not cache
/// metadata between calls.
#[async_trait]
pub trait Database: Send + Sync {
    fn driver(&self) -> Driver;

    async fn table_exists(&self, table: &str) -> Result<bool, ExecutionError>;

    /// First column of the table's primary key.
    async fn primary_key(&self, table: &str) -> Result<ColumnMetadata, ExecutionError>;

    /// Columns in declaration order.
    async fn columns(&self, table: &str) -> Result<TableColumns, ExecutionError>;

    /// Runs a statement and returns the affected row count.
    async fn execute(&self, statement: &Statement) -> Result<u64, ExecutionError>;

    fn key_scan(&self, table: &str, primary_key: &ColumnMetadata) -> KeyScan;

    fn stream_keys<'a>(&'a self, scan: &'a KeyScan) -> KeyStream<'a>;
}
