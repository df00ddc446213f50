use futures::StreamExt;
use sqlx::{PgPool, Row};

use dataveil_core::{
    ColumnMetadata, Driver, ExecutionError, ScalarValue, Statement, TableColumns,
};

use crate::adapter::{Database, KeyScan, KeyStream};
use crate::options::DbOptions;

mod mapper;
mod queries;

pub use mapper::storage_type;

/// PostgreSQL implementation of [`Database`] over a `sqlx` pool.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    options: DbOptions,
}

impl PostgresDatabase {
    /// Create a database handle using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self::with_options(pool, DbOptions::default())
    }

    pub fn with_options(pool: PgPool, options: DbOptions) -> Self {
        Self { pool, options }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn schema(&self) -> Option<&str> {
        self.options.schema.as_deref()
    }
}

#[async_trait::async_trait]
impl Database for PostgresDatabase {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    async fn table_exists(&self, table: &str) -> Result<bool, ExecutionError> {
        queries::table_exists(&self.pool, self.schema(), table).await
    }

    async fn primary_key(&self, table: &str) -> Result<ColumnMetadata, ExecutionError> {
        let key_columns = queries::primary_key_columns(&self.pool, self.schema(), table).await?;
        let Some(first) = key_columns.first() else {
            return Err(ExecutionError::MissingPrimaryKey(table.to_string()));
        };
        if key_columns.len() > 1 {
            tracing::debug!(
                table,
                key = first.as_str(),
                columns = key_columns.len(),
                "composite primary key, scanning first column"
            );
        }

        let columns = self.columns(table).await?;
        columns
            .get(first)
            .cloned()
            .ok_or_else(|| ExecutionError::MissingPrimaryKey(table.to_string()))
    }

    async fn columns(&self, table: &str) -> Result<TableColumns, ExecutionError> {
        let raw = queries::list_columns(&self.pool, self.schema(), table).await?;
        Ok(mapper::map_columns(raw))
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, ExecutionError> {
        let (sql, values) = statement.to_positional(|position| format!("${position}"));
        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                ScalarValue::Bool(flag) => query.bind(*flag),
                ScalarValue::Int(number) => query.bind(*number),
                ScalarValue::Float(number) => query.bind(*number),
                ScalarValue::Text(text) => query.bind(text.as_str()),
            };
        }

        let done = query
            .execute(&self.pool)
            .await
            .map_err(|err| ExecutionError::Db(err.to_string()))?;
        Ok(done.rows_affected())
    }

    fn key_scan(&self, table: &str, primary_key: &ColumnMetadata) -> KeyScan {
        let target = if mapper::is_integer_type(&primary_key.storage_type) {
            "bigint"
        } else {
            "text"
        };
        KeyScan {
            table: table.to_string(),
            column: primary_key.name.clone(),
            sql: format!(
                "SELECT {key}::{target} FROM {table} ORDER BY {key}",
                key = quote_identifier(&primary_key.name)
            ),
        }
    }

    fn stream_keys<'a>(&'a self, scan: &'a KeyScan) -> KeyStream<'a> {
        sqlx::query(&scan.sql)
            .fetch(&self.pool)
            .map(|row| {
                let row = row.map_err(|err| ExecutionError::Db(err.to_string()))?;
                decode_key(&row)
            })
            .boxed()
    }
}

fn quote_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_lowercase() || first == '_')
        && name
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

fn decode_key(row: &sqlx::postgres::PgRow) -> Result<ScalarValue, ExecutionError> {
    if let Ok(number) = row.try_get::<i64, _>(0) {
        return Ok(ScalarValue::Int(number));
    }
    row.try_get::<String, _>(0)
        .map(ScalarValue::Text)
        .map_err(|err| ExecutionError::Db(err.to_string()))
}
