/// Options that control how a database connection resolves tables.
#[derive(Debug, Clone, Default)]
pub struct DbOptions {
    /// Schema searched by metadata lookups. `None` means the connection's
    /// `current_schema()`. Statements resolve through the `search_path`.
    pub schema: Option<String>,
}

impl DbOptions {
    pub fn with_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
        }
    }
}
