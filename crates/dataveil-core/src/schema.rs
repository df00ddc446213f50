use serde::{Deserialize, Serialize};

/// Database family behind a connection.
///
/// Only used where SQL dialects disagree, such as integer casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    Postgres,
    MySql,
}

impl Driver {
    pub fn as_str(self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
        }
    }

    /// MySQL and MariaDB share `SIGNED` / `UNSIGNED` cast targets.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, Driver::MySql)
    }
}

/// Live metadata for one physical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Declared maximum length in characters, when the type has one.
    pub max_length: Option<usize>,
    /// Driver-neutral lower-case type name (`string`, `integer`, `date`, ...).
    pub storage_type: String,
    /// Type name as the server reports it (`uuid`, `jsonb`, ...), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_type: Option<String>,
    pub is_unsigned: bool,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, storage_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_length: None,
            storage_type: storage_type.into(),
            native_type: None,
            is_unsigned: false,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_native_type(mut self, native_type: impl Into<String>) -> Self {
        self.native_type = Some(native_type.into());
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.is_unsigned = true;
        self
    }
}

/// Columns of one table, in physical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumns {
    columns: Vec<ColumnMetadata>,
}

impl TableColumns {
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<ColumnMetadata> for TableColumns {
    fn from_iter<T: IntoIterator<Item = ColumnMetadata>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
