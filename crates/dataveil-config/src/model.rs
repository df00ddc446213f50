use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Faker locale used when the configuration does not name one.
pub const DEFAULT_LANGUAGE: &str = "en_US";

/// Name-keyed map that iterates in declaration order.
pub type OrderedMap<V> = IndexMap<String, V>;

/// Top-level anonymization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AnonymizerConfig {
    /// Locale handed to the value generator (ex.: `en_US`).
    #[serde(default = "default_language")]
    pub language: String,
    /// Optional seed for reproducible fake data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Per-table policies, in declaration order.
    #[serde(default)]
    pub entities: OrderedMap<EntityConfig>,
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            seed: None,
            entities: OrderedMap::default(),
        }
    }
}

impl AnonymizerConfig {
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.get(name)
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// What to do with the rows of an entity besides deleting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityAction {
    #[default]
    None,
    /// Overwrite configured columns of every existing row.
    Update,
    /// Append synthetic rows.
    Insert,
}

/// Policy for one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EntityConfig {
    #[serde(default)]
    pub action: EntityAction,
    /// Delete rows before any update or insert.
    #[serde(default)]
    pub delete: bool,
    /// SQL predicate restricting the delete; empty deletes every row.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub delete_where: String,
    /// Generator per column, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<OrderedMap<ColumnGeneratorSpec>>,
}

impl EntityConfig {
    pub fn with_action(mut self, action: EntityAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_delete(mut self, delete_where: impl Into<String>) -> Self {
        self.delete = true;
        self.delete_where = delete_where.into();
        self
    }

    pub fn with_column(mut self, column: impl Into<String>, spec: ColumnGeneratorSpec) -> Self {
        self.cols
            .get_or_insert_with(OrderedMap::default)
            .insert(column.into(), spec);
        self
    }
}

/// Generator method plus its positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ColumnGeneratorSpec {
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
}

impl ColumnGeneratorSpec {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}
