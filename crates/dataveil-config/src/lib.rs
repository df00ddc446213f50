//! Configuration contracts for Dataveil: the per-entity anonymization policy,
//! its JSON Schema, loading from TOML or JSON, and validation.

pub mod errors;
pub mod loader;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{ConfigError, IssueSeverity, Result, ValidationIssue, ValidationReport};
pub use loader::{ConfigFormat, ValidatedConfig, load_config, parse_config};
pub use model::{
    AnonymizerConfig, ColumnGeneratorSpec, DEFAULT_LANGUAGE, EntityAction, EntityConfig,
    OrderedMap,
};
pub use schema::{config_json_schema, config_json_schema_value};
pub use validate::{validate_config, validate_config_json, validate_methods};
