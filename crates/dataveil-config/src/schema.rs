use schemars::schema::RootSchema;
use schemars::schema_for;
use serde_json::Value;

use crate::errors::Result;
use crate::model::AnonymizerConfig;

/// Emit the JSON Schema for configuration files.
pub fn config_json_schema() -> RootSchema {
    schema_for!(AnonymizerConfig)
}

/// The configuration JSON Schema as a JSON value, ready for validation.
pub fn config_json_schema_value() -> Result<Value> {
    Ok(serde_json::to_value(config_json_schema())?)
}
