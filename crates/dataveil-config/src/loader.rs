use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::{ConfigError, Result, ValidationIssue};
use crate::model::AnonymizerConfig;
use crate::schema::config_json_schema_value;
use crate::validate::{validate_config, validate_config_json};

/// On-disk configuration syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension; anything but `.json` is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Parsed configuration with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: AnonymizerConfig,
    pub warnings: Vec<ValidationIssue>,
}

/// Read, structurally validate and parse a configuration file.
pub fn load_config(path: &Path) -> Result<ValidatedConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, ConfigFormat::from_path(path))
}

/// Parse configuration text, rejecting documents that violate the schema or
/// the semantic rules.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<ValidatedConfig> {
    let document: Value = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };

    let schema = config_json_schema_value()?;
    let structural = validate_config_json(&document, &schema)?;
    if !structural.is_ok() {
        return Err(ConfigError::Invalid(structural));
    }

    let config: AnonymizerConfig = serde_json::from_value(document)?;
    let report = validate_config(&config);
    if !report.is_ok() {
        return Err(ConfigError::Invalid(report));
    }

    Ok(ValidatedConfig {
        config,
        warnings: report.warnings,
    })
}
