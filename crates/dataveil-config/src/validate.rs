use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{ConfigError, ValidationIssue, ValidationReport};
use crate::model::{AnonymizerConfig, EntityAction, EntityConfig};

/// Validate a configuration document against the configuration JSON Schema.
pub fn validate_config_json(
    config_json: &Value,
    config_schema: &Value,
) -> Result<ValidationReport, ConfigError> {
    let compiled =
        JSONSchema::compile(config_schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Semantic checks that the JSON Schema cannot express.
pub fn validate_config(config: &AnonymizerConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.entities.is_empty() {
        report.push(ValidationIssue::warning(
            "no_entities",
            "/entities",
            "configuration declares no entities",
            Some("add an [entities.<table>] section".to_string()),
        ));
    }

    for (name, entity) in config.entities.iter() {
        validate_entity(name, entity, &mut report);
    }

    report
}

/// Flags generator methods that `is_known` does not recognize.
pub fn validate_methods<F>(config: &AnonymizerConfig, is_known: F) -> ValidationReport
where
    F: Fn(&str) -> bool,
{
    let mut report = ValidationReport::default();
    for (entity_name, entity) in config.entities.iter() {
        let Some(cols) = &entity.cols else {
            continue;
        };
        for (column, spec) in cols.iter() {
            if spec.method.trim().is_empty() || is_known(&spec.method) {
                continue;
            }
            report.push(ValidationIssue::error(
                "unknown_method",
                format!("/entities/{entity_name}/cols/{column}/method"),
                format!("unknown generator method '{}'", spec.method),
                Some("run `dataveil validate` to list supported methods".to_string()),
            ));
        }
    }
    report
}

fn validate_entity(name: &str, entity: &EntityConfig, report: &mut ValidationReport) {
    let path = format!("/entities/{name}");
    let has_columns = entity.cols.as_ref().is_some_and(|cols| !cols.is_empty());

    match entity.action {
        EntityAction::Update | EntityAction::Insert if !has_columns => {
            report.push(ValidationIssue::error(
                "action_without_columns",
                format!("{path}/action"),
                format!("entity '{name}' declares an action but no columns"),
                Some("declare at least one column under cols".to_string()),
            ));
        }
        EntityAction::None if has_columns => {
            report.push(ValidationIssue::warning(
                "columns_ignored",
                format!("{path}/cols"),
                format!("entity '{name}' declares columns but its action is none"),
                Some("set action to update or insert".to_string()),
            ));
        }
        _ => {}
    }

    if !entity.delete && !entity.delete_where.trim().is_empty() {
        report.push(ValidationIssue::warning(
            "delete_where_ignored",
            format!("{path}/delete_where"),
            format!("entity '{name}' has delete_where but delete is false"),
            Some("set delete = true to apply the condition".to_string()),
        ));
    }

    if let Some(cols) = &entity.cols {
        for (column, spec) in cols.iter() {
            if spec.method.trim().is_empty() {
                report.push(ValidationIssue::error(
                    "empty_method",
                    format!("{path}/cols/{column}/method"),
                    format!("column '{column}' has an empty generator method"),
                    None,
                ));
            }
        }
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
