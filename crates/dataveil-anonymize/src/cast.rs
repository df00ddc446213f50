//! SQL wrapping needed to assign a bound scalar to a typed column.

use dataveil_core::{ColumnMetadata, Driver};

use crate::statement::quote_column;

/// Cast target for a column, or `None` when the raw parameter is assignable.
pub fn cast_for(column: &ColumnMetadata, driver: Driver) -> Option<&str> {
    match column.storage_type.to_ascii_lowercase().as_str() {
        "date" | "datetime" => Some("DATE"),
        "time" => Some("TIME"),
        "smallint" | "integer" | "bigint" if driver.is_mysql_family() => {
            Some(if column.is_unsigned { "UNSIGNED" } else { "SIGNED" })
        }
        "smallint" | "integer" | "bigint" => Some("INTEGER"),
        "float" | "decimal" => Some("DECIMAL"),
        _ => native_cast(column, driver),
    }
}

/// PostgreSQL refuses to assign or compare a text parameter against `uuid`,
/// `jsonb`, `bytea` and similar types; those are cast to the server's own
/// type name.
fn native_cast(column: &ColumnMetadata, driver: Driver) -> Option<&str> {
    match (driver, column.storage_type.as_str()) {
        (Driver::Postgres, "string" | "text") => None,
        (Driver::Postgres, _) => column.native_type.as_deref(),
        (Driver::MySql, _) => None,
    }
}

/// Right-hand side of `col = ...` in an update. NULL stays NULL.
pub fn update_assignment(column: &ColumnMetadata, param: &str, driver: Driver) -> String {
    let conditional = format!(
        "(CASE {} WHEN NULL THEN NULL ELSE :{param} END)",
        quote_column(&column.name, driver)
    );
    wrap(conditional, cast_for(column, driver))
}

/// Value expression for an insert.
pub fn insert_value(column: &ColumnMetadata, param: &str, driver: Driver) -> String {
    wrap(format!(":{param}"), cast_for(column, driver))
}

/// Value the primary key is matched against. Integer keys are bound as
/// integers; any other key arrives as text and needs the column's own type.
pub fn key_value(primary_key: &ColumnMetadata, param: &str, driver: Driver) -> String {
    let cast = match primary_key.storage_type.as_str() {
        "smallint" | "integer" | "bigint" => None,
        _ => native_cast(primary_key, driver),
    };
    wrap(format!(":{param}"), cast)
}

fn wrap(expr: String, cast: Option<&str>) -> String {
    match cast {
        Some(target) => format!("CAST({expr} AS {target})"),
        None => expr,
    }
}
