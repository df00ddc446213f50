use std::borrow::Cow;

use dataveil_core::{ColumnMetadata, Driver, ScalarValue, Statement, StatementKind, TableColumns};

use crate::cast::{insert_value, key_value, update_assignment};
use crate::row::GeneratedRow;

/// Placeholder holding the primary-key value of an update. Column values use
/// `p0`, `p1`, ... so it can never clash with them.
pub const KEY_PARAM: &str = "pk";

/// `DELETE FROM entity [WHERE predicate]`.
pub fn delete_statement(entity: &str, delete_where: &str) -> Statement {
    let predicate = delete_where.trim();
    let sql = if predicate.is_empty() {
        format!("DELETE FROM {entity}")
    } else {
        format!("DELETE FROM {entity} WHERE {predicate}")
    };
    Statement::new(StatementKind::Delete, sql)
}

/// Rewrites the configured columns of the row identified by `key`.
pub fn update_statement(
    entity: &str,
    primary_key: &ColumnMetadata,
    key: ScalarValue,
    row: &GeneratedRow,
    columns: &TableColumns,
    driver: Driver,
) -> Statement {
    let mut assignments = Vec::with_capacity(row.len());
    let mut bindings = Vec::with_capacity(row.len() + 1);
    for (index, (name, value)) in row.iter().enumerate() {
        let param = param_name(index);
        let expr = match columns.get(name) {
            Some(column) => update_assignment(column, &param, driver),
            None => update_assignment(&ColumnMetadata::new(name.as_str(), ""), &param, driver),
        };
        assignments.push(format!("{} = {expr}", quote_column(name, driver)));
        bindings.push((param, value.clone()));
    }

    let sql = format!(
        "UPDATE {entity} SET {} WHERE {} = {}",
        assignments.join(", "),
        quote_column(&primary_key.name, driver),
        key_value(primary_key, KEY_PARAM, driver)
    );

    bindings.push((KEY_PARAM.to_string(), key));
    bind_all(Statement::new(StatementKind::Update, sql), bindings)
}

/// Appends one synthetic row.
pub fn insert_statement(
    entity: &str,
    row: &GeneratedRow,
    columns: &TableColumns,
    driver: Driver,
) -> Statement {
    let mut names = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    let mut bindings = Vec::with_capacity(row.len());
    for (index, (name, value)) in row.iter().enumerate() {
        let param = param_name(index);
        let expr = match columns.get(name) {
            Some(column) => insert_value(column, &param, driver),
            None => format!(":{param}"),
        };
        names.push(quote_column(name, driver));
        values.push(expr);
        bindings.push((param, value.clone()));
    }

    let sql = format!(
        "INSERT INTO {entity} ({}) VALUES ({})",
        names.join(", "),
        values.join(", ")
    );
    bind_all(Statement::new(StatementKind::Insert, sql), bindings)
}

/// Column name as it must appear in SQL: bare when it is a plain lower-case
/// identifier, quoted in the driver's style otherwise.
pub fn quote_column(name: &str, driver: Driver) -> Cow<'_, str> {
    if is_plain_identifier(name) {
        return Cow::Borrowed(name);
    }
    let quoted = match driver {
        Driver::Postgres => format!("\"{}\"", name.replace('"', "\"\"")),
        Driver::MySql => format!("`{}`", name.replace('`', "``")),
    };
    Cow::Owned(quoted)
}

fn bind_all(statement: Statement, bindings: Vec<(String, ScalarValue)>) -> Statement {
    bindings
        .into_iter()
        .fold(statement, |statement, (name, value)| statement.bind(name, value))
}

fn param_name(index: usize) -> String {
    format!("p{index}")
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_lowercase() || first == '_')
        && chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}
