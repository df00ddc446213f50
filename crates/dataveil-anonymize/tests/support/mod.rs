#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use dataveil_core::{
    ColumnMetadata, Driver, ExecutionError, ScalarValue, Statement, StatementKind, TableColumns,
};
use dataveil_anonymize::statement::KEY_PARAM;
use dataveil_db::{Database, KeyScan, KeyStream};

pub type Row = BTreeMap<String, ScalarValue>;

#[derive(Debug, Clone)]
pub struct MemoryTable {
    pub columns: TableColumns,
    pub primary_key: Option<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, MemoryTable>,
    executed: Vec<Statement>,
    fail_on: Option<Failure>,
    seen: BTreeMap<&'static str, usize>,
}

/// Fails the `nth` (1-based) statement of a kind.
#[derive(Debug, Clone, Copy)]
struct Failure {
    kind: StatementKind,
    nth: usize,
}

/// In-memory stand-in for a live database.
///
/// Understands the statements the anonymizer emits: `DELETE FROM t
/// [WHERE col = value]`, updates keyed by the primary-key parameter and
/// inserts built from the bound parameters.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn with_table(self, name: &str, table: MemoryTable) -> Self {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(name.to_string(), table);
        self
    }

    pub fn fail_on(&self, kind: StatementKind) {
        self.fail_on_nth(kind, 1);
    }

    pub fn fail_on_nth(&self, kind: StatementKind, nth: usize) {
        self.state.lock().unwrap().fail_on = Some(Failure { kind, nth });
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state.lock().unwrap().tables[table].rows.clone()
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.state.lock().unwrap().executed.clone()
    }
}

/// `guestbook(id integer pk, username varchar(20), content text, created date)`
/// holding two rows.
pub fn guestbook() -> MemoryTable {
    let row = |id: i64, username: &str, content: &str, created: &str| -> Row {
        BTreeMap::from([
            ("id".to_string(), ScalarValue::Int(id)),
            ("username".to_string(), ScalarValue::from(username)),
            ("content".to_string(), ScalarValue::from(content)),
            ("created".to_string(), ScalarValue::from(created)),
        ])
    };
    MemoryTable {
        columns: TableColumns::new(vec![
            ColumnMetadata::new("id", "integer"),
            ColumnMetadata::new("username", "string").with_max_length(20),
            ColumnMetadata::new("content", "text"),
            ColumnMetadata::new("created", "date"),
        ]),
        primary_key: Some("id".to_string()),
        rows: vec![
            row(1, "joe", "hello", "2020-01-01"),
            row(2, "nancy", "world", "2021-06-30"),
        ],
    }
}

fn lookup<'s>(state: &'s State, table: &str) -> Result<&'s MemoryTable, ExecutionError> {
    state
        .tables
        .get(table)
        .ok_or_else(|| ExecutionError::Db(format!("relation \"{table}\" does not exist")))
}

fn target_table(sql: &str) -> Option<&str> {
    let mut words = sql.split_whitespace();
    match words.next()? {
        "DELETE" | "INSERT" => words.nth(1),
        "UPDATE" => words.next(),
        _ => None,
    }
}

fn parse_literal(raw: &str) -> ScalarValue {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(number) => ScalarValue::Int(number),
        Err(_) => ScalarValue::from(raw.trim_matches('\'')),
    }
}

/// Column names of an update's SET list or an insert's column list, in the
/// order their `p0`, `p1`, ... placeholders were assigned.
fn target_columns(sql: &str, kind: StatementKind) -> Vec<String> {
    let list = match kind {
        StatementKind::Update => sql
            .split_once(" SET ")
            .and_then(|(_, rest)| rest.rsplit_once(" WHERE "))
            .map(|(assignments, _)| assignments),
        StatementKind::Insert => sql
            .split_once(" (")
            .and_then(|(_, rest)| rest.split_once(") VALUES"))
            .map(|(names, _)| names),
        StatementKind::Delete => None,
    };
    list.map(|list| {
        list.split(", ")
            .map(|item| item.split(" = ").next().unwrap_or(item).trim().to_string())
            .collect()
    })
    .unwrap_or_default()
}

fn column_values(statement: &Statement) -> Vec<(String, ScalarValue)> {
    let columns = target_columns(statement.sql(), statement.kind());
    columns
        .into_iter()
        .enumerate()
        .filter_map(|(index, column)| {
            statement
                .param(&format!("p{index}"))
                .map(|value| (column, value.clone()))
        })
        .collect()
}

fn loosely_equal(left: &ScalarValue, right: &ScalarValue) -> bool {
    left.render() == right.render()
}

#[async_trait]
impl Database for MemoryDatabase {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    async fn table_exists(&self, table: &str) -> Result<bool, ExecutionError> {
        Ok(self.state.lock().unwrap().tables.contains_key(table))
    }

    async fn primary_key(&self, table: &str) -> Result<ColumnMetadata, ExecutionError> {
        let state = self.state.lock().unwrap();
        let table_def = lookup(&state, table)?;
        table_def
            .primary_key
            .as_deref()
            .and_then(|pk| table_def.columns.get(pk))
            .cloned()
            .ok_or_else(|| ExecutionError::MissingPrimaryKey(table.to_string()))
    }

    async fn columns(&self, table: &str) -> Result<TableColumns, ExecutionError> {
        let state = self.state.lock().unwrap();
        Ok(lookup(&state, table)?.columns.clone())
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, ExecutionError> {
        let mut state = self.state.lock().unwrap();
        let kind = statement.kind();
        let seen = {
            let counter = state.seen.entry(kind.as_str()).or_default();
            *counter += 1;
            *counter
        };
        if let Some(failure) = state.fail_on {
            if failure.kind == kind && failure.nth == seen {
                return Err(ExecutionError::Db("simulated failure".to_string()));
            }
        }
        state.executed.push(statement.clone());

        let sql = statement.sql();
        let name = target_table(sql)
            .ok_or_else(|| ExecutionError::Db(format!("cannot parse: {sql}")))?
            .to_string();
        let table = state
            .tables
            .get_mut(&name)
            .ok_or_else(|| ExecutionError::Db(format!("relation \"{name}\" does not exist")))?;

        match statement.kind() {
            StatementKind::Delete => {
                let before = table.rows.len();
                match sql.split_once(" WHERE ") {
                    None => table.rows.clear(),
                    Some((_, predicate)) => {
                        let (column, value) = predicate
                            .split_once('=')
                            .ok_or_else(|| ExecutionError::Db("unsupported predicate".into()))?;
                        let column = column.trim();
                        let value = parse_literal(value);
                        table.rows.retain(|row| {
                            !row.get(column).is_some_and(|v| loosely_equal(v, &value))
                        });
                    }
                }
                Ok((before - table.rows.len()) as u64)
            }
            StatementKind::Update => {
                let pk = table.primary_key.clone().unwrap_or_default();
                let key = statement
                    .param(KEY_PARAM)
                    .cloned()
                    .ok_or_else(|| ExecutionError::Db("missing key parameter".into()))?;
                let values = column_values(statement);
                let mut affected = 0;
                for row in table
                    .rows
                    .iter_mut()
                    .filter(|row| row.get(&pk).is_some_and(|v| loosely_equal(v, &key)))
                {
                    for (column, value) in &values {
                        row.insert(column.clone(), value.clone());
                    }
                    affected += 1;
                }
                Ok(affected)
            }
            StatementKind::Insert => {
                let next_id = table
                    .rows
                    .iter()
                    .filter_map(|row| row.get("id").and_then(ScalarValue::as_i64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                let mut row: Row = column_values(statement).into_iter().collect();
                row.entry("id".to_string())
                    .or_insert(ScalarValue::Int(next_id));
                table.rows.push(row);
                Ok(1)
            }
        }
    }

    fn key_scan(&self, table: &str, primary_key: &ColumnMetadata) -> KeyScan {
        KeyScan {
            table: table.to_string(),
            column: primary_key.name.clone(),
            sql: format!(
                "SELECT {key} FROM {table} ORDER BY {key}",
                key = primary_key.name
            ),
        }
    }

    fn stream_keys<'a>(&'a self, scan: &'a KeyScan) -> KeyStream<'a> {
        let state = self.state.lock().unwrap();
        let mut keys: Vec<ScalarValue> = state
            .tables
            .get(&scan.table)
            .map(|table| {
                table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(&scan.column).cloned())
                    .collect()
            })
            .unwrap_or_default();
        keys.sort_by_key(|key| key.as_i64().unwrap_or_default());
        futures::stream::iter(keys.into_iter().map(Ok)).boxed()
    }
}
