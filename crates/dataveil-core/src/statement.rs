use std::fmt;

use crate::value::ScalarValue;

/// Kind of SQL statement, used in error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Delete,
    Update,
    Insert,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Delete => "DELETE",
            StatementKind::Update => "UPDATE",
            StatementKind::Insert => "INSERT",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL text with `:name` placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    sql: String,
    params: Vec<(String, ScalarValue)>,
}

impl Statement {
    pub fn new(kind: StatementKind, sql: impl Into<String>) -> Self {
        Self {
            kind,
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Binds `value` to `:name`. Binding the same name twice keeps the last value.
    pub fn bind(mut self, name: impl Into<String>, value: ScalarValue) -> Self {
        let name = name.into();
        match self.params.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[(String, ScalarValue)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ScalarValue> {
        self.params
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Renders the statement with every bound placeholder replaced by a quoted
    /// literal. Meant for inspection only, never for execution.
    pub fn to_raw_sql(&self) -> String {
        rewrite_placeholders(&self.sql, |name| {
            self.param(name).map(ScalarValue::to_sql_literal)
        })
    }

    /// Rewrites bound placeholders into a driver's positional syntax.
    ///
    /// `placeholder` receives the 1-based position. A name used more than once
    /// keeps a single position. Returns the SQL and the values in bind order.
    pub fn to_positional<F>(&self, placeholder: F) -> (String, Vec<&ScalarValue>)
    where
        F: Fn(usize) -> String,
    {
        let mut order: Vec<&str> = Vec::new();
        let sql = rewrite_placeholders(&self.sql, |name| {
            let (bound_name, _) = self.params.iter().find(|(existing, _)| existing == name)?;
            let position = match order.iter().position(|seen| *seen == bound_name.as_str()) {
                Some(index) => index + 1,
                None => {
                    order.push(bound_name.as_str());
                    order.len()
                }
            };
            Some(placeholder(position))
        });

        let values = order
            .iter()
            .filter_map(|name| self.param(name))
            .collect();
        (sql, values)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Walks `sql`, handing every `:identifier` outside string literals to
/// `replace`. Unknown names and `::` casts are left untouched.
fn rewrite_placeholders<'s, F>(sql: &'s str, mut replace: F) -> String
where
    F: FnMut(&'s str) -> Option<String>,
{
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();
    let mut in_literal = false;

    while let Some((idx, ch)) = chars.next() {
        if in_literal {
            out.push(ch);
            if ch == '\'' {
                in_literal = false;
            }
            continue;
        }

        match ch {
            '\'' => {
                in_literal = true;
                out.push(ch);
            }
            ':' if matches!(chars.peek(), Some((_, ':'))) => {
                chars.next();
                out.push_str("::");
            }
            ':' => {
                let start = idx + 1;
                let mut end = start;
                while let Some(&(next_idx, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        end = next_idx + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }

                let name = &sql[start..end];
                if name.is_empty() {
                    out.push(':');
                } else if let Some(replacement) = replace(name) {
                    out.push_str(&replacement);
                } else {
                    out.push(':');
                    out.push_str(name);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}
