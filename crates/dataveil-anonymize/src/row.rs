use dataveil_config::{ColumnGeneratorSpec, OrderedMap};
use dataveil_core::{ConfigurationError, ScalarValue, TableColumns};
use dataveil_generate::{GenerationError, ValueGenerator};

/// One synthetic row: `(column, value)` pairs in configuration order.
pub type GeneratedRow = Vec<(String, ScalarValue)>;

/// Fails on the first configured column missing from the live schema.
pub fn check_columns(
    entity: &str,
    cols: &OrderedMap<ColumnGeneratorSpec>,
    columns: &TableColumns,
) -> Result<(), ConfigurationError> {
    match cols.keys().find(|column| !columns.contains(column)) {
        Some(column) => Err(ConfigurationError::UnknownColumn {
            entity: entity.to_string(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// Produces one row from the column generators.
///
/// Every value must be a scalar and is cut to the column's maximum length.
pub fn generate_row<G: ValueGenerator + ?Sized>(
    entity: &str,
    cols: &OrderedMap<ColumnGeneratorSpec>,
    columns: &TableColumns,
    generator: &mut G,
) -> Result<GeneratedRow, ConfigurationError> {
    let mut row = Vec::with_capacity(cols.len());
    for (name, spec) in cols.iter() {
        let column = columns
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownColumn {
                entity: entity.to_string(),
                column: name.to_string(),
            })?;

        let raw = generator
            .generate(&spec.method, &spec.params)
            .map_err(|err| generation_error(err, name))?;
        let value =
            ScalarValue::from_json(&raw).ok_or_else(|| ConfigurationError::NonScalarOutput {
                method: spec.method.clone(),
                column: name.to_string(),
            })?;

        let value = match column.max_length {
            Some(max_length) => value.truncated(max_length),
            None => value,
        };
        row.push((name.to_string(), value));
    }
    Ok(row)
}

fn generation_error(err: GenerationError, column: &str) -> ConfigurationError {
    match err {
        GenerationError::UnknownMethod(method) => ConfigurationError::UnknownMethod {
            method,
            column: column.to_string(),
        },
        GenerationError::InvalidParams { method, message } => ConfigurationError::InvalidParams {
            method,
            column: column.to_string(),
            message,
        },
        other => ConfigurationError::Generator(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dataveil_config::{ColumnGeneratorSpec, OrderedMap};
    use dataveil_core::{ColumnMetadata, ConfigurationError, ScalarValue, TableColumns};
    use dataveil_generate::{GenerationError, ValueGenerator};
    use serde_json::{Value, json};

    use super::{check_columns, generate_row};

    struct Canned(HashMap<&'static str, Value>);

    impl ValueGenerator for Canned {
        fn generate(&mut self, method: &str, _params: &[Value]) -> Result<Value, GenerationError> {
            self.0
                .get(method)
                .cloned()
                .ok_or_else(|| GenerationError::UnknownMethod(method.to_string()))
        }

        fn supports(&self, method: &str) -> bool {
            self.0.contains_key(method)
        }
    }

    fn canned() -> Canned {
        Canned(HashMap::from([
            ("exact", json!("abcde")),
            ("long", json!("abcdefgh")),
            ("accents", json!("éèàùç")),
            ("number", json!(123456)),
            ("object", json!({"date": "2020-01-01"})),
            ("list", json!(["a", "b"])),
        ]))
    }

    fn columns() -> TableColumns {
        TableColumns::new(vec![
            ColumnMetadata::new("id", "integer"),
            ColumnMetadata::new("code", "string").with_max_length(5),
            ColumnMetadata::new("ref", "integer").with_max_length(3),
            ColumnMetadata::new("content", "text"),
        ])
    }

    fn cols(pairs: &[(&str, &str)]) -> OrderedMap<ColumnGeneratorSpec> {
        pairs
            .iter()
            .map(|(column, method)| (column.to_string(), ColumnGeneratorSpec::new(*method)))
            .collect()
    }

    #[test]
    fn values_at_the_limit_are_untouched() {
        let row = generate_row("t", &cols(&[("code", "exact")]), &columns(), &mut canned())
            .expect("row");
        assert_eq!(row, vec![("code".to_string(), ScalarValue::from("abcde"))]);
    }

    #[test]
    fn longer_values_are_cut_to_the_limit() {
        let row = generate_row(
            "t",
            &cols(&[("code", "long"), ("content", "long")]),
            &columns(),
            &mut canned(),
        )
        .expect("row");
        assert_eq!(row[0].1, ScalarValue::from("abcde"));
        assert_eq!(row[1].1, ScalarValue::from("abcdefgh"));
    }

    #[test]
    fn truncation_counts_characters() {
        let mut generator = canned();
        generator.0.insert("accents", json!("éèàùçé"));
        let row = generate_row("t", &cols(&[("code", "accents")]), &columns(), &mut generator)
            .expect("row");
        assert_eq!(row[0].1, ScalarValue::from("éèàùç"));
    }

    #[test]
    fn truncated_numbers_become_text() {
        let row = generate_row("t", &cols(&[("ref", "number")]), &columns(), &mut canned())
            .expect("row");
        assert_eq!(row[0].1, ScalarValue::Text("123".to_string()));
    }

    #[test]
    fn non_scalar_output_is_rejected() {
        for method in ["object", "list"] {
            let err = generate_row("t", &cols(&[("content", method)]), &columns(), &mut canned())
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigurationError::NonScalarOutput { method: ref m, .. } if m == method
            ));
        }
    }

    #[test]
    fn missing_columns_are_named() {
        let config = cols(&[("code", "exact"), ("usernamez", "exact")]);
        let err = check_columns("guestbook", &config, &columns()).unwrap_err();
        assert_eq!(err.to_string(), "Col usernamez does not exist in guestbook");

        let err = generate_row("guestbook", &config, &columns(), &mut canned()).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownColumn { .. }));
    }

    #[test]
    fn unknown_methods_carry_the_column() {
        let err = generate_row("t", &cols(&[("code", "nope")]), &columns(), &mut canned())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownMethod {
                method: "nope".to_string(),
                column: "code".to_string(),
            }
        );
    }
}
