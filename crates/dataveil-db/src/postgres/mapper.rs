use dataveil_core::{ColumnMetadata, TableColumns};

use super::queries::RawColumn;

/// Maps a `pg_type.typname` to the driver-neutral storage type.
pub fn storage_type(type_name: &str) -> String {
    let mapped = match type_name {
        "int2" => "smallint",
        "int4" => "integer",
        "int8" => "bigint",
        "numeric" => "decimal",
        "float4" | "float8" => "float",
        "bool" => "boolean",
        "date" => "date",
        "timestamp" | "timestamptz" => "datetime",
        "time" | "timetz" => "time",
        "varchar" | "bpchar" => "string",
        "text" => "text",
        "uuid" => "guid",
        "json" | "jsonb" => "json",
        "bytea" => "binary",
        other => other,
    };
    mapped.to_string()
}

pub fn is_integer_type(storage_type: &str) -> bool {
    matches!(storage_type, "smallint" | "integer" | "bigint")
}

pub fn map_columns(raw: Vec<RawColumn>) -> TableColumns {
    raw.into_iter()
        .map(|column| {
            let metadata = ColumnMetadata::new(column.name, storage_type(&column.type_name))
                .with_native_type(column.type_name);
            match column
                .character_max_length
                .and_then(|len| usize::try_from(len).ok())
            {
                Some(len) => metadata.with_max_length(len),
                None => metadata,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_postgres_types() {
        assert_eq!(storage_type("int4"), "integer");
        assert_eq!(storage_type("timestamptz"), "datetime");
        assert_eq!(storage_type("bpchar"), "string");
        assert_eq!(storage_type("numeric"), "decimal");
        assert_eq!(storage_type("inet"), "inet");
    }

    #[test]
    fn keeps_declared_lengths() {
        let columns = map_columns(vec![
            RawColumn {
                name: "id".to_string(),
                type_name: "int4".to_string(),
                character_max_length: None,
            },
            RawColumn {
                name: "username".to_string(),
                type_name: "varchar".to_string(),
                character_max_length: Some(20),
            },
        ]);

        let names: Vec<&str> = columns.names().collect();
        assert_eq!(names, vec!["id", "username"]);
        assert_eq!(columns.get("username").and_then(|c| c.max_length), Some(20));
        assert_eq!(columns.get("id").and_then(|c| c.max_length), None);
        assert!(columns.iter().all(|c| !c.is_unsigned));
        assert_eq!(
            columns.get("username").and_then(|c| c.native_type.as_deref()),
            Some("varchar")
        );
    }
}
