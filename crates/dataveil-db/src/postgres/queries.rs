use sqlx::{PgPool, Row};

use dataveil_core::ExecutionError;

fn db_error(err: sqlx::Error) -> ExecutionError {
    ExecutionError::Db(err.to_string())
}

pub async fn table_exists(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<bool, ExecutionError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        select exists (
          select 1
          from pg_class c
          join pg_namespace n on n.oid = c.relnamespace
          where n.nspname = coalesce($1::text, current_schema())
            and c.relname = $2
            and c.relkind in ('r', 'p')
        )
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_one(pool)
    .await
    .map_err(db_error)?;

    Ok(exists)
}

pub struct RawColumn {
    pub name: String,
    pub type_name: String,
    pub character_max_length: Option<i32>,
}

pub async fn list_columns(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<RawColumn>, ExecutionError> {
    let rows = sqlx::query(
        r#"
        select
          a.attname::text as name,
          t.typname::text as type_name,
          case
            when t.typname in ('varchar', 'bpchar') and a.atttypmod > 4 then a.atttypmod - 4
            else null
          end as character_max_length
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_type t on t.oid = a.atttypid
        where n.nspname = coalesce($1::text, current_schema())
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    rows.into_iter()
        .map(|row| {
            Ok(RawColumn {
                name: row.try_get("name").map_err(db_error)?,
                type_name: row.try_get("type_name").map_err(db_error)?,
                character_max_length: row.try_get("character_max_length").map_err(db_error)?,
            })
        })
        .collect()
}

pub async fn primary_key_columns(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<String>, ExecutionError> {
    let columns = sqlx::query_scalar::<_, String>(
        r#"
        select att.attname::text
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = rel.oid and att.attnum = ord.attnum
        where nsp.nspname = coalesce($1::text, current_schema())
          and rel.relname = $2
          and con.contype = 'p'
        order by ord.ordinality
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(columns)
}
