use std::env;

use anyhow::{Context, Result};
use dataveil_core::{ScalarValue, Statement, StatementKind};
use dataveil_db::{Database, PostgresDatabase};
use futures::TryStreamExt;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

fn fixture(table: &str) -> Vec<String> {
    vec![
        format!("drop table if exists {table}"),
        format!(
            "create table {table} (
                id serial primary key,
                username varchar(20) not null,
                content text,
                created date
            )"
        ),
        format!(
            "insert into {table} (username, content, created) values
                ('joe', 'hello', '2020-01-01'),
                ('nancy', 'world', '2021-06-30')"
        ),
    ]
}

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn connect(table: &str) -> Result<Option<PgPool>> {
    let Some(url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL for integration tests");
        return Ok(None);
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&url)
        .await
        .context("connecting to Postgres")?;

    for sql in fixture(table) {
        sqlx::query(&sql)
            .execute(&pool)
            .await
            .with_context(|| format!("executing fixture: {sql}"))?;
    }
    Ok(Some(pool))
}

#[tokio::test]
async fn reads_live_schema_and_streams_keys() -> Result<()> {
    let Some(pool) = connect("dv_guestbook_schema").await? else {
        return Ok(());
    };
    sqlx::query("drop table if exists dv_keyless").execute(&pool).await?;
    sqlx::query("create table dv_keyless (note text)").execute(&pool).await?;
    let db = PostgresDatabase::new(pool);

    assert!(db.table_exists("dv_guestbook_schema").await?);
    assert!(!db.table_exists("dv_missing").await?);

    let columns = db.columns("dv_guestbook_schema").await?;
    let names: Vec<&str> = columns.names().collect();
    assert_eq!(names, vec!["id", "username", "content", "created"]);
    let username = columns.get("username").context("username column")?;
    assert_eq!(username.storage_type, "string");
    assert_eq!(username.max_length, Some(20));
    assert_eq!(columns.get("created").map(|c| c.storage_type.as_str()), Some("date"));

    let pk = db.primary_key("dv_guestbook_schema").await?;
    assert_eq!(pk.name, "id");
    assert_eq!(pk.storage_type, "integer");

    let scan = db.key_scan("dv_guestbook_schema", &pk);
    let keys: Vec<ScalarValue> = db.stream_keys(&scan).try_collect().await?;
    assert_eq!(keys, vec![ScalarValue::Int(1), ScalarValue::Int(2)]);

    let err = db.primary_key("dv_keyless").await.unwrap_err();
    assert_eq!(err.to_string(), "Can't find a primary key for 'dv_keyless'");
    Ok(())
}

#[tokio::test]
async fn executes_named_parameter_statements() -> Result<()> {
    let Some(pool) = connect("dv_guestbook_exec").await? else {
        return Ok(());
    };
    let db = PostgresDatabase::new(pool.clone());

    let update = Statement::new(
        StatementKind::Update,
        "UPDATE dv_guestbook_exec SET username = (CASE username WHEN NULL THEN NULL ELSE :username END), \
         created = CAST((CASE created WHEN NULL THEN NULL ELSE :created END) AS DATE) \
         WHERE id = :id",
    )
    .bind("username", ScalarValue::from("ghost"))
    .bind("created", ScalarValue::from("1999-12-31"))
    .bind("id", ScalarValue::Int(1));
    assert_eq!(db.execute(&update).await?, 1);

    let (username, created): (String, String) =
        sqlx::query_as("select username, created::text from dv_guestbook_exec where id = 1")
            .fetch_one(&pool)
            .await?;
    assert_eq!(username, "ghost");
    assert_eq!(created, "1999-12-31");

    let delete = Statement::new(StatementKind::Delete, "DELETE FROM dv_guestbook_exec WHERE id = 2");
    assert_eq!(db.execute(&delete).await?, 1);

    let broken = Statement::new(StatementKind::Delete, "DELETE FROM dv_guestbook_exec WHERE nope = 1");
    assert!(db.execute(&broken).await.is_err());
    Ok(())
}

#[tokio::test]
async fn uuid_keys_and_columns_accept_text_parameters() -> Result<()> {
    let Some(pool) = connect("dv_guestbook_uuid").await? else {
        return Ok(());
    };
    sqlx::query("drop table if exists dv_sessions").execute(&pool).await?;
    sqlx::query("create table dv_sessions (id uuid primary key, token uuid, payload jsonb)")
        .execute(&pool)
        .await?;
    sqlx::query(
        "insert into dv_sessions values
            ('00000000-0000-4000-8000-000000000001', '00000000-0000-4000-8000-00000000000a', '{}')",
    )
    .execute(&pool)
    .await?;
    let db = PostgresDatabase::new(pool.clone());

    let pk = db.primary_key("dv_sessions").await?;
    assert_eq!(pk.storage_type, "guid");
    assert_eq!(pk.native_type.as_deref(), Some("uuid"));
    let columns = db.columns("dv_sessions").await?;
    assert_eq!(
        columns.get("payload").and_then(|c| c.native_type.as_deref()),
        Some("jsonb")
    );

    let scan = db.key_scan("dv_sessions", &pk);
    let keys: Vec<ScalarValue> = db.stream_keys(&scan).try_collect().await?;
    let [key] = keys.as_slice() else {
        anyhow::bail!("expected one key, got {keys:?}");
    };

    let update = Statement::new(
        StatementKind::Update,
        "UPDATE dv_sessions SET token = CAST((CASE token WHEN NULL THEN NULL ELSE :p0 END) AS uuid), \
         payload = CAST((CASE payload WHEN NULL THEN NULL ELSE :p1 END) AS jsonb) \
         WHERE id = CAST(:pk AS uuid)",
    )
    .bind("p0", ScalarValue::from("00000000-0000-4000-8000-0000000000ff"))
    .bind("p1", ScalarValue::from("{\"masked\": true}"))
    .bind("pk", key.clone());
    assert_eq!(db.execute(&update).await?, 1);

    let token: String = sqlx::query_scalar("select token::text from dv_sessions")
        .fetch_one(&pool)
        .await?;
    assert_eq!(token, "00000000-0000-4000-8000-0000000000ff");
    Ok(())
}
