mod logging;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use dataveil_anonymize::Anonymizer;
use dataveil_config::{
    ConfigError, ValidatedConfig, ValidationIssue, config_json_schema, load_config,
    validate_methods,
};
use dataveil_core::{Error as CoreError, redact_connection_string};
use dataveil_db::{DbOptions, PostgresDatabase};
use dataveil_generate::{FakerGenerator, GenerationError, canonical_method};
use logging::init_logging;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Anonymize(#[from] CoreError),
    #[error("generator error: {0}")]
    Generator(#[from] GenerationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "dataveil",
    version,
    about = "Anonymize database tables from a declarative configuration"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Anonymize the configured entities.
    Run(RunArgs),
    /// Check a configuration file.
    Validate(ValidateArgs),
    /// Print the configuration JSON Schema.
    Schema,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Configuration file (.toml or .json).
    #[arg(long, short = 'c', default_value = "dataveil.toml")]
    config: PathBuf,
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    db: String,
    /// Only process these entities, in the given order.
    #[arg(long = "table", short = 't', value_name = "TABLE")]
    tables: Vec<String>,
    /// Schema holding the entities. Defaults to the connection's search path.
    #[arg(long)]
    schema: Option<String>,
    /// Execute the statements instead of only generating them.
    #[arg(long, default_value_t = false)]
    no_pretend: bool,
    /// Print the generated SQL.
    #[arg(long, default_value_t = false)]
    sql: bool,
    /// Maximum rows to update, and number of rows to insert.
    #[arg(long, short = 'l', default_value_t = 0)]
    limit: u64,
    /// Write JSON logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Configuration file (.toml or .json).
    #[arg(long, short = 'c', default_value = "dataveil.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_anonymize(args).await,
        Command::Validate(args) => {
            let warnings = validate(&args.config)?;
            for warning in warnings {
                println!("warning: {warning}");
            }
            println!("Your config is valid!");
            Ok(())
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&config_json_schema())?);
            Ok(())
        }
    }
}

/// Loads a configuration and checks it against the generator: method names
/// and language. Returns the warnings.
fn validate(path: &Path) -> Result<Vec<ValidationIssue>, CliError> {
    let ValidatedConfig { config, warnings } = load_checked(path)?;
    FakerGenerator::new(&config.language, config.seed)?;
    Ok(warnings)
}

fn load_checked(path: &Path) -> Result<ValidatedConfig, CliError> {
    let loaded = load_config(path)?;
    let report = validate_methods(&loaded.config, |method| canonical_method(method).is_some());
    if !report.is_ok() {
        return Err(ConfigError::Invalid(report).into());
    }
    Ok(loaded)
}

async fn run_anonymize(args: RunArgs) -> Result<(), CliError> {
    let RunArgs {
        config,
        db,
        tables,
        schema,
        no_pretend,
        sql,
        limit,
        log_file,
    } = args;

    init_logging(log_file.as_deref())?;

    let run_id = Uuid::new_v4().to_string();
    let pretend = !no_pretend;
    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        config = %config.display(),
        connection = %redact_connection_string(&db),
        pretend,
        limit
    );

    let ValidatedConfig {
        config: anonymizer_config,
        warnings,
    } = load_checked(&config)?;
    for issue in &warnings {
        tracing::warn!(
            event = "config_warning",
            code = %issue.code,
            path = %issue.path,
            message = %issue.message
        );
    }

    detect_engine(&db)?;
    let mut connect_options = PgConnectOptions::from_str(&db)?;
    if let Some(schema) = &schema {
        connect_options = connect_options.options([("search_path", schema.as_str())]);
    }
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await?;
    tracing::info!(event = "database_connected", engine = "postgres");

    let entities: Vec<String> = if tables.is_empty() {
        anonymizer_config.entities.keys().cloned().collect()
    } else {
        tables
    };

    let generator = FakerGenerator::new(&anonymizer_config.language, anonymizer_config.seed)?;
    let database = PostgresDatabase::with_options(pool, DbOptions { schema });
    let mut anonymizer = Anonymizer::new(database, generator);
    anonymizer.set_configuration(anonymizer_config);
    anonymizer.set_limit(limit);

    let timer = Instant::now();
    for entity in &entities {
        let entity_timer = Instant::now();
        let mut rows = 0_u64;
        let mut progress = |row: u64| rows = row;

        tracing::info!(event = "entity_started", run_id = %run_id, entity = %entity);
        let statements = anonymizer
            .process_entity(entity, Some(&mut progress), pretend, sql)
            .await
            .inspect_err(|err| {
                tracing::warn!(event = "entity_failed", entity = %entity, error = %err);
            })?;

        if sql {
            for statement in &statements {
                println!("{statement};");
            }
        }
        println!("{entity}: {rows} row(s)");
        tracing::info!(
            event = "entity_finished",
            run_id = %run_id,
            entity = %entity,
            rows,
            duration_ms = entity_timer.elapsed().as_millis() as u64
        );
    }

    if pretend {
        println!("Pretend mode: nothing was written. Use --no-pretend to apply.");
    }
    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        status = "success",
        entities = entities.len(),
        duration_ms = timer.elapsed().as_millis() as u64
    );

    Ok(())
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(redact_connection_string(conn)))
    }
}
