use std::time::Instant;

use futures::TryStreamExt;
use tracing::{debug, info, warn};

use dataveil_config::{AnonymizerConfig, ColumnGeneratorSpec, OrderedMap};
use dataveil_core::{
    ColumnMetadata, ConfigurationError, ExecutionError, Result, Statement, StatementKind,
    TableColumns,
};
use dataveil_db::Database;
use dataveil_generate::ValueGenerator;

use crate::actions::{Action, ActionSet};
use crate::resolver::resolve;
use crate::row::{check_columns, generate_row};
use crate::statement::{delete_statement, insert_statement, update_statement};

/// Progress hook, called with the 1-based row counter after each row.
pub type Progress<'a> = Option<&'a mut dyn FnMut(u64)>;

/// Runs delete, update and insert passes over one entity at a time.
pub struct Anonymizer<D, G> {
    db: D,
    generator: G,
    config: Option<AnonymizerConfig>,
    limit: u64,
}

/// Everything the phases need, resolved once per `process_entity` call.
struct EntityPass<'a> {
    entity: &'a str,
    primary_key: ColumnMetadata,
    columns: TableColumns,
    cols: Option<OrderedMap<ColumnGeneratorSpec>>,
    pretend: bool,
    capture: bool,
}

impl<D: Database, G: ValueGenerator> Anonymizer<D, G> {
    pub fn new(db: D, generator: G) -> Self {
        Self {
            db,
            generator,
            config: None,
            limit: 0,
        }
    }

    pub fn set_configuration(&mut self, config: AnonymizerConfig) {
        self.config = Some(config);
    }

    pub fn configuration(&self) -> Option<&AnonymizerConfig> {
        self.config.as_ref()
    }

    /// Caps updated rows and sets the number of inserted rows. `0` means no
    /// cap for updates and nothing to insert.
    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    /// Anonymizes one entity.
    ///
    /// Returns the rendered statements when `capture_statements` is set. In
    /// `pretend` mode nothing is executed. Statements already executed when
    /// an error is raised stay applied.
    pub async fn process_entity(
        &mut self,
        entity: &str,
        mut callback: Progress<'_>,
        pretend: bool,
        capture_statements: bool,
    ) -> Result<Vec<String>> {
        let started = Instant::now();

        if !self.db.table_exists(entity).await? {
            return Err(ExecutionError::TableNotFound(entity.to_string()).into());
        }
        let primary_key = self.db.primary_key(entity).await?;
        let columns = self.db.columns(entity).await?;

        let config = resolve(self.config.as_ref(), entity)?.clone();
        if let Some(cols) = &config.cols {
            check_columns(entity, cols, &columns)?;
        }
        let actions = ActionSet::for_entity(&config);
        if actions.contains(Action::Update)
            && config
                .cols
                .as_ref()
                .is_some_and(|cols| cols.contains_key(&primary_key.name))
        {
            return Err(ConfigurationError::PrimaryKeyUpdate {
                entity: entity.to_string(),
                column: primary_key.name.clone(),
            }
            .into());
        }

        info!(
            entity,
            actions = %actions,
            pretend,
            limit = self.limit,
            "entity started"
        );
        if actions.is_empty() {
            debug!(entity, "no action configured");
        }
        self.generator.begin_scope(entity);

        let pass = EntityPass {
            entity,
            primary_key,
            columns,
            cols: config.cols,
            pretend,
            capture: capture_statements,
        };
        let mut statements = Vec::new();
        let mut rows = 0_u64;

        for action in actions.iter() {
            match action {
                Action::Delete => {
                    let statement = delete_statement(entity, &config.delete_where);
                    let affected =
                        run_statement(&self.db, &pass, &statement, &mut statements).await?;
                    info!(entity, affected, pretend, "delete done");
                }
                Action::Update => {
                    rows += self.update(&pass, &mut callback, &mut statements).await?;
                }
                Action::Insert => {
                    rows += self.insert(&pass, &mut callback, &mut statements).await?;
                }
            }
        }

        info!(
            entity,
            rows,
            statements = statements.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "entity finished"
        );
        Ok(statements)
    }

    async fn update(
        &mut self,
        pass: &EntityPass<'_>,
        callback: &mut Progress<'_>,
        statements: &mut Vec<String>,
    ) -> Result<u64> {
        let Some(cols) = &pass.cols else {
            return Ok(0);
        };
        debug!(entity = pass.entity, key = %pass.primary_key.name, "update started");

        let scan = self.db.key_scan(pass.entity, &pass.primary_key);
        let mut keys = self.db.stream_keys(&scan);
        let mut row_num = 0_u64;

        while let Some(key) = keys.try_next().await? {
            let row = generate_row(pass.entity, cols, &pass.columns, &mut self.generator)?;
            let statement = update_statement(
                pass.entity,
                &pass.primary_key,
                key,
                &row,
                &pass.columns,
                self.db.driver(),
            );
            run_statement(&self.db, pass, &statement, statements).await?;

            row_num += 1;
            notify(callback, row_num);
            if self.limit > 0 && row_num >= self.limit {
                debug!(entity = pass.entity, limit = self.limit, "update limit reached");
                break;
            }
        }

        info!(entity = pass.entity, rows = row_num, pretend = pass.pretend, "update done");
        Ok(row_num)
    }

    async fn insert(
        &mut self,
        pass: &EntityPass<'_>,
        callback: &mut Progress<'_>,
        statements: &mut Vec<String>,
    ) -> Result<u64> {
        let Some(cols) = &pass.cols else {
            return Ok(0);
        };
        if self.limit == 0 {
            warn!(entity = pass.entity, "insert requested without a limit, nothing inserted");
            return Ok(0);
        }

        for row_num in 1..=self.limit {
            let row = generate_row(pass.entity, cols, &pass.columns, &mut self.generator)?;
            let statement = insert_statement(pass.entity, &row, &pass.columns, self.db.driver());
            run_statement(&self.db, pass, &statement, statements).await?;
            notify(callback, row_num);
        }

        info!(entity = pass.entity, rows = self.limit, pretend = pass.pretend, "insert done");
        Ok(self.limit)
    }
}

/// Captures and, outside pretend mode, executes one statement.
async fn run_statement<D: Database>(
    db: &D,
    pass: &EntityPass<'_>,
    statement: &Statement,
    statements: &mut Vec<String>,
) -> Result<u64> {
    if pass.capture {
        statements.push(statement.to_raw_sql());
    }
    if pass.pretend {
        return Ok(0);
    }
    db.execute(statement)
        .await
        .map_err(|err| statement_error(statement.kind(), pass.entity, err).into())
}

fn statement_error(kind: StatementKind, entity: &str, err: ExecutionError) -> ExecutionError {
    let message = match err {
        ExecutionError::Db(message) => message,
        other => other.to_string(),
    };
    ExecutionError::Statement {
        kind,
        entity: entity.to_string(),
        message,
    }
}

fn notify(callback: &mut Progress<'_>, row_num: u64) {
    if let Some(callback) = callback.as_deref_mut() {
        callback(row_num);
    }
}
