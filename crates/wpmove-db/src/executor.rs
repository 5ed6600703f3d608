use std::sync::Arc;

use async_trait::async_trait;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;
use wpmove_common::Result;

use crate::plan::{MigrationStep, build_steps};
use crate::report::{MigrationReport, StepResult, TransactionOutcome};
use crate::request::{Credentials, MigrationRequest};

/// Opens connections to the site database.
#[async_trait]
pub trait SiteConnector: Send + Sync {
    /// Fails with `Error::Connection` carrying the driver message.
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn SiteConnection>>;
}

/// One open connection. Errors from `execute` are `Error::Statement`.
#[async_trait]
pub trait SiteConnection: Send {
    /// Run a step, returning the affected-row count reported by the driver.
    async fn execute(&mut self, step: &MigrationStep) -> Result<u64>;

    async fn begin(&mut self) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// Whether the seven updates share a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Each update commits on its own; a failure keeps earlier changes.
    #[default]
    Sequential,
    /// All updates run in one transaction, rolled back on the first failure.
    Transactional,
}

impl ExecutionMode {
    pub fn from_flag(transactional: bool) -> Self {
        if transactional {
            ExecutionMode::Transactional
        } else {
            ExecutionMode::Sequential
        }
    }
}

/// Runs the rewrite plan for a request against one connection, halting at
/// the first failure.
#[derive(Clone)]
pub struct Migrator {
    connector: Arc<dyn SiteConnector>,
    host: String,
    port: u16,
    mode: ExecutionMode,
}

impl Migrator {
    pub fn new(connector: Arc<dyn SiteConnector>, host: impl Into<String>, port: u16) -> Self {
        Self {
            connector,
            host: host.into(),
            port,
            mode: ExecutionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Execute the migration. Never fails: connection and statement errors
    /// are recorded in the returned report.
    pub async fn run(&self, request: &MigrationRequest) -> MigrationReport {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "migration",
            %run_id,
            database = %request.login().name,
            prefix = %request.table_prefix(),
        );
        self.run_steps(run_id, request).instrument(span).await
    }

    async fn run_steps(&self, run_id: Uuid, request: &MigrationRequest) -> MigrationReport {
        let credentials = request.credentials(&self.host, self.port);
        info!(
            "connecting to {}:{} as {}",
            credentials.host, credentials.port, credentials.user
        );

        let mut conn = match self.connector.connect(&credentials).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("could not connect: {e}");
                return MigrationReport::connection_failed(run_id, e.to_string());
            }
        };

        let mut report = MigrationReport::new(run_id);

        if self.mode == ExecutionMode::Transactional
            && let Err(e) = conn.begin().await
        {
            warn!("failed to start transaction: {e}");
            report.transaction = Some(TransactionOutcome::BeginFailed(e.to_string()));
            close_connection(conn).await;
            return report;
        }

        for step in build_steps(request) {
            debug!("{}: {}", step.label, step.render());
            match conn.execute(&step).await {
                Ok(rows) => {
                    info!("{}: {rows} rows changed", step.label);
                    report.results.push(StepResult::success(step, rows));
                }
                Err(e) => {
                    warn!("{} failed, halting: {e}", step.label);
                    report.results.push(StepResult::failure(step, e.to_string()));
                    break;
                }
            }
        }

        if self.mode == ExecutionMode::Transactional {
            let outcome = if report.failure().is_some() {
                match conn.rollback().await {
                    Ok(()) => TransactionOutcome::RolledBack,
                    Err(e) => TransactionOutcome::RollbackFailed(e.to_string()),
                }
            } else {
                match conn.commit().await {
                    Ok(()) => TransactionOutcome::Committed,
                    Err(e) => TransactionOutcome::CommitFailed(e.to_string()),
                }
            };
            info!("{outcome}");
            report.transaction = Some(outcome);
        }

        close_connection(conn).await;

        if report.is_complete() {
            info!(
                "migration complete, {} rows changed",
                report.total_rows_affected()
            );
        }
        report
    }
}

async fn close_connection(conn: Box<dyn SiteConnection>) {
    if let Err(e) = conn.close().await {
        warn!("failed to close database connection: {e}");
    }
}
