use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::plan::{MigrationStep, STEP_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Success { rows_affected: u64 },
    Failure { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub step: MigrationStep,
    pub outcome: StepOutcome,
}

impl StepResult {
    pub fn success(step: MigrationStep, rows_affected: u64) -> Self {
        Self {
            step,
            outcome: StepOutcome::Success { rows_affected },
        }
    }

    pub fn failure(step: MigrationStep, message: impl Into<String>) -> Self {
        Self {
            step,
            outcome: StepOutcome::Failure {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Success { .. })
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Success { rows_affected } => {
                write!(f, "{}: {rows_affected} rows changed", self.step.label)
            }
            StepOutcome::Failure { message } => write!(f, "{}: ERROR: {message}", self.step.label),
        }
    }
}

/// What happened to the wrapping transaction, when one was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum TransactionOutcome {
    Committed,
    RolledBack,
    BeginFailed(String),
    CommitFailed(String),
    RollbackFailed(String),
}

impl fmt::Display for TransactionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionOutcome::Committed => f.write_str("Transaction committed"),
            TransactionOutcome::RolledBack => {
                f.write_str("Transaction rolled back, no changes were kept")
            }
            TransactionOutcome::BeginFailed(e) => write!(f, "Could Not Start Transaction: {e}"),
            TransactionOutcome::CommitFailed(e) => write!(f, "Commit Failed: {e}"),
            TransactionOutcome::RollbackFailed(e) => write!(f, "Rollback Failed: {e}"),
        }
    }
}

/// Results of one migration run, in execution order. Holds only the steps
/// that actually ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub connection_error: Option<String>,
    pub results: Vec<StepResult>,
    pub transaction: Option<TransactionOutcome>,
}

impl MigrationReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            connection_error: None,
            results: Vec::new(),
            transaction: None,
        }
    }

    pub fn connection_failed(run_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            connection_error: Some(message.into()),
            ..Self::new(run_id)
        }
    }

    /// The step that stopped the run, if any.
    pub fn failure(&self) -> Option<&StepResult> {
        self.results.iter().find(|r| !r.is_success())
    }

    pub fn total_rows_affected(&self) -> u64 {
        self.results
            .iter()
            .map(|r| match r.outcome {
                StepOutcome::Success { rows_affected } => rows_affected,
                StepOutcome::Failure { .. } => 0,
            })
            .sum()
    }

    /// True only when every step ran and succeeded, and a wrapping
    /// transaction, if any, was committed.
    pub fn is_complete(&self) -> bool {
        self.connection_error.is_none()
            && self.results.len() == STEP_COUNT
            && self.results.iter().all(StepResult::is_success)
            && matches!(
                self.transaction,
                None | Some(TransactionOutcome::Committed)
            )
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.connection_error {
            return write!(f, "Could Not Connect: {error}");
        }
        for result in &self.results {
            writeln!(f, "{result}")?;
        }
        if let Some(transaction) = &self.transaction {
            writeln!(f, "{transaction}")?;
        }
        if self.is_complete() {
            writeln!(f, "COMPLETE")?;
        }
        Ok(())
    }
}
