pub mod executor;
pub mod mysql;
pub mod plan;
pub mod report;
pub mod request;

pub use executor::{ExecutionMode, Migrator, SiteConnection, SiteConnector};
pub use mysql::MySqlConnector;
pub use plan::{MigrationStep, STEP_COUNT, StepKind, build_steps};
pub use report::{MigrationReport, StepOutcome, StepResult, TransactionOutcome};
pub use request::{Credentials, DatabaseLogin, MigrationRequest};
