use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// The database could not be reached or refused the credentials.
    /// Carries the driver message verbatim.
    #[error("{0}")]
    Connection(String),

    /// A single UPDATE failed. Carries the driver message verbatim.
    #[error("{0}")]
    Statement(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
