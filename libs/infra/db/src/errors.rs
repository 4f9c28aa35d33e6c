use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("database query failed: {0}")]
    Query(#[from] libsql::Error),

    #[error("failed to map a row onto a domain type: {0}")]
    Mapping(String),

    #[error("transaction could not be committed: {0}")]
    Transaction(String),

    #[error("the requested artifact key has no active row")]
    NoActiveArtifact,
}
