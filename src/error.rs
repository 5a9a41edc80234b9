use thiserror::Error;

/// Errors surfaced by the repository layer. Handlers map these onto HTTP
/// status codes at the boundary; they are never retried.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("update failed: {0}")]
    UpdateFailed(String),

    #[error("username {0} already exists")]
    DuplicateUser(String),

    #[error("stored row failed validation: {0}")]
    Validation(String),

    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("database error: {0}")]
    Query(#[from] diesel::result::Error),
}

impl DbError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DbError::NotFound(what.into())
    }
}
