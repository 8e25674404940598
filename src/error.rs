//! Shared error plumbing.
//!
//! Layer-specific failures (source, sync, config) live next to their
//! modules; this module holds the repository error that every data-access
//! path maps into.

use thiserror::Error;

/// Failures raised by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl RepositoryError {
    /// Wrap a SeaORM error; used as `map_err(RepositoryError::database_error)`.
    pub fn database_error(err: sea_orm::DbErr) -> Self {
        Self::Database(err)
    }
}
