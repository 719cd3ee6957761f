use anyhow::anyhow;
use nofeed_core::AppError;

/// Outcome of a storage call that did not produce a value.
///
/// Driver errors never cross the store boundary; they are classified here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("role not found: {0}")]
    UnknownRole(String),
    #[error("record already exists")]
    Conflict,
    #[error("storage unavailable")]
    Unavailable(#[source] sqlx::Error),
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::Conflict,
                Some(FOREIGN_KEY_VIOLATION) => StoreError::NotFound,
                _ => StoreError::Unavailable(err),
            },
            _ => StoreError::Unavailable(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found(anyhow!("not found")),
            StoreError::UnknownRole(_) => AppError::not_found(anyhow!("role not found")),
            StoreError::Conflict => AppError::conflict(anyhow!("already exists")),
            StoreError::Unavailable(_) => AppError::unavailable(err),
        }
    }
}
