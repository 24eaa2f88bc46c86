use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
///
/// Absence is modeled with `Option` in return types; `NotFound` is reserved
/// for operations that require the record to exist.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
