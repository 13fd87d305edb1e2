use classtrack_core::CoreError;

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("notification channel error: {0}")]
    Channel(String),
}
