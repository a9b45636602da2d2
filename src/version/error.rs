use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Project not found: {0}")]
    NotFound(String),

    /// Credentials rejected or rate limited
    #[error("Unauthorized: repository answered {0}")]
    Unauthorized(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Request-level failure of the update pipeline
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("invalid project id")]
    InvalidProjectId,

    #[error("unsupported game")]
    UnsupportedGame,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UpdateError {
    /// Whether the failure is the caller's fault rather than ours
    pub fn is_user_error(&self) -> bool {
        matches!(self, UpdateError::InvalidProjectId | UpdateError::UnsupportedGame)
    }
}
