use thiserror::Error;

/// Errors surfaced by the record stores and the service layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or out-of-range input. Never fatal; the caller re-prompts.
    #[error("{0}")]
    Validation(String),

    /// A lookup by id missed.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// An embedded seed dataset could not be decoded.
    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
