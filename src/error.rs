use thiserror::Error;

/// A submitted URL was rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unsupported URL scheme")]
    UnsupportedScheme,
}

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage error")]
    Storage(#[from] anyhow::Error),
}

impl From<libsql::Error> for BookmarkError {
    fn from(error: libsql::Error) -> Self {
        BookmarkError::Storage(error.into())
    }
}

impl BookmarkError {
    pub fn is_validation(&self) -> bool {
        matches!(self, BookmarkError::Validation(_))
    }
}
