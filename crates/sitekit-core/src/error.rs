//! Error types for the sitekit identity store.

use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum SiteKitError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("malformed email address: {email}")]
    MalformedEmail { email: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("storage error: {0}")]
    Storage(String),
}

pub type SiteKitResult<T> = Result<T, SiteKitError>;

/// Map a pending cancellation to [`SiteKitError::Cancelled`].
///
/// Called at the top of every store operation and again after each
/// collaborator call that precedes further side effects.
pub fn ensure_not_cancelled(cancel: &CancellationToken) -> SiteKitResult<()> {
    if cancel.is_cancelled() {
        Err(SiteKitError::Cancelled)
    } else {
        Ok(())
    }
}
