use async_trait::async_trait;
use thiserror::Error;

use crate::ids::Uid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("anonymous sign-in denied: {0}")]
    Denied(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Anonymous identity provider.
#[async_trait]
pub trait IdentityProviderPort: Send + Sync {
    /// Sign in anonymously. Repeated calls on the same provider return the
    /// same UID.
    async fn authenticate_anonymously(&self) -> Result<Uid, AuthError>;

    /// UID of the signed-in principal, if any.
    fn current_uid(&self) -> Option<Uid>;
}
