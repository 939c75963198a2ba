use thiserror::Error;

use crate::ports::{AuthError, StoreError};
use crate::room::RoomAccessState;
use crate::session::SessionStatus;

/// Failure of a session or room flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("access denied: the session belongs to another principal")]
    AccessDenied,

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("only the room owner may {0}")]
    NotOwner(&'static str),

    #[error("waiting for the owner's approval")]
    NotApproved,

    #[error("room is no longer active: {0:?}")]
    Inactive(RoomAccessState),

    #[error("gave up on {0} after repeated concurrent changes")]
    Contended(String),
}

impl AccessError {
    /// Status line shown for this failure. Only a foreign-owned session gets
    /// its own message.
    pub fn status(&self) -> SessionStatus {
        match self {
            AccessError::AccessDenied => SessionStatus::AccessDenied,
            _ => SessionStatus::PermissionDenied,
        }
    }
}
