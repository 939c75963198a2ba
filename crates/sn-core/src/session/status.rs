use std::fmt;

use serde::{Deserialize, Serialize};

/// User-visible status line of a clipboard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Connecting,
    Created,
    Claimed,
    Synced,
    Updating,
    AccessDenied,
    PermissionDenied,
}

impl SessionStatus {
    pub fn message(&self) -> &'static str {
        match self {
            SessionStatus::Connecting => "Connecting...",
            SessionStatus::Created => "Session created. You are the owner.",
            SessionStatus::Claimed => "You claimed this session.",
            SessionStatus::Synced => "Synced",
            SessionStatus::Updating => "Updating...",
            SessionStatus::AccessDenied => "Access Denied: you are not the owner of this session.",
            SessionStatus::PermissionDenied => "Permission Denied",
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(
            self,
            SessionStatus::AccessDenied | SessionStatus::PermissionDenied
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
