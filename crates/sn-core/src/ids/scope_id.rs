use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id_macro::impl_id;
use crate::tree::TreePath;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidIdError {
    #[error("id must not be blank")]
    Blank,

    #[error("id {0:?} contains characters not allowed in a tree key")]
    IllegalCharacters(String),
}

/// Caller-supplied identifier of a clipboard session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

/// Caller-supplied identifier of a room ("room number" on the home screen).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl_id!(SessionId, RoomId);

fn parse_scope_id(raw: &str) -> Result<String, InvalidIdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidIdError::Blank);
    }
    if !TreePath::is_valid_segment(trimmed) {
        return Err(InvalidIdError::IllegalCharacters(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

impl SessionId {
    /// Trim surrounding whitespace and validate the id as a single tree key.
    pub fn parse(raw: &str) -> Result<Self, InvalidIdError> {
        parse_scope_id(raw).map(Self)
    }
}

impl RoomId {
    /// Trim surrounding whitespace and validate the id as a single tree key.
    pub fn parse(raw: &str) -> Result<Self, InvalidIdError> {
        parse_scope_id(raw).map(Self)
    }
}
