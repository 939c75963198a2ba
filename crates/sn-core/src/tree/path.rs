use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const RESERVED_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreePathError {
    #[error("empty segment in path {0:?}")]
    EmptySegment(String),

    #[error("segment {0:?} contains a reserved character")]
    ReservedCharacter(String),
}

/// Hierarchical address of a node in the shared tree.
///
/// Segments are kept unescaped; adapters that need a wire form (URLs) encode
/// them on the way out. The root path has no segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated path. Leading and trailing slashes are ignored.
    pub fn parse(raw: &str) -> Result<Self, TreePathError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(TreePathError::EmptySegment(raw.to_string()));
            }
            if !Self::is_valid_segment(segment) {
                return Err(TreePathError::ReservedCharacter(segment.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Whether `segment` can be used as a single key of the tree.
    pub fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && !segment
                .chars()
                .any(|c| RESERVED_KEY_CHARS.contains(&c) || c.is_ascii_control())
    }

    pub fn child(&self, segment: impl AsRef<str>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.as_ref().to_string());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &TreePath) -> bool {
        self.segments.len() < other.segments.len() && other.segments.starts_with(&self.segments)
    }

    /// Whether a write at `written` can change the value observed at `self`.
    pub fn overlaps(&self, written: &TreePath) -> bool {
        self == written || self.is_ancestor_of(written) || written.is_ancestor_of(self)
    }

    /// Path of `self` below `ancestor`, or `None` if `ancestor` is not a prefix.
    pub fn relative_to(&self, ancestor: &TreePath) -> Option<TreePath> {
        if !self.segments.starts_with(&ancestor.segments) {
            return None;
        }
        Some(Self {
            segments: self.segments[ancestor.segments.len()..].to_vec(),
        })
    }

    pub fn join(&self, relative: &TreePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}
