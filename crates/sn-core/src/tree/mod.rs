//! Shared mutable tree: addressing and node semantics.

pub mod node;
pub mod path;

pub use node::{merge_at, normalize, set_at, value_at, TreeValue};
pub use path::{TreePath, TreePathError};
