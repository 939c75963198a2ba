//! # sn-core
//!
//! Core domain models and access-control policies for Snappi.
//!
//! This crate contains pure business logic without any infrastructure
//! dependencies: the shared-tree algebra, the session and room models with
//! their policies, and the ports implemented by adapters.

pub mod clipboard;
pub mod config;
pub mod errors;
pub mod ids;
pub mod paths;
pub mod ports;
pub mod room;
pub mod session;
pub mod tree;

// Re-export commonly used types at the crate root
pub use clipboard::{ClipboardPayload, DataUrl, FileBlob, PayloadKind};
pub use config::AppConfig;
pub use errors::AccessError;
pub use ids::{RoomId, SessionId, Uid};
pub use room::{Room, RoomAccessState};
pub use session::{ClipboardSession, SessionStatus};
pub use tree::{TreePath, TreeValue};
