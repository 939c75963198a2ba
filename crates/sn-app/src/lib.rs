//! Snappi application orchestration layer
//!
//! Use cases for clipboard sessions, rooms and clipboard capture, written
//! against the ports of `sn-core`.

pub mod app;
pub mod deps;
pub mod usecases;

pub use app::App;
pub use deps::AppDeps;
