//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases and the infrastructure
//! adapters (tree store backends, identity providers, clocks, file access).

mod clock;
mod file_reader;
pub mod identity;
pub mod tree_store;

pub use clock::ClockPort;
pub use file_reader::FileReaderPort;
pub use identity::{AuthError, IdentityProviderPort};
pub use tree_store::{decode, encode, StoreError, TreeStorePort, TreeSubscription};
