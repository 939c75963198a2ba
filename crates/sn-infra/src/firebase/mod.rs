//! Adapters for the hosted realtime database and its anonymous sign-in.

pub mod auth;
pub mod store;
pub mod stream;

pub use auth::{AuthEndpoints, FirebaseAnonymousAuth};
pub use store::FirebaseTreeStore;
