pub mod firebase;
pub mod fs;
pub mod identity;
pub mod store;
pub mod time;

pub use firebase::{FirebaseAnonymousAuth, FirebaseTreeStore};
pub use fs::TokioFileReader;
pub use identity::LocalAnonymousIdentity;
pub use store::InMemoryTreeStore;
pub use time::{FixedClock, SystemClock};
