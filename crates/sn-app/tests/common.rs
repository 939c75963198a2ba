#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sn_app::{App, AppDeps};
use sn_core::ports::TreeStorePort;
use sn_infra::{FixedClock, InMemoryTreeStore, LocalAnonymousIdentity, TokioFileReader};

pub const T0: i64 = 1_700_000_000_000;

/// One principal (its own identity) on a shared in-memory tree.
pub fn principal(store: &InMemoryTreeStore, uid: &str) -> App {
    principal_on(Arc::new(store.clone()), uid)
}

/// Same as [`principal`] over any store adapter.
pub fn principal_on(store: Arc<dyn TreeStorePort>, uid: &str) -> App {
    App::new(AppDeps {
        store,
        identity: Arc::new(LocalAnonymousIdentity::with_uid(uid.into())),
        clock: Arc::new(FixedClock(T0)),
        files: Arc::new(TokioFileReader),
    })
}

/// Bound every wait on a subscription so a missing notification fails fast.
pub async fn within<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("timed out waiting for a notification")
}
