use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use sn_core::ports::{AuthError, IdentityProviderPort};
use sn_core::Uid;

/// Identity provider that mints a random UID on first sign-in and keeps it
/// for the lifetime of the value.
#[derive(Default)]
pub struct LocalAnonymousIdentity {
    uid: RwLock<Option<Uid>>,
}

impl LocalAnonymousIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that signs in as a fixed UID (demo and tests).
    pub fn with_uid(uid: Uid) -> Self {
        Self {
            uid: RwLock::new(Some(uid)),
        }
    }
}

#[async_trait]
impl IdentityProviderPort for LocalAnonymousIdentity {
    async fn authenticate_anonymously(&self) -> Result<Uid, AuthError> {
        let mut current = self
            .uid
            .write()
            .map_err(|_| AuthError::Unavailable("identity lock poisoned".into()))?;
        if let Some(uid) = current.as_ref() {
            return Ok(uid.clone());
        }
        let uid = Uid::generate();
        info!(uid = %uid, "minted local anonymous identity");
        *current = Some(uid.clone());
        Ok(uid)
    }

    fn current_uid(&self) -> Option<Uid> {
        self.uid.read().ok().and_then(|uid| uid.clone())
    }
}
