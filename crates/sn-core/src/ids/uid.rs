use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Anonymous principal identity minted by the identity provider.
///
/// The value is opaque; two principals are the same iff their UIDs are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Mint a fresh random UID (used by local identity providers).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl_id!(Uid);
