use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clipboard::ClipboardPayload;
use crate::ids::Uid;

/// Room node stored at `rooms/{roomId}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Uid>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "lenient_membership"
    )]
    pub participants: BTreeMap<Uid, bool>,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "lenient_membership"
    )]
    pub requests: BTreeMap<Uid, bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_payload"
    )]
    pub clipboard: Option<ClipboardPayload>,
}

/// A clipboard written by a client with an unknown payload kind must not make
/// the whole room unreadable.
fn lenient_payload<'de, D>(deserializer: D) -> Result<Option<ClipboardPayload>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

fn lenient_membership<'de, D>(deserializer: D) -> Result<BTreeMap<Uid, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(membership_flags(raw))
}

/// Read a `uid -> true` membership map from a raw node.
///
/// Entries whose flag is not a boolean count as unset. A node that is not an
/// object yields an empty map.
pub fn membership_flags(value: Option<serde_json::Value>) -> BTreeMap<Uid, bool> {
    let Some(value) = value else {
        return BTreeMap::new();
    };
    let serde_json::Value::Object(entries) = value else {
        #[cfg(feature = "tracing")]
        tracing::warn!(found = %value, "membership node is not an object, ignoring it");
        return BTreeMap::new();
    };

    entries
        .into_iter()
        .filter_map(|(uid, flag)| match flag {
            serde_json::Value::Bool(flag) => Some((Uid::from(uid), flag)),
            _other => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%uid, found = %_other, "ignoring malformed membership flag");
                None
            }
        })
        .collect()
}

impl Room {
    /// Fresh room naming `owner` as owner and sole participant.
    pub fn create(owner: Uid, created_at: i64) -> Self {
        let mut participants = BTreeMap::new();
        participants.insert(owner.clone(), true);
        Self {
            owner: Some(owner),
            created_at,
            participants,
            requests: BTreeMap::new(),
            clipboard: None,
        }
    }

    pub fn is_owner(&self, uid: &Uid) -> bool {
        self.owner.as_ref() == Some(uid)
    }

    pub fn is_participant(&self, uid: &Uid) -> bool {
        self.participants.get(uid).copied().unwrap_or(false)
    }

    pub fn has_requested(&self, uid: &Uid) -> bool {
        self.requests.get(uid).copied().unwrap_or(false)
    }

    pub fn pending_requests(&self) -> Vec<Uid> {
        flagged_uids(&self.requests)
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.created_at)
    }
}

/// Keys of a `uid -> true` membership map, in key order.
pub fn flagged_uids(map: &BTreeMap<Uid, bool>) -> Vec<Uid> {
    map.iter()
        .filter(|(_, flag)| **flag)
        .map(|(uid, _)| uid.clone())
        .collect()
}
