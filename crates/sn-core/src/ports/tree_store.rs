//! Tree store port - the shared mutable tree every principal reads and writes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::tree::{TreePath, TreeValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected {operation} at {path}: {reason}")]
    Rejected {
        operation: &'static str,
        path: String,
        reason: String,
    },

    #[error("cannot decode value at {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("subscription to {0} closed")]
    SubscriptionClosed(String),
}

/// Hierarchical key-value store with live subscriptions.
///
/// Every mutation replaces the value at a path wholesale; writing `null`
/// deletes the node and its subtree.
#[async_trait]
pub trait TreeStorePort: Send + Sync {
    /// Current value at `path`, `None` when absent.
    async fn read(&self, path: &TreePath) -> Result<Option<TreeValue>, StoreError>;

    /// Replace the value at `path`. `TreeValue::Null` deletes.
    async fn write(&self, path: &TreePath, value: TreeValue) -> Result<(), StoreError>;

    /// Write `value` only if the node still equals `expected` (`None` = absent).
    ///
    /// Returns `false` without writing when the precondition does not hold.
    async fn compare_and_set(
        &self,
        path: &TreePath,
        expected: Option<TreeValue>,
        value: TreeValue,
    ) -> Result<bool, StoreError>;

    /// Subscribe to `path` and its descendants.
    ///
    /// The first snapshot delivered is the current value; later snapshots
    /// follow every change. Dropping the subscription unsubscribes.
    async fn subscribe(&self, path: &TreePath) -> Result<TreeSubscription, StoreError>;
}

struct UnsubscribeGuard(Option<Box<dyn FnOnce() + Send>>);

impl Drop for UnsubscribeGuard {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.0.take() {
            unsubscribe();
        }
    }
}

/// Live view of one subtree. Snapshots are `None` while the node is absent.
pub struct TreeSubscription {
    path: TreePath,
    receiver: mpsc::UnboundedReceiver<Option<TreeValue>>,
    _guard: UnsubscribeGuard,
}

impl TreeSubscription {
    pub fn new(
        path: TreePath,
        receiver: mpsc::UnboundedReceiver<Option<TreeValue>>,
        on_drop: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            path,
            receiver,
            _guard: UnsubscribeGuard(Some(Box::new(on_drop))),
        }
    }

    pub fn path(&self) -> &TreePath {
        &self.path
    }

    /// Wait for the next snapshot.
    pub async fn next(&mut self) -> Result<Option<TreeValue>, StoreError> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| StoreError::SubscriptionClosed(self.path.to_string()))
    }

    /// Next snapshot decoded as `T`.
    pub async fn next_as<T: DeserializeOwned>(&mut self) -> Result<Option<T>, StoreError> {
        let value = self.next().await?;
        decode(&self.path, value)
    }

    /// Snapshot already queued, without waiting.
    pub fn try_next(&mut self) -> Option<Option<TreeValue>> {
        self.receiver.try_recv().ok()
    }
}

impl std::fmt::Debug for TreeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSubscription")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Decode an optional tree value into a domain type.
pub fn decode<T: DeserializeOwned>(
    path: &TreePath,
    value: Option<TreeValue>,
) -> Result<Option<T>, StoreError> {
    value
        .map(|value| {
            serde_json::from_value(value).map_err(|e| StoreError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Encode a domain value for writing.
pub fn encode<T: serde::Serialize>(path: &TreePath, value: &T) -> Result<TreeValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Rejected {
        operation: "encode",
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mockall::mock! {
    pub TreeStore {}

    #[async_trait]
    impl TreeStorePort for TreeStore {
        async fn read(&self, path: &TreePath) -> Result<Option<TreeValue>, StoreError>;
        async fn write(&self, path: &TreePath, value: TreeValue) -> Result<(), StoreError>;
        async fn compare_and_set(
            &self,
            path: &TreePath,
            expected: Option<TreeValue>,
            value: TreeValue,
        ) -> Result<bool, StoreError>;
        async fn subscribe(&self, path: &TreePath) -> Result<TreeSubscription, StoreError>;
    }
}
