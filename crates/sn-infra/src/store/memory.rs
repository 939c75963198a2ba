use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use sn_core::ports::{StoreError, TreeStorePort, TreeSubscription};
use sn_core::tree::{normalize, set_at, value_at, TreePath, TreeValue};

struct Subscriber {
    path: TreePath,
    last: Option<TreeValue>,
    sender: mpsc::UnboundedSender<Option<TreeValue>>,
}

#[derive(Default)]
struct Inner {
    tree: TreeValue,
    subscribers: HashMap<u64, Subscriber>,
    next_id: u64,
}

impl Inner {
    fn snapshot(&self, path: &TreePath) -> Option<TreeValue> {
        value_at(&self.tree, path).cloned()
    }

    fn apply(&mut self, path: &TreePath, value: TreeValue) {
        set_at(&mut self.tree, path, value);

        let tree = &self.tree;
        self.subscribers.retain(|_, subscriber| {
            if !subscriber.path.overlaps(path) {
                return true;
            }
            let snapshot = value_at(tree, &subscriber.path).cloned();
            if snapshot == subscriber.last {
                return true;
            }
            subscriber.last = snapshot.clone();
            subscriber.sender.send(snapshot).is_ok()
        });
    }
}

/// Process-local tree store.
///
/// Every clone shares the same tree, so several principals in one process
/// (tests, the demo) observe each other's writes. Subscribers are only
/// notified when the value they watch actually changes.
#[derive(Clone, Default)]
pub struct InMemoryTreeStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing tree.
    pub fn with_tree(tree: TreeValue) -> Self {
        let inner = Inner {
            tree: normalize(tree),
            ..Inner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Copy of the whole tree.
    pub fn dump(&self) -> Result<TreeValue, StoreError> {
        Ok(self.lock()?.tree.clone())
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().map(|inner| inner.subscribers.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory tree lock poisoned".into()))
    }
}

fn unsubscribe(inner: Weak<Mutex<Inner>>, id: u64) {
    if let Some(inner) = inner.upgrade() {
        if let Ok(mut guard) = inner.lock() {
            guard.subscribers.remove(&id);
        }
    }
}

#[async_trait]
impl TreeStorePort for InMemoryTreeStore {
    async fn read(&self, path: &TreePath) -> Result<Option<TreeValue>, StoreError> {
        Ok(self.lock()?.snapshot(path))
    }

    async fn write(&self, path: &TreePath, value: TreeValue) -> Result<(), StoreError> {
        debug!(path = %path, delete = value.is_null(), "memory store write");
        self.lock()?.apply(path, value);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        path: &TreePath,
        expected: Option<TreeValue>,
        value: TreeValue,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let expected = expected.map(normalize).filter(|v| !v.is_null());
        if inner.snapshot(path) != expected {
            debug!(path = %path, "memory store compare_and_set precondition failed");
            return Ok(false);
        }
        inner.apply(path, value);
        Ok(true)
    }

    async fn subscribe(&self, path: &TreePath) -> Result<TreeSubscription, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.next_id += 1;

        let current = inner.snapshot(path);
        sender
            .send(current.clone())
            .map_err(|_| StoreError::SubscriptionClosed(path.to_string()))?;
        inner.subscribers.insert(
            id,
            Subscriber {
                path: path.clone(),
                last: current,
                sender,
            },
        );
        debug!(path = %path, id, "memory store subscribe");

        let weak = Arc::downgrade(&self.inner);
        Ok(TreeSubscription::new(path.clone(), receiver, move || {
            unsubscribe(weak, id)
        }))
    }
}
