//! In-memory document store for tests, local tooling and ephemeral use.
//!
//! [`InMemoryDocumentStore`] keeps the whole document tree in a
//! `serde_json::Value` behind a `RwLock` and fans notifications out to
//! subscribers over per-listener broadcast channels. It can be loaded from
//! and saved to a JSON file.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, info};

use linkhub_types::{DocPath, Patch};

use crate::error::{StoreError, StoreResult};
use crate::traits::{DocumentStore, Subscription};
use crate::tree;

/// Default capacity of each listener's notification channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Internal listener: a subtree path paired with a broadcast sender.
struct Listener {
    id: u64,
    path: DocPath,
    sender: broadcast::Sender<Option<Value>>,
}

/// Registry of live listeners, shared with subscription handles so they can
/// detach themselves on drop.
#[derive(Default)]
struct ListenerRegistry {
    listeners: RwLock<Vec<Listener>>,
}

impl ListenerRegistry {
    fn detach(&self, id: u64) {
        // A poisoned lock means the store is already unusable; nothing to
        // detach from.
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.retain(|l| l.id != id);
        }
    }
}

/// An in-memory implementation of [`DocumentStore`].
///
/// Data is lost when the store is dropped unless saved with
/// [`InMemoryDocumentStore::save_json`].
pub struct InMemoryDocumentStore {
    tree: RwLock<Value>,
    registry: Arc<ListenerRegistry>,
    next_listener: AtomicU64,
    writable: AtomicBool,
    capacity: usize,
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Create a store holding `root` as its whole tree.
    pub fn from_value(mut root: Value) -> Self {
        tree::prune(&mut root);
        if !root.is_object() {
            root = Value::Object(Map::new());
        }
        Self {
            tree: RwLock::new(root),
            registry: Arc::new(ListenerRegistry::default()),
            next_listener: AtomicU64::new(0),
            writable: AtomicBool::new(true),
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Set the per-listener notification channel capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Load the whole tree from a JSON file. A missing file yields an empty
    /// store.
    pub fn load_json(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "document file not found, starting empty");
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&raw)?;
        info!(path = %path.display(), "loaded document file");
        Ok(Self::from_value(root))
    }

    /// Write the whole tree to a JSON file.
    pub fn save_json(&self, path: &Path) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(&self.snapshot()?)?;
        std::fs::write(path, raw)?;
        debug!(path = %path.display(), "saved document file");
        Ok(())
    }

    /// A copy of the whole tree.
    pub fn snapshot(&self) -> StoreResult<Value> {
        let doc = self.tree.read().map_err(poisoned)?;
        Ok(doc.clone())
    }

    /// Allow or refuse writes. A read-only store rejects every patch with
    /// [`StoreError::PermissionDenied`].
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }

    /// Current number of attached listeners.
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .listeners
            .read()
            .map(|l| l.len())
            .unwrap_or_default()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Unavailable(format!("lock poisoned: {e}"))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn read(&self, path: &DocPath) -> StoreResult<Option<Value>> {
        let doc = self.tree.read().map_err(poisoned)?;
        Ok(tree::get(&doc, path).cloned())
    }

    async fn patch(&self, root: &DocPath, patch: Patch) -> StoreResult<()> {
        patch.validate()?;
        if !self.writable.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied {
                path: root.to_string(),
            });
        }
        if patch.is_empty() {
            return Ok(());
        }

        let touched: Vec<DocPath> = patch.paths().map(|p| root.join(p)).collect();
        let entries = patch.len();

        // Notifications go out while the tree lock is held so listeners see
        // writes in the order they were applied.
        let mut doc = self.tree.write().map_err(poisoned)?;
        tree::apply(&mut doc, root, patch);

        let mut listeners = self.registry.listeners.write().map_err(poisoned)?;
        listeners.retain(|listener| {
            if touched.iter().any(|t| t.overlaps(&listener.path)) {
                let value = tree::get(&doc, &listener.path).cloned();
                // If send fails (no receivers), the listener is stale.
                listener.sender.send(value).is_ok()
            } else {
                listener.sender.receiver_count() > 0
            }
        });

        debug!(root = %root, entries, listeners = listeners.len(), "patch applied");
        Ok(())
    }

    async fn push_key(&self, parent: &DocPath) -> StoreResult<String> {
        let key = uuid::Uuid::now_v7().to_string();
        debug!(parent = %parent, key = %key, "generated child key");
        Ok(key)
    }

    async fn subscribe(&self, path: &DocPath) -> StoreResult<Subscription> {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = broadcast::channel(self.capacity);

        {
            // Holding the tree lock while registering guarantees the initial
            // value is delivered before any later write's notification.
            let doc = self.tree.read().map_err(poisoned)?;
            let mut listeners = self.registry.listeners.write().map_err(poisoned)?;
            sender
                .send(tree::get(&doc, path).cloned())
                .map_err(|_| StoreError::SubscriptionClosed {
                    path: path.to_string(),
                })?;
            listeners.push(Listener {
                id,
                path: path.clone(),
                sender,
            });
        }

        debug!(path = %path, listener = id, "listener attached");
        let registry = Arc::downgrade(&self.registry);
        let detached_path = path.clone();
        Ok(Subscription::new(path.clone(), receiver, move || {
            if let Some(registry) = registry.upgrade() {
                registry.detach(id);
                debug!(path = %detached_path, listener = id, "listener detached");
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(raw: &str) -> DocPath {
        DocPath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn read_after_patch() {
        let store = InMemoryDocumentStore::new();
        let patch = Patch::new().with(p("theme/baseTheme"), json!("Mint"));
        store.patch(&p("profile/u1"), patch).await.unwrap();

        let theme = store.read(&p("profile/u1/theme")).await.unwrap().unwrap();
        assert_eq!(theme, json!({ "baseTheme": "Mint" }));
        assert!(store.read(&p("profile/u2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patch_is_rejected_when_read_only() {
        let store = InMemoryDocumentStore::new();
        store.set_writable(false);
        let patch = Patch::new().with(p("a"), json!(1));
        let err = store.patch(&DocPath::root(), patch).await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied { .. }));
        assert!(store.read(&p("a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overlapping_patch_is_rejected_without_partial_write() {
        let store = InMemoryDocumentStore::new();
        let patch = Patch::new()
            .with(p("a/b"), json!(1))
            .with(p("a/b/c"), json!(2));
        let err = store.patch(&DocPath::root(), patch).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPatch(_)));
        assert!(store.read(&p("a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn subscription_receives_initial_value_then_changes() {
        let store = InMemoryDocumentStore::from_value(json!({
            "profile": { "u1": { "username": "alice" } }
        }));
        let mut sub = store.subscribe(&p("profile/u1")).await.unwrap();
        assert_eq!(
            sub.recv().await.unwrap(),
            Some(json!({ "username": "alice" }))
        );

        let patch = Patch::new().with(p("displayName"), json!("Alice"));
        store.patch(&p("profile/u1"), patch).await.unwrap();
        assert_eq!(
            sub.recv().await.unwrap(),
            Some(json!({ "username": "alice", "displayName": "Alice" }))
        );
    }

    #[tokio::test]
    async fn unrelated_writes_do_not_notify() {
        let store = InMemoryDocumentStore::new();
        let mut sub = store.subscribe(&p("profile/u1")).await.unwrap();
        assert_eq!(sub.recv().await.unwrap(), None);

        let patch = Patch::new().with(p("username"), json!("bob"));
        store.patch(&p("profile/u2"), patch).await.unwrap();
        assert!(sub.try_recv().unwrap().is_none());
    }

    #[tokio::test]
    async fn identical_write_is_redelivered() {
        let store = InMemoryDocumentStore::new();
        let mut sub = store.subscribe(&p("doc")).await.unwrap();
        sub.recv().await.unwrap();

        for _ in 0..2 {
            let patch = Patch::new().with(p("k"), json!("v"));
            store.patch(&p("doc"), patch).await.unwrap();
        }
        assert_eq!(sub.recv().await.unwrap(), Some(json!({ "k": "v" })));
        assert_eq!(sub.recv().await.unwrap(), Some(json!({ "k": "v" })));
    }

    #[tokio::test]
    async fn dropping_subscription_detaches_listener() {
        let store = InMemoryDocumentStore::new();
        let sub = store.subscribe(&p("doc")).await.unwrap();
        let other = store.subscribe(&p("doc")).await.unwrap();
        assert_eq!(store.subscriber_count(), 2);

        drop(sub);
        assert_eq!(store.subscriber_count(), 1);
        other.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn push_keys_are_unique_segments() {
        let store = InMemoryDocumentStore::new();
        let parent = p("profile/u1/links/custom");
        let a = store.push_key(&parent).await.unwrap();
        let b = store.push_key(&parent).await.unwrap();
        assert_ne!(a, b);
        assert!(parent.child(&a).is_ok());
    }

    #[tokio::test]
    async fn json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.json");

        let store = InMemoryDocumentStore::load_json(&file).unwrap();
        let patch = Patch::new().with(p("profile/u1/username"), json!("alice"));
        store.patch(&DocPath::root(), patch).await.unwrap();
        store.save_json(&file).unwrap();

        let reloaded = InMemoryDocumentStore::load_json(&file).unwrap();
        assert_eq!(
            reloaded.read(&p("profile/u1/username")).await.unwrap(),
            Some(json!("alice"))
        );
    }
}
