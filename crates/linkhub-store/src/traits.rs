//! The [`DocumentStore`] trait defining the remote document interface.
//!
//! Any backend (in-memory, a hosted realtime database) implements this trait
//! to give the dashboard engine path-addressed access to profile documents.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

use linkhub_types::{DocPath, Patch};

use crate::error::{StoreError, StoreResult};

/// Remote hierarchical document store.
///
/// Implementations must be thread-safe (`Send + Sync`) and uphold:
/// - `patch` is atomic: either every entry is applied or none is, and no
///   subscriber observes a state with only part of a patch applied.
/// - Empty objects and `null` values are never stored; deleting the last
///   child of an object deletes the object.
/// - A subscription receives the current value of its subtree immediately,
///   then the full subtree again after every write that touches it,
///   including writes issued by the subscriber itself.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the whole subtree at `path`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    async fn read(&self, path: &DocPath) -> StoreResult<Option<Value>>;

    /// Apply every entry of `patch`, relative to `root`, as one atomic
    /// write.
    async fn patch(&self, root: &DocPath, patch: Patch) -> StoreResult<()>;

    /// Generate a fresh, unused child key under `parent`.
    ///
    /// Keys are time-ordered so that children sort in creation order. The
    /// key is not reserved; nothing is written until a patch uses it.
    async fn push_key(&self, parent: &DocPath) -> StoreResult<String>;

    /// Subscribe to the subtree at `path`.
    ///
    /// Dropping the returned [`Subscription`] detaches the listener.
    async fn subscribe(&self, path: &DocPath) -> StoreResult<Subscription>;
}

/// A live subtree subscription.
///
/// Each notification carries the full subtree value (`None` when the subtree
/// is empty). The listener is detached when the handle is dropped, on every
/// exit path.
pub struct Subscription {
    path: DocPath,
    receiver: broadcast::Receiver<Option<Value>>,
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a notification receiver. `detach` runs exactly once, when the
    /// subscription is dropped.
    pub fn new(
        path: DocPath,
        receiver: broadcast::Receiver<Option<Value>>,
        detach: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            path,
            receiver,
            detach: Some(Box::new(detach)),
        }
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Wait for the next notification.
    ///
    /// If the subscriber fell behind, skipped notifications are dropped and
    /// the next retained one is returned; every notification carries a
    /// full subtree, so only the latest matters.
    pub async fn recv(&mut self) -> StoreResult<Option<Value>> {
        loop {
            match self.receiver.recv().await {
                Ok(value) => return Ok(value),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(path = %self.path, skipped, "subscription lagged");
                }
                Err(RecvError::Closed) => {
                    return Err(StoreError::SubscriptionClosed {
                        path: self.path.to_string(),
                    })
                }
            }
        }
    }

    /// Take the next notification if one is already queued.
    pub fn try_recv(&mut self) -> StoreResult<Option<Option<Value>>> {
        loop {
            match self.receiver.try_recv() {
                Ok(value) => return Ok(Some(value)),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Closed) => {
                    return Err(StoreError::SubscriptionClosed {
                        path: self.path.to_string(),
                    })
                }
            }
        }
    }

    /// Detach the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
