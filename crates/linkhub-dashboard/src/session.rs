use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use linkhub_store::{DocumentStore, StoreResult, Subscription};
use linkhub_types::DocPath;

use crate::snapshot::LiveSnapshot;

/// A live subscription to one profile subtree, pumping every notification
/// into a [`LiveSnapshot`].
///
/// Dropping the session aborts the pump task, which drops the store
/// subscription and detaches the listener.
#[derive(Debug)]
pub struct Session {
    path: DocPath,
    task: Option<JoinHandle<()>>,
}

impl Session {
    pub async fn open<S>(store: &S, path: DocPath, snapshot: Arc<LiveSnapshot>) -> StoreResult<Self>
    where
        S: DocumentStore + ?Sized,
    {
        let subscription = store.subscribe(&path).await?;
        let task = tokio::spawn(pump(subscription, snapshot));
        info!(path = %path, "session attached");
        Ok(Self {
            path,
            task: Some(task),
        })
    }

    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// `false` once the pump has stopped, e.g. because the store closed the
    /// subscription.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the pump and wait until the listener is detached.
    pub async fn close(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // A cancelled task reports a JoinError; that is the expected
            // outcome here.
            let _ = task.await;
        }
        debug!(path = %self.path, "session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn pump(mut subscription: Subscription, snapshot: Arc<LiveSnapshot>) {
    loop {
        match subscription.recv().await {
            Ok(value) => {
                snapshot.offer(value);
            }
            Err(e) => {
                warn!(path = %subscription.path(), error = %e, "subscription ended");
                break;
            }
        }
    }
}
