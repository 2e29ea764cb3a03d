//! The change-filtered profile snapshot.
//!
//! Remote notifications arrive far more often than the profile actually
//! changes: every write re-delivers the full subtree, including writes this
//! session issued itself. [`LiveSnapshot`] decodes each notification into a
//! typed [`Profile`] and only replaces the retained value when it differs
//! structurally from the last accepted one.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use linkhub_types::Profile;

use crate::busy::BusyFlag;

/// Receiver side of the snapshot stream. Holds only the latest value.
pub type SnapshotStream = watch::Receiver<Option<Arc<Profile>>>;

/// What [`LiveSnapshot::offer`] did with a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offer {
    /// The value differed and replaced the snapshot.
    Accepted,
    /// The value equalled the current snapshot and was dropped.
    Unchanged,
    /// The value could not be decoded and was dropped.
    Malformed,
}

/// The latest accepted profile snapshot, absent until the first
/// notification carrying a document.
#[derive(Debug)]
pub struct LiveSnapshot {
    sender: watch::Sender<Option<Arc<Profile>>>,
    busy: Arc<BusyFlag>,
}

impl LiveSnapshot {
    pub fn new(busy: Arc<BusyFlag>) -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender, busy }
    }

    pub fn current(&self) -> Option<Arc<Profile>> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.sender.subscribe()
    }

    /// Offer a raw subtree value from the store.
    ///
    /// Equal values produce no emission and leave the busy flag alone.
    pub fn offer(&self, value: Option<Value>) -> Offer {
        let next = match value.map(Profile::from_value).transpose() {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "dropping malformed profile notification");
                return Offer::Malformed;
            }
        };

        let changed = self.sender.send_if_modified(move |slot| {
            if slot.as_deref() == next.as_ref() {
                return false;
            }
            *slot = next.map(Arc::new);
            true
        });

        if changed {
            self.busy.clear();
            debug!("profile snapshot accepted");
            Offer::Accepted
        } else {
            debug!("profile snapshot unchanged, suppressed");
            Offer::Unchanged
        }
    }
}
