//! Child-list mutation observation.

use tokio::sync::mpsc;

use crate::document::NodeId;

/// One child-list change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Node whose children changed.
    pub target: NodeId,
    /// Nodes inserted into `target`.
    pub added_nodes: Vec<NodeId>,
    /// Nodes removed from `target`.
    pub removed_nodes: Vec<NodeId>,
}

/// Registration kept by the document.
#[derive(Debug)]
pub(crate) struct ObserverEntry {
    pub(crate) id: u64,
    pub(crate) target: NodeId,
    pub(crate) sender: mpsc::UnboundedSender<MutationRecord>,
}

/// Receiving side of a mutation observer.
///
/// Dropping the observer disconnects it; the document prunes closed
/// registrations on its next mutation.
#[derive(Debug)]
pub struct MutationObserver {
    id: u64,
    receiver: mpsc::UnboundedReceiver<MutationRecord>,
}

impl MutationObserver {
    pub(crate) fn new(id: u64, receiver: mpsc::UnboundedReceiver<MutationRecord>) -> Self {
        Self { id, receiver }
    }

    /// Observer identifier, unique per document.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next record. Returns `None` once the document is gone.
    pub async fn recv(&mut self) -> Option<MutationRecord> {
        self.receiver.recv().await
    }

    /// Take a pending record without waiting.
    pub fn try_recv(&mut self) -> Option<MutationRecord> {
        self.receiver.try_recv().ok()
    }

    /// Take every pending record.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stop observing.
    pub fn disconnect(mut self) {
        self.receiver.close();
    }
}
