//! Shared page handle.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::document::Document;

/// Cloneable handle to the document shared by the orchestrator, the render
/// pipeline, and host bindings.
///
/// Guards must not be held across `.await` points.
#[derive(Clone, Debug, Default)]
pub struct Page {
    document: Arc<Mutex<Document>>,
}

impl Page {
    /// Wrap a document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document: Arc::new(Mutex::new(document)),
        }
    }

    /// Lock the document.
    pub fn lock(&self) -> MutexGuard<'_, Document> {
        self.document.lock()
    }

    /// Run a closure against the locked document.
    pub fn with<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.document.lock())
    }
}
