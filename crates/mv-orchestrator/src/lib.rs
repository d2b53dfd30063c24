//! Page-wide discovery of Mermaid diagrams.
//!
//! The orchestrator waits for the host page to become ready, scans it for
//! fenced Mermaid blocks, and hands every new block to the render pipeline.
//! When a scan finds nothing it retries with capped exponential backoff;
//! navigation signals and relevant DOM mutations start a fresh cycle.
//!
//! Mutations produced by the pipeline itself (views mounting inside
//! `.mermaid-wrapper`) never trigger rediscovery.

mod discovery;
mod options;
mod orchestrator;
mod retry;
mod signals;
mod styles;
mod watcher;

pub use discovery::{PROCESSED_ATTR, discover};
pub use options::OrchestratorOptions;
pub use orchestrator::{OrchestratorHandle, OrchestratorPhase, OrchestratorStatus, RenderOrchestrator};
pub use retry::RetryScheduler;
pub use signals::{HostSignal, ReadyState};
pub use styles::{STYLE_ELEMENT_ID, ensure_styles};
pub use watcher::{MutationWatcher, is_relevant, observe_target};

use mv_dom::DomError;
use mv_pipeline::RenderError;

/// Orchestrator error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OrchestratorError {
    /// Setting up the render pipeline failed.
    #[error("Failed to initialize diagram rendering: {0}")]
    Initialization(#[from] RenderError),
    /// Started outside a tokio runtime.
    #[error("No async runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    /// A diagram block could not be prepared.
    #[error("Failed to prepare diagram block: {0}")]
    Discovery(#[from] DomError),
    /// The orchestrator loop has exited.
    #[error("Diagram orchestrator has stopped")]
    Stopped,
}
