//! Queue entries.

use std::collections::VecDeque;

use mv_dom::NodeId;
use tokio::time::Instant;

/// Diagram code found on the page, not yet mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource {
    /// Trimmed source text at discovery time.
    pub raw_code: String,
    /// Host element (the code block) the view will replace.
    pub host: NodeId,
    pub discovered_at: Instant,
}

impl DiagramSource {
    #[must_use]
    pub fn new(raw_code: impl Into<String>, host: NodeId) -> Self {
        Self {
            raw_code: raw_code.into(),
            host,
            discovered_at: Instant::now(),
        }
    }
}

/// One unit of pipeline work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTask {
    pub source: DiagramSource,
    /// Attempts spent so far; only the pipeline advances it.
    pub attempt: u32,
    pub max_attempts: u32,
    /// Id of the mounted view. `None` until the source has been mounted.
    pub mount_id: Option<String>,
}

impl RenderTask {
    #[must_use]
    pub fn new(source: DiagramSource, max_attempts: u32) -> Self {
        Self {
            source,
            attempt: 0,
            max_attempts,
            mount_id: None,
        }
    }

    /// Task re-rendering an already mounted view.
    #[must_use]
    pub fn for_view(source: DiagramSource, mount_id: String, attempt: u32, max_attempts: u32) -> Self {
        Self {
            source,
            attempt,
            max_attempts,
            mount_id: Some(mount_id),
        }
    }
}

/// Queue plus the draining flag.
#[derive(Debug, Default)]
pub struct RenderPipelineState {
    pub queue: VecDeque<RenderTask>,
    pub draining: bool,
}
