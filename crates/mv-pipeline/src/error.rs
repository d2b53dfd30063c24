//! Pipeline errors.

use mv_config::ToolbarButton;
use mv_dom::DomError;
use mv_viewport::ViewportError;

use crate::compiler::CompileError;

/// Error raised while mounting, rendering, or operating a diagram view.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The mount element never appeared within the attempt ceiling.
    #[error("Diagram container not found: {id}")]
    ContainerMissing { id: String },
    /// The code block was removed before it could be mounted.
    #[error("Diagram source is no longer attached to the page")]
    SourceDetached,
    /// The compiler rejected the diagram.
    #[error("Failed to compile diagram {id}: {source}")]
    Compile {
        id: String,
        #[source]
        source: CompileError,
    },
    #[error("Unknown diagram view: {0}")]
    UnknownView(String),
    #[error("Toolbar button {0:?} is disabled")]
    ActionDisabled(ToolbarButton),
    #[error("Diagram {0} has no rendered graphic")]
    NotRendered(String),
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Constructed outside a tokio runtime.
    #[error("No async runtime available: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}
