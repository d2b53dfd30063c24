//! Render pipeline for Mermaid diagram views.
//!
//! [`DiagramRenderPipeline`] takes [`DiagramSource`]s found on a page,
//! mounts each one as a view (replacing its code block), and compiles the
//! views strictly one at a time through a [`DiagramCompiler`]. Failed
//! compilations are mirrored into the page and retried once after a delay
//! in interactive mode.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = DiagramRenderPipeline::new(page, compiler, PipelineOptions::headless())?;
//! pipeline.enqueue(source);
//! pipeline.wait_idle().await;
//! ```

mod compiler;
mod error;
mod kind;
mod markup;
mod options;
mod pipeline;
mod task;
mod view;

pub use compiler::{CompileError, CompileFuture, DiagramCompiler, Graphic};
pub use error::RenderError;
pub use kind::DiagramKind;
pub use options::PipelineOptions;
pub use pipeline::DiagramRenderPipeline;
pub use task::{DiagramSource, RenderPipelineState, RenderTask};
pub use view::{
    ActionContext, ActionOutcome, Clipboard, DiagramView, DownloadRequest, RenderCallback,
    RenderOutcome, RenderedSize, ToolbarAction,
};

/// Class of the element wrapping a mounted view.
pub const WRAPPER_CLASS: &str = markup::WRAPPER_CLASS;
/// Attribute set on a mount whose last compilation failed.
pub const ERROR_ATTR: &str = markup::ERROR_ATTR;
