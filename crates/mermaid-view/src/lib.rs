//! Interactive Mermaid diagrams for documentation pages.
//!
//! Discovers fenced Mermaid blocks in a page, replaces each with a pannable,
//! zoomable view, and keeps them rendered across client-side navigation.
//! The diagram compiler is supplied by the host through [`DiagramCompiler`].
//!
//! # Example
//!
//! ```ignore
//! use mermaid_view::{HostBinding, MermaidRenderer, ReadyState, RendererSettings};
//!
//! let renderer = MermaidRenderer::initialize(
//!     HostBinding { page, compiler, ready_state: ReadyState::Complete, signals },
//!     RendererSettings::default(),
//! )?;
//! ```

mod renderer;

pub use renderer::{HostBinding, MermaidRenderer, RendererSettings, RendererSlot};

pub use mv_config::{
    ConfigBus, ConfigError, DownloadFormat, MermaidConfig, MermaidToolbarOptions,
    ResolvedToolbarConfig, Subscription, ToolbarButton, ToolbarInput, ToolbarMode,
    is_resolved_toolbar_config, resolve,
};
pub use mv_dom::{Document, DomError, NodeId, Page, Selector};
pub use mv_orchestrator::{
    HostSignal, OrchestratorError, OrchestratorHandle, OrchestratorOptions, OrchestratorPhase,
    OrchestratorStatus, ReadyState,
};
pub use mv_pipeline::{
    ActionContext, ActionOutcome, Clipboard, CompileError, CompileFuture, DiagramCompiler,
    DiagramKind, DiagramRenderPipeline, DiagramView, DownloadRequest, Graphic, PipelineOptions,
    RenderError, RenderOutcome, ToolbarAction,
};
pub use mv_viewport::{
    FullscreenEntry, FullscreenHost, LogNotifier, Notifier, ViewportController, ViewportError,
    ViewportState,
};
