//! Renderer lifecycle.

use std::sync::Arc;

use mv_config::{ConfigBus, MermaidConfig, ToolbarInput};
use mv_dom::Page;
use mv_orchestrator::{
    HostSignal, OrchestratorError, OrchestratorHandle, OrchestratorOptions, OrchestratorStatus,
    ReadyState, RenderOrchestrator,
};
use mv_pipeline::{DiagramCompiler, DiagramRenderPipeline, PipelineOptions};
use tokio::sync::mpsc;

/// Settings applied when a renderer is created or updated.
#[derive(Debug, Clone, Default)]
pub struct RendererSettings {
    /// Toolbar overrides or an already resolved toolbar.
    pub toolbar: Option<ToolbarInput>,
    /// Partial compiler configuration merged over the defaults.
    pub config: Option<MermaidConfig>,
    pub pipeline: PipelineOptions,
    pub orchestrator: OrchestratorOptions,
}

/// Page the renderer works on plus the host inputs it consumes.
pub struct HostBinding {
    pub page: Page,
    pub compiler: Arc<dyn DiagramCompiler>,
    pub ready_state: ReadyState,
    pub signals: mpsc::Receiver<HostSignal>,
}

/// A running renderer: pipeline, configuration bus, and orchestrator.
#[derive(Debug)]
pub struct MermaidRenderer {
    page: Page,
    handle: OrchestratorHandle,
}

impl MermaidRenderer {
    /// Build the pipeline and start the orchestrator.
    ///
    /// This is the only fallible entry point; per-diagram and per-scan
    /// failures are logged and never surface here.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Initialization`] or
    /// [`OrchestratorError::Runtime`] when called outside a tokio runtime.
    pub fn initialize(host: HostBinding, settings: RendererSettings) -> Result<Self, OrchestratorError> {
        Self::start(host, settings).inspect_err(|err| {
            tracing::error!(error = %err, "Failed to initialize Mermaid renderer");
        })
    }

    fn start(host: HostBinding, settings: RendererSettings) -> Result<Self, OrchestratorError> {
        let HostBinding {
            page,
            compiler,
            ready_state,
            signals,
        } = host;

        let pipeline = DiagramRenderPipeline::new(page.clone(), compiler, settings.pipeline)?;
        if let Some(toolbar) = settings.toolbar {
            pipeline.set_toolbar(toolbar.into_resolved());
        }

        let bus = ConfigBus::new(settings.config.clone().unwrap_or_default());

        let handle = RenderOrchestrator::spawn(
            page.clone(),
            pipeline,
            bus,
            settings.orchestrator,
            ready_state,
            signals,
        )?;
        tracing::debug!("Mermaid renderer started");
        Ok(Self { page, handle })
    }

    /// Apply the toolbar and configuration parts of `settings`.
    ///
    /// Timing options only take effect on creation.
    pub fn merge(&self, settings: RendererSettings) {
        if let Some(toolbar) = settings.toolbar {
            self.handle.set_toolbar(toolbar);
        }
        if let Some(config) = &settings.config {
            self.handle.set_config(config);
        }
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn handle(&self) -> &OrchestratorHandle {
        &self.handle
    }

    #[must_use]
    pub fn pipeline(&self) -> &Arc<DiagramRenderPipeline> {
        self.handle.pipeline()
    }

    #[must_use]
    pub fn status(&self) -> OrchestratorStatus {
        self.handle.status()
    }

    pub async fn shutdown(&self) {
        self.handle.shutdown().await;
    }
}

/// Explicitly owned home of at most one renderer.
///
/// The first [`get_or_create`](Self::get_or_create) builds the renderer;
/// later calls merge their settings into it.
#[derive(Debug, Default)]
pub struct RendererSlot {
    renderer: Option<MermaidRenderer>,
}

impl RendererSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<&MermaidRenderer> {
        self.renderer.as_ref()
    }

    /// Return the renderer, creating it from `host` on first use.
    ///
    /// `host` is only called when the slot is empty.
    ///
    /// # Errors
    ///
    /// Propagates initialization failures. The slot stays empty.
    pub fn get_or_create(
        &mut self,
        settings: RendererSettings,
        host: impl FnOnce() -> HostBinding,
    ) -> Result<&MermaidRenderer, OrchestratorError> {
        let renderer = match self.renderer.take() {
            Some(existing) => {
                existing.merge(settings);
                existing
            }
            None => MermaidRenderer::initialize(host(), settings)?,
        };
        Ok(self.renderer.insert(renderer))
    }

    /// Shut the renderer down and empty the slot.
    pub async fn clear(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            renderer.shutdown().await;
        }
    }
}
