//! Single-lane render queue.

use std::sync::{Arc, Weak};

use mv_config::{ConfigBus, MermaidConfig, ResolvedToolbarConfig, Subscription};
use mv_dom::{NodeId, Page, Selector};
use mv_viewport::ViewportController;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::compiler::DiagramCompiler;
use crate::error::RenderError;
use crate::kind::DiagramKind;
use crate::markup::{self, RenderingMarker};
use crate::options::PipelineOptions;
use crate::task::{DiagramSource, RenderPipelineState, RenderTask};
use crate::view::{
    ActionContext, ActionOutcome, DiagramView, DownloadRequest, RenderCallback, RenderOutcome,
    RenderedSize, ToolbarAction,
};

/// Mounts diagram sources as views and compiles them one at a time.
///
/// Always used behind an [`Arc`]: enqueueing spawns the drain loop onto the
/// runtime the pipeline was created in, and delayed retries hold a weak
/// reference back to the pipeline.
pub struct DiagramRenderPipeline {
    page: Page,
    compiler: Arc<dyn DiagramCompiler>,
    options: PipelineOptions,
    runtime: Handle,
    state: Mutex<RenderPipelineState>,
    views: Mutex<Vec<DiagramView>>,
    config: Mutex<MermaidConfig>,
    toolbar: Mutex<Arc<ResolvedToolbarConfig>>,
    on_render: Mutex<Option<RenderCallback>>,
    idle: watch::Sender<bool>,
    config_subscription: Mutex<Option<Subscription>>,
}

impl std::fmt::Debug for DiagramRenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DiagramRenderPipeline")
            .field("queued", &state.queue.len())
            .field("draining", &state.draining)
            .field("views", &self.views.lock().len())
            .finish_non_exhaustive()
    }
}

impl DiagramRenderPipeline {
    /// Create a pipeline bound to the current tokio runtime.
    ///
    /// The compiler is initialized with [`MermaidConfig::defaults`].
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Runtime`] when called outside a runtime.
    pub fn new(
        page: Page,
        compiler: Arc<dyn DiagramCompiler>,
        options: PipelineOptions,
    ) -> Result<Arc<Self>, RenderError> {
        let runtime = Handle::try_current()?;
        let config = MermaidConfig::defaults();
        compiler.initialize(&config);
        let (idle, _) = watch::channel(true);

        Ok(Arc::new(Self {
            page,
            compiler,
            options,
            runtime,
            state: Mutex::new(RenderPipelineState::default()),
            views: Mutex::new(Vec::new()),
            config: Mutex::new(config),
            toolbar: Mutex::new(Arc::new(ResolvedToolbarConfig::default())),
            on_render: Mutex::new(None),
            idle,
            config_subscription: Mutex::new(None),
        }))
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    // -- Queue -------------------------------------------------------------

    /// Queue a freshly discovered source.
    pub fn enqueue(self: &Arc<Self>, source: DiagramSource) {
        self.enqueue_task(RenderTask::new(source, self.options.max_attempts));
    }

    /// Queue a task, starting the drain loop unless one is already running.
    pub fn enqueue_task(self: &Arc<Self>, task: RenderTask) {
        let start = {
            let mut state = self.state.lock();
            state.queue.push_back(task);
            let start = !state.draining;
            state.draining = true;
            self.idle.send_replace(false);
            start
        };

        if start {
            tracing::debug!("Starting render drain");
            let pipeline = Arc::clone(self);
            self.runtime.spawn(async move { pipeline.drain().await });
        }
    }

    async fn drain(self: Arc<Self>) {
        loop {
            let task = {
                let mut state = self.state.lock();
                if let Some(task) = state.queue.pop_front() {
                    task
                } else {
                    state.draining = false;
                    self.idle.send_replace(true);
                    tracing::debug!("Render queue drained");
                    return;
                }
            };
            self.process(task).await;
        }
    }

    /// Number of tasks waiting behind the one in progress.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Whether nothing is queued or in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self.idle.borrow()
    }

    /// Watch the idle flag. It flips to `false` synchronously on enqueue.
    #[must_use]
    pub fn subscribe_idle(&self) -> watch::Receiver<bool> {
        self.idle.subscribe()
    }

    /// Wait until the queue is empty and no task is in progress.
    pub async fn wait_idle(&self) {
        let mut idle = self.idle.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = idle.wait_for(|idle| *idle).await;
    }

    // -- Processing --------------------------------------------------------

    async fn process(self: &Arc<Self>, mut task: RenderTask) {
        let mount_id = if let Some(id) = task.mount_id.clone() {
            id
        } else {
            match self.mount(&task.source) {
                Ok(id) => {
                    task.mount_id = Some(id.clone());
                    id
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping diagram source");
                    return;
                }
            }
        };

        match self.render(&mut task, &mount_id).await {
            Ok(()) => tracing::debug!(id = %mount_id, "Rendered diagram"),
            Err(err) => tracing::warn!(id = %mount_id, error = %err, "Diagram render failed"),
        }
    }

    /// Replace the source's host element with a new view.
    fn mount(&self, source: &DiagramSource) -> Result<String, RenderError> {
        let toolbar = Arc::clone(&*self.toolbar.lock());
        let (ids, code, viewport_width) = self.page.with(|doc| {
            let parent = doc.parent(source.host).ok_or(RenderError::SourceDetached)?;
            let code = doc.text_content(source.host).trim().to_owned();
            let ids = markup::build_view(doc, &code);
            doc.replace_child(parent, ids.wrapper, source.host)?;
            Ok::<_, RenderError>((ids, code, doc.viewport_width()))
        })?;

        tracing::debug!(id = %ids.mount_id, "Mounted diagram view");
        let view = DiagramView {
            mount_id: ids.mount_id.clone(),
            wrapper_id: ids.wrapper_id,
            kind: DiagramKind::detect(&code),
            source: DiagramSource {
                raw_code: code,
                ..source.clone()
            },
            mounted: true,
            is_rendered: false,
            render_error: false,
            render_error_details: None,
            rendered_size: RenderedSize::default(),
            toolbar,
            viewport: ViewportController::new(viewport_width),
        };
        self.views.lock().push(view);
        Ok(ids.mount_id)
    }

    async fn find_mount(&self, task: &mut RenderTask, mount_id: &str) -> Result<NodeId, RenderError> {
        loop {
            let found = self.page.lock().get_element_by_id(mount_id);
            if let Some(node) = found {
                return Ok(node);
            }
            if task.attempt >= task.max_attempts {
                return Err(RenderError::ContainerMissing {
                    id: mount_id.to_owned(),
                });
            }
            tracing::warn!(
                id = %mount_id,
                attempt = task.attempt + 1,
                max_attempts = task.max_attempts + 1,
                "Diagram container not found, retrying"
            );
            tokio::time::sleep(self.options.lookup_delay(task.attempt)).await;
            task.attempt += 1;
        }
    }

    async fn render(self: &Arc<Self>, task: &mut RenderTask, mount_id: &str) -> Result<(), RenderError> {
        let mount = self.find_mount(task, mount_id).await?;
        let (code, kind) = self
            .with_view(mount_id, |view| (view.code().to_owned(), view.kind))
            .ok_or_else(|| RenderError::UnknownView(mount_id.to_owned()))?;

        self.page.with(|doc| markup::reset_mount(doc, mount, &code));
        let marker = RenderingMarker::set(&self.page, mount);
        let config = self.config.lock().clone();

        match self.compiler.compile(&code, &config).await {
            Ok(graphic) => {
                self.page.with(|doc| markup::mount_graphic(doc, mount, &graphic));
                tokio::time::sleep(self.options.settle_delay).await;
                self.update_view(mount_id, |view| {
                    view.is_rendered = true;
                    view.render_error = false;
                    view.render_error_details = None;
                });
                drop(marker);

                let svg = self
                    .page
                    .with(|doc| doc.query_selector(mount, &Selector::tag("svg")));
                if let Some(svg) = svg {
                    tokio::time::sleep(self.options.settle_delay).await;
                    let size = self
                        .page
                        .with(|doc| markup::normalize_size(doc, mount, svg, kind));
                    self.update_view(mount_id, |view| view.rendered_size = size);
                }

                self.notify(RenderOutcome {
                    id: mount_id.to_owned(),
                    success: true,
                    error: None,
                });
                Ok(())
            }
            Err(err) => {
                let details = err.to_string();
                self.page.with(|doc| markup::mark_error(doc, mount, &details));
                self.update_view(mount_id, |view| {
                    view.render_error = true;
                    view.render_error_details = Some(details.clone());
                    // Rendered so the error is displayed.
                    view.is_rendered = true;
                });
                drop(marker);

                self.notify(RenderOutcome {
                    id: mount_id.to_owned(),
                    success: false,
                    error: Some(details),
                });

                if task.attempt == 0 && self.options.auto_retry {
                    self.schedule_retry(task);
                }
                Err(RenderError::Compile {
                    id: mount_id.to_owned(),
                    source: err,
                })
            }
        }
    }

    fn schedule_retry(self: &Arc<Self>, task: &RenderTask) {
        let mut retry = task.clone();
        retry.attempt += 1;
        let delay = self.options.retry_delay;
        let pipeline: Weak<Self> = Arc::downgrade(self);
        tracing::debug!(id = ?retry.mount_id, ?delay, "Scheduling compile retry");

        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(pipeline) = pipeline.upgrade() {
                pipeline.enqueue_task(retry);
            }
        });
    }

    // -- Callback ----------------------------------------------------------

    /// Register the render-complete callback, replacing any previous one.
    pub fn set_render_callback(&self, callback: impl Fn(&RenderOutcome) + Send + Sync + 'static) {
        *self.on_render.lock() = Some(Arc::new(callback));
    }

    fn notify(&self, outcome: RenderOutcome) {
        let callback = self.on_render.lock().clone();
        if let Some(callback) = callback {
            callback(&outcome);
        }
    }

    // -- Configuration -----------------------------------------------------

    /// Follow the bus: apply its current configuration now and re-render
    /// every rendered view whenever it changes.
    pub fn attach_config(self: &Arc<Self>, bus: &ConfigBus) {
        self.apply_config(&bus.config());

        let pipeline = Arc::downgrade(self);
        let subscription = bus.subscribe(move |config| {
            if let Some(pipeline) = pipeline.upgrade() {
                pipeline.apply_config(config);
                let count = pipeline.rerender_all();
                tracing::debug!(count, "Re-rendering diagrams after config change");
            }
        });
        *self.config_subscription.lock() = Some(subscription);
    }

    fn apply_config(&self, user: &MermaidConfig) {
        let merged = MermaidConfig::defaults().merged(user);
        self.compiler.initialize(&merged);
        *self.config.lock() = merged;
    }

    /// Compiler configuration in effect.
    #[must_use]
    pub fn config(&self) -> MermaidConfig {
        self.config.lock().clone()
    }

    /// Queue every rendered view again. Returns the number queued.
    pub fn rerender_all(self: &Arc<Self>) -> usize {
        let tasks: Vec<RenderTask> = self
            .views
            .lock()
            .iter()
            .filter(|view| view.is_rendered)
            .map(|view| {
                RenderTask::for_view(
                    view.source.clone(),
                    view.mount_id.clone(),
                    0,
                    self.options.max_attempts,
                )
            })
            .collect();

        let count = tasks.len();
        for task in tasks {
            self.enqueue_task(task);
        }
        count
    }

    /// Toolbar configuration for views mounted from now on.
    pub fn set_toolbar(&self, toolbar: ResolvedToolbarConfig) {
        *self.toolbar.lock() = Arc::new(toolbar);
    }

    #[must_use]
    pub fn toolbar(&self) -> Arc<ResolvedToolbarConfig> {
        Arc::clone(&*self.toolbar.lock())
    }

    // -- Views -------------------------------------------------------------

    /// Snapshot of a view.
    #[must_use]
    pub fn view(&self, mount_id: &str) -> Option<DiagramView> {
        self.with_view(mount_id, Clone::clone)
    }

    /// Snapshot of every view, in mount order.
    #[must_use]
    pub fn views(&self) -> Vec<DiagramView> {
        self.views.lock().clone()
    }

    fn with_view<R>(&self, mount_id: &str, f: impl FnOnce(&DiagramView) -> R) -> Option<R> {
        self.views
            .lock()
            .iter()
            .find(|view| view.mount_id == mount_id)
            .map(f)
    }

    fn update_view(&self, mount_id: &str, f: impl FnOnce(&mut DiagramView)) {
        if let Some(view) = self
            .views
            .lock()
            .iter_mut()
            .find(|view| view.mount_id == mount_id)
        {
            f(view);
        }
    }

    /// Drive a view's viewport directly (gestures) and apply the resulting
    /// transform to the page.
    pub fn with_viewport<R>(
        &self,
        mount_id: &str,
        f: impl FnOnce(&mut ViewportController) -> R,
    ) -> Option<R> {
        let (result, wrapper_id, transform) = {
            let mut views = self.views.lock();
            let view = views.iter_mut().find(|view| view.mount_id == mount_id)?;
            let result = f(&mut view.viewport);
            (result, view.wrapper_id.clone(), view.viewport.css_transform())
        };
        self.apply_transform(&wrapper_id, &transform);
        Some(result)
    }

    /// Run a toolbar action on a view.
    ///
    /// # Errors
    ///
    /// Fails for unknown views, buttons disabled in the current toolbar mode,
    /// and failures of the host capability the action needs.
    pub fn dispatch(
        &self,
        mount_id: &str,
        action: ToolbarAction,
        ctx: &mut ActionContext<'_>,
    ) -> Result<ActionOutcome, RenderError> {
        let mut views = self.views.lock();
        let view = views
            .iter_mut()
            .find(|view| view.mount_id == mount_id)
            .ok_or_else(|| RenderError::UnknownView(mount_id.to_owned()))?;

        if let Some(button) = action.button()
            && !view.toolbar.mode(view.toolbar_mode()).is_enabled(button)
        {
            return Err(RenderError::ActionDisabled(button));
        }

        let outcome = match action {
            ToolbarAction::ZoomIn => {
                view.viewport.zoom_in();
                ActionOutcome::Viewport(*view.viewport.state())
            }
            ToolbarAction::ZoomOut => {
                view.viewport.zoom_out();
                ActionOutcome::Viewport(*view.viewport.state())
            }
            ToolbarAction::ResetView => {
                view.viewport.reset_view();
                ActionOutcome::Viewport(*view.viewport.state())
            }
            ToolbarAction::CopyCode => {
                ctx.clipboard
                    .write_text(view.code())
                    .map_err(RenderError::Clipboard)?;
                ActionOutcome::Copied
            }
            ToolbarAction::ToggleFullscreen => {
                let active = view
                    .viewport
                    .toggle_fullscreen(&mut *ctx.fullscreen, ctx.notifier)?;
                ActionOutcome::Fullscreen(active)
            }
            ToolbarAction::Download => {
                let format = view.toolbar.download_format;
                let svg = self
                    .page
                    .with(|doc| {
                        let mount = doc.get_element_by_id(mount_id)?;
                        let svg = doc.query_selector(mount, &Selector::tag("svg"))?;
                        Some(doc.outer_html(svg))
                    })
                    .ok_or_else(|| RenderError::NotRendered(mount_id.to_owned()))?;
                ActionOutcome::Download(DownloadRequest {
                    format,
                    file_name: format!("{mount_id}.{}", format.extension()),
                    mime_type: format.mime_type(),
                    svg,
                })
            }
        };

        let wrapper_id = view.wrapper_id.clone();
        let transform = view.viewport.css_transform();
        drop(views);

        if matches!(outcome, ActionOutcome::Viewport(_)) {
            self.apply_transform(&wrapper_id, &transform);
        }
        Ok(outcome)
    }

    fn apply_transform(&self, wrapper_id: &str, transform: &str) {
        self.page.with(|doc| {
            let target = doc.get_element_by_id(wrapper_id).and_then(|wrapper| {
                doc.query_selector(wrapper, &Selector::class(markup::DIAGRAM_WRAPPER_CLASS))
            });
            if let Some(el) = target.and_then(|node| doc.element_mut(node)) {
                el.set_style("transform", transform);
            }
        });
    }
}
