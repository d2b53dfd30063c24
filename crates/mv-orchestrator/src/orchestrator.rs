//! Page-wide discovery loop.
//!
//! [`RenderOrchestrator`] runs as a single tokio task. Host signals, mutation
//! records, and timer deadlines all arrive in one `select!` loop, so the
//! retry deadline, the coalescing frame, and the observer are only ever
//! touched from that task.

use std::sync::Arc;

use mv_config::{ConfigBus, MermaidConfig, ToolbarInput};
use mv_dom::{MutationRecord, Page};
use mv_pipeline::DiagramRenderPipeline;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::OrchestratorError;
use crate::discovery;
use crate::options::OrchestratorOptions;
use crate::retry::RetryScheduler;
use crate::signals::{HostSignal, ReadyState};
use crate::styles;
use crate::watcher::{self, MutationWatcher};

/// Where the current discovery cycle stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrchestratorPhase {
    /// Not ready yet, or ready and waiting for the first frame.
    #[default]
    Idle,
    Scanning,
    /// Nothing found; a retry scan is scheduled.
    Waiting,
    /// Sources were handed to the pipeline and it has not emptied yet.
    Draining,
    /// The pipeline emptied after this cycle's sources.
    Complete,
    /// Nothing found and the retry budget is spent.
    Exhausted,
    Stopped,
}

/// Snapshot published after every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrchestratorStatus {
    pub phase: OrchestratorPhase,
    /// Retry attempts spent in the current cycle.
    pub attempts: u32,
    /// Scans performed since start.
    pub scans: u64,
    /// Sources handed to the pipeline since start.
    pub sources_enqueued: u64,
    pub observer_active: bool,
    pub ready: bool,
}

#[derive(Debug)]
enum Command {
    Rescan,
    Shutdown,
}

/// Control surface of a running orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<OrchestratorStatus>,
    pipeline: Arc<DiagramRenderPipeline>,
    bus: ConfigBus,
}

impl OrchestratorHandle {
    #[must_use]
    pub fn status(&self) -> OrchestratorStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<OrchestratorStatus> {
        self.status.clone()
    }

    /// Wait until the status satisfies `predicate` and return it.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&OrchestratorStatus) -> bool,
    ) -> OrchestratorStatus {
        let mut status = self.status.clone();
        let result = status.wait_for(|s| predicate(s)).await.map(|s| s.clone());
        result.unwrap_or_else(|_| self.status())
    }

    #[must_use]
    pub fn pipeline(&self) -> &Arc<DiagramRenderPipeline> {
        &self.pipeline
    }

    #[must_use]
    pub fn config_bus(&self) -> &ConfigBus {
        &self.bus
    }

    /// Re-resolve the toolbar for views mounted from now on.
    pub fn set_toolbar(&self, input: impl Into<ToolbarInput>) {
        self.pipeline.set_toolbar(input.into().into_resolved());
    }

    /// Merge compiler configuration and broadcast it. Rendered views re-render.
    pub fn set_config(&self, partial: &MermaidConfig) -> MermaidConfig {
        self.bus.set_config(partial)
    }

    /// Start a fresh discovery cycle, as a navigation would.
    pub fn rescan(&self) -> Result<(), OrchestratorError> {
        self.commands
            .send(Command::Rescan)
            .map_err(|_| OrchestratorError::Stopped)
    }

    /// Stop the loop and wait until it has released the observer and timers.
    pub async fn shutdown(&self) {
        if self.commands.send(Command::Shutdown).is_err() {
            return;
        }
        self.wait_for(|s| s.phase == OrchestratorPhase::Stopped).await;
    }
}

/// Discovers diagram sources and feeds them to the pipeline.
pub struct RenderOrchestrator {
    page: Page,
    pipeline: Arc<DiagramRenderPipeline>,
    options: OrchestratorOptions,
    ready_state: ReadyState,
    retry: RetryScheduler,
    watcher: MutationWatcher,
    signals: mpsc::Receiver<HostSignal>,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<OrchestratorStatus>,
    pipeline_idle: watch::Receiver<bool>,
    phase: OrchestratorPhase,
    ready: bool,
    theme_seen: bool,
    setup_at: Option<Instant>,
    frame_at: Option<Instant>,
    kick_at: Option<Instant>,
}

impl RenderOrchestrator {
    /// Start the orchestrator on the current runtime.
    ///
    /// Connects the pipeline to `bus`, then spawns the loop. When
    /// `ready_state` is [`ReadyState::Loading`] the loop waits for
    /// [`HostSignal::DomContentLoaded`] before touching the page.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Runtime`] when called outside a runtime.
    pub fn spawn(
        page: Page,
        pipeline: Arc<DiagramRenderPipeline>,
        bus: ConfigBus,
        options: OrchestratorOptions,
        ready_state: ReadyState,
        signals: mpsc::Receiver<HostSignal>,
    ) -> Result<OrchestratorHandle, OrchestratorError> {
        let runtime = Handle::try_current()?;
        pipeline.attach_config(&bus);

        let (command_tx, commands) = mpsc::unbounded_channel();
        let (status, status_rx) = watch::channel(OrchestratorStatus::default());
        let orchestrator = Self {
            page,
            pipeline: Arc::clone(&pipeline),
            retry: RetryScheduler::new(options.clone()),
            options,
            ready_state,
            watcher: MutationWatcher::default(),
            signals,
            commands,
            status,
            pipeline_idle: pipeline.subscribe_idle(),
            phase: OrchestratorPhase::Idle,
            ready: false,
            theme_seen: false,
            setup_at: None,
            frame_at: None,
            kick_at: None,
        };
        runtime.spawn(orchestrator.run());

        Ok(OrchestratorHandle {
            commands: command_tx,
            status: status_rx,
            pipeline,
            bus,
        })
    }

    async fn run(mut self) {
        if self.ready_state.is_loading() {
            tracing::debug!("Waiting for DOMContentLoaded");
        } else {
            self.on_ready();
        }

        let mut signals_open = true;
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Rescan) => self.start_cycle(),
                    Some(Command::Shutdown) | None => break,
                },
                signal = self.signals.recv(), if signals_open => match signal {
                    Some(signal) => self.handle_signal(signal),
                    None => signals_open = false,
                },
                Some(record) = self.watcher.recv() => self.handle_mutation(&record),
                () = sleep_until(self.setup_at), if self.setup_at.is_some() => {
                    self.setup_at = None;
                    self.connect_watcher();
                    self.start_cycle();
                },
                () = sleep_until(self.frame_at), if self.frame_at.is_some() => {
                    self.frame_at = None;
                    self.start_cycle();
                },
                () = sleep_until(self.retry.deadline()), if self.retry.is_pending() => {
                    if self.retry.fire() {
                        self.scan();
                    }
                },
                () = sleep_until(self.kick_at), if self.kick_at.is_some() => {
                    self.kick_at = None;
                    self.deployment_kick();
                },
                changed = self.pipeline_idle.changed(), if self.phase == OrchestratorPhase::Draining => {
                    if changed.is_ok() && *self.pipeline_idle.borrow_and_update() {
                        self.complete();
                    }
                },
            }
        }

        self.watcher.disconnect();
        self.retry.cancel();
        self.set_phase(OrchestratorPhase::Stopped);
        tracing::debug!("Diagram orchestrator stopped");
    }

    fn handle_signal(&mut self, signal: HostSignal) {
        tracing::debug!(?signal, "Host signal");
        match signal {
            HostSignal::DomContentLoaded => {
                if !self.ready {
                    self.on_ready();
                }
            }
            HostSignal::RouteChanged | HostSignal::PopState => {
                if self.ready && self.setup_at.is_none() {
                    self.connect_watcher();
                    self.start_cycle();
                }
            }
            HostSignal::ThemeReady => {
                if self.theme_seen {
                    return;
                }
                self.theme_seen = true;
                if self.ready && self.setup_at.is_none() {
                    self.scan();
                }
            }
        }
    }

    fn on_ready(&mut self) {
        let has_body = self.page.with(|doc| {
            if doc.body().is_none() {
                return false;
            }
            styles::ensure_styles(doc);
            true
        });
        if !has_body {
            tracing::warn!("Page has no body, diagram rendering stays idle");
            return;
        }

        self.ready = true;
        let now = Instant::now();
        self.setup_at = Some(now + self.options.frame);
        self.kick_at = Some(now + self.options.deployment_kick);
        self.publish(|_| {});
    }

    fn connect_watcher(&mut self) {
        let watcher = &mut self.watcher;
        match self.page.with(|doc| watcher.connect(doc)) {
            Ok(()) => tracing::debug!("Watching page for new diagrams"),
            Err(err) => tracing::warn!(error = %err, "Mutation observer unavailable, relying on retry scans"),
        }
        self.publish(|_| {});
    }

    fn handle_mutation(&mut self, record: &MutationRecord) {
        if self.frame_at.is_some() {
            return;
        }
        let relevant = watcher::is_relevant(&self.page.lock(), record);
        if relevant {
            tracing::debug!("New diagram content added, rescanning next frame");
            self.frame_at = Some(Instant::now() + self.options.frame);
        }
    }

    /// Reset the counter and scan.
    fn start_cycle(&mut self) {
        if !self.ready {
            tracing::debug!("Ignoring rescan before the page is ready");
            return;
        }
        self.retry.reset();
        self.frame_at = None;
        self.scan();
    }

    fn scan(&mut self) {
        self.set_phase(OrchestratorPhase::Scanning);
        let show_language_label = self.pipeline.toolbar().show_language_label;
        let sources = self
            .page
            .with(|doc| discovery::discover(doc, show_language_label));
        self.status.send_modify(|s| s.scans += 1);

        if sources.is_empty() {
            if let Some(delay) = self.retry.start() {
                tracing::debug!(attempt = self.retry.attempts() + 1, ?delay, "No diagrams found, scheduling retry");
                self.set_phase(OrchestratorPhase::Waiting);
            } else {
                tracing::debug!("No diagrams found, giving up until the next navigation");
                self.set_phase(OrchestratorPhase::Exhausted);
            }
            return;
        }

        self.retry.cancel();
        let count = sources.len();
        for source in sources {
            self.pipeline.enqueue(source);
        }
        self.pipeline_idle.borrow_and_update();
        self.status
            .send_modify(|s| s.sources_enqueued += u64::try_from(count).unwrap_or(u64::MAX));
        tracing::debug!(count, "Queued diagrams for rendering");
        self.set_phase(OrchestratorPhase::Draining);
    }

    fn deployment_kick(&mut self) {
        if self.retry.is_pending() || self.phase == OrchestratorPhase::Draining {
            return;
        }
        tracing::debug!("Running deployment scan");
        self.scan();
    }

    fn complete(&mut self) {
        let status = self.status.borrow().clone();
        tracing::info!(
            scans = status.scans,
            rendered = status.sources_enqueued,
            "Diagram render cycle complete"
        );
        self.set_phase(OrchestratorPhase::Complete);
    }

    fn set_phase(&mut self, phase: OrchestratorPhase) {
        self.phase = phase;
        self.publish(|_| {});
    }

    fn publish(&self, update: impl FnOnce(&mut OrchestratorStatus)) {
        let phase = self.phase;
        let attempts = self.retry.attempts();
        let observer_active = self.watcher.is_active();
        let ready = self.ready;
        self.status.send_modify(|s| {
            s.phase = phase;
            s.attempts = attempts;
            s.observer_active = observer_active;
            s.ready = ready;
            update(s);
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mv_dom::{Document, Selector};
    use mv_pipeline::{CompileFuture, DiagramCompiler, Graphic, PipelineOptions};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;

    const FENCE: &str = r#"<div class="language-mermaid"><pre><code>graph TD</code></pre></div>"#;

    #[derive(Default)]
    struct CountingCompiler {
        calls: Mutex<Vec<String>>,
    }

    impl DiagramCompiler for CountingCompiler {
        fn initialize(&self, _config: &MermaidConfig) {}

        fn compile<'a>(&'a self, code: &'a str, _config: &'a MermaidConfig) -> CompileFuture<'a> {
            Box::pin(async move {
                self.calls.lock().push(code.to_owned());
                Ok(Graphic::sized(100.0, 50.0))
            })
        }
    }

    struct Harness {
        page: Page,
        compiler: Arc<CountingCompiler>,
        signals: mpsc::Sender<HostSignal>,
        handle: OrchestratorHandle,
    }

    fn start(doc: Document, ready_state: ReadyState, pipeline_options: PipelineOptions) -> Harness {
        let page = Page::new(doc);
        let compiler = Arc::new(CountingCompiler::default());
        let shared: Arc<dyn DiagramCompiler> = Arc::clone(&compiler) as Arc<dyn DiagramCompiler>;
        let pipeline = DiagramRenderPipeline::new(page.clone(), shared, pipeline_options).unwrap();
        let (signals, signal_rx) = mpsc::channel(8);
        let handle = RenderOrchestrator::spawn(
            page.clone(),
            pipeline,
            ConfigBus::default(),
            OrchestratorOptions::default(),
            ready_state,
            signal_rx,
        )
        .unwrap();
        Harness {
            page,
            compiler,
            signals,
            handle,
        }
    }

    fn append_html(page: &Page, html: &str) {
        page.with(|doc| {
            let body = doc.body().unwrap();
            let fragment = doc.parse_fragment(html).unwrap();
            doc.append_child(body, fragment).unwrap();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_page_scans_exactly_max_attempts_times() {
        let harness = start(Document::new(), ReadyState::Complete, PipelineOptions::headless());
        let mut status = harness.handle.subscribe_status();

        let mut scan_times = Vec::new();
        let mut seen = 0;
        loop {
            status.changed().await.unwrap();
            let current = status.borrow_and_update().clone();
            if current.scans != seen {
                seen = current.scans;
                scan_times.push(Instant::now());
            }
            if current.phase == OrchestratorPhase::Exhausted {
                break;
            }
        }

        assert_eq!(scan_times.len(), 15);
        let intervals: Vec<Duration> = scan_times.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(intervals[0], Duration::from_millis(300));
        assert!(intervals.windows(2).all(|w| w[0] <= w[1]));
        assert!(intervals.iter().all(|&d| d <= Duration::from_secs(10)));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(harness.handle.status().scans, 15);

        // Navigation starts a fresh cycle.
        harness.signals.send(HostSignal::RouteChanged).await.unwrap();
        let status = harness.handle.wait_for(|s| s.scans == 16).await;
        assert_eq!(status.attempts, 0);
        assert_eq!(status.phase, OrchestratorPhase::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_coalesce_into_one_rescan() {
        let harness = start(Document::new(), ReadyState::Complete, PipelineOptions::interactive());
        harness.handle.wait_for(|s| s.scans == 1).await;

        append_html(&harness.page, FENCE);
        append_html(&harness.page, FENCE);
        let status = harness
            .handle
            .wait_for(|s| s.phase == OrchestratorPhase::Complete)
            .await;

        assert_eq!(status.scans, 2);
        assert_eq!(status.sources_enqueued, 2);
        assert!(status.observer_active);
        assert_eq!(harness.compiler.calls.lock().len(), 2);

        // Content added inside a mounted view is not diagram source.
        harness.page.with(|doc| {
            let mount = doc
                .query_selector(doc.root(), &Selector::class("mermaid"))
                .unwrap();
            let fragment = doc.parse_fragment(r#"<code class="mermaid">graph LR</code>"#).unwrap();
            doc.append_child(mount, fragment).unwrap();
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(harness.handle.status().scans, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deployment_kick_scans_after_early_completion() {
        let doc = Document::from_body_html(FENCE).unwrap();
        let harness = start(doc, ReadyState::Complete, PipelineOptions::headless());
        let status = harness
            .handle
            .wait_for(|s| s.phase == OrchestratorPhase::Complete)
            .await;
        assert_eq!(status.scans, 1);

        let status = harness.handle.wait_for(|s| s.scans == 2).await;
        assert_eq!(status.sources_enqueued, 1);
        assert_eq!(harness.compiler.calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_dom_content_loaded() {
        let doc = Document::from_body_html(FENCE).unwrap();
        let harness = start(doc, ReadyState::Loading, PipelineOptions::headless());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(harness.handle.status().scans, 0);
        assert!(!harness.handle.status().ready);
        // Navigation before readiness is ignored.
        harness.signals.send(HostSignal::RouteChanged).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(harness.handle.status().scans, 0);

        harness.signals.send(HostSignal::DomContentLoaded).await.unwrap();
        harness
            .handle
            .wait_for(|s| s.phase == OrchestratorPhase::Complete)
            .await;
        let doc = harness.page.lock();
        let head = doc.head().unwrap();
        assert!(doc.query_selector(head, &Selector::id(styles::STYLE_ELEMENT_ID)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_ready_rescans_once() {
        let doc = Document::from_body_html(FENCE).unwrap();
        let harness = start(doc, ReadyState::Complete, PipelineOptions::interactive());
        harness
            .handle
            .wait_for(|s| s.phase == OrchestratorPhase::Complete)
            .await;
        let before = harness.handle.status().scans;

        harness.signals.send(HostSignal::ThemeReady).await.unwrap();
        harness.handle.wait_for(|s| s.scans == before + 1).await;
        harness.signals.send(HostSignal::ThemeReady).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(harness.handle.status().scans, before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_loop_finds_content_without_observer() {
        let mut doc = Document::new();
        doc.set_observers_supported(false);
        let harness = start(doc, ReadyState::Complete, PipelineOptions::headless());
        let status = harness.handle.wait_for(|s| s.scans == 1).await;
        assert!(!status.observer_active);

        append_html(&harness.page, FENCE);
        let status = harness
            .handle
            .wait_for(|s| s.phase == OrchestratorPhase::Complete)
            .await;
        assert_eq!(status.scans, 2);
        assert_eq!(harness.compiler.calls.lock().as_slice(), ["graph TD"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_without_body_stays_idle() {
        let harness = start(Document::empty(), ReadyState::Complete, PipelineOptions::headless());
        tokio::time::sleep(Duration::from_secs(1)).await;
        let status = harness.handle.status();
        assert!(!status.ready);
        assert_eq!(status.scans, 0);
        assert_eq!(status.phase, OrchestratorPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_observer() {
        let harness = start(Document::new(), ReadyState::Complete, PipelineOptions::headless());
        harness.handle.wait_for(|s| s.observer_active).await;

        harness.handle.shutdown().await;
        assert_eq!(harness.handle.status().phase, OrchestratorPhase::Stopped);
        assert_eq!(harness.page.lock().observer_count(), 0);
        assert!(matches!(harness.handle.rescan(), Err(OrchestratorError::Stopped)));
    }
}
