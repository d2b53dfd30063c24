//! Mounted view state and toolbar actions.

use std::sync::Arc;

use mv_config::{DownloadFormat, ResolvedToolbarConfig, ToolbarButton, ToolbarMode};
use mv_viewport::{FullscreenHost, Notifier, ViewportController, ViewportState};

use crate::kind::DiagramKind;
use crate::task::DiagramSource;

/// Laid-out size of a rendered graphic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderedSize {
    pub width: f64,
    pub height: f64,
}

/// State of one mounted diagram view.
#[derive(Debug, Clone)]
pub struct DiagramView {
    pub mount_id: String,
    pub wrapper_id: String,
    /// Source the view was mounted from; its code is what gets compiled.
    pub source: DiagramSource,
    pub kind: DiagramKind,
    pub mounted: bool,
    pub is_rendered: bool,
    pub render_error: bool,
    pub render_error_details: Option<String>,
    pub rendered_size: RenderedSize,
    pub toolbar: Arc<ResolvedToolbarConfig>,
    pub viewport: ViewportController,
}

impl DiagramView {
    #[must_use]
    pub fn code(&self) -> &str {
        &self.source.raw_code
    }

    /// Toolbar mode for the current viewport and fullscreen state.
    #[must_use]
    pub fn toolbar_mode(&self) -> ToolbarMode {
        ToolbarMode::select(self.viewport.is_mobile(), self.viewport.is_fullscreen())
    }

    /// Buttons to show right now.
    #[must_use]
    pub fn visible_buttons(&self) -> Vec<ToolbarButton> {
        self.toolbar.mode(self.toolbar_mode()).enabled_buttons()
    }
}

/// Toolbar action on a mounted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    ZoomIn,
    ZoomOut,
    ResetView,
    CopyCode,
    ToggleFullscreen,
    Download,
}

impl ToolbarAction {
    /// Button gating the action. Download has no toolbar button of its own.
    #[must_use]
    pub fn button(self) -> Option<ToolbarButton> {
        match self {
            Self::ZoomIn => Some(ToolbarButton::ZoomIn),
            Self::ZoomOut => Some(ToolbarButton::ZoomOut),
            Self::ResetView => Some(ToolbarButton::ResetView),
            Self::CopyCode => Some(ToolbarButton::CopyCode),
            Self::ToggleFullscreen => Some(ToolbarButton::ToggleFullscreen),
            Self::Download => None,
        }
    }
}

/// Destination of the copy-code action.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// File the host should offer for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub format: DownloadFormat,
    pub file_name: String,
    pub mime_type: &'static str,
    /// Serialized graphic. Raster formats are converted by the host.
    pub svg: String,
}

/// Host capabilities a toolbar action may need.
pub struct ActionContext<'a> {
    pub clipboard: &'a dyn Clipboard,
    pub fullscreen: &'a mut dyn FullscreenHost,
    pub notifier: &'a dyn Notifier,
}

/// Result of a dispatched toolbar action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Viewport(ViewportState),
    Copied,
    Fullscreen(bool),
    Download(DownloadRequest),
}

/// Payload of the render-complete callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub id: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Called after every render attempt.
pub type RenderCallback = Arc<dyn Fn(&RenderOutcome) + Send + Sync>;
