//! Diagram compiler seam.

use std::future::Future;
use std::pin::Pin;

use mv_config::MermaidConfig;
use mv_dom::Rect;

/// Boxed future returned by [`DiagramCompiler::compile`].
pub type CompileFuture<'a> = Pin<Box<dyn Future<Output = Result<Graphic, CompileError>> + Send + 'a>>;

/// Compiles diagram source into a graphic.
///
/// Implementations bind the actual diagram engine. At most one `compile`
/// call is in flight per pipeline.
pub trait DiagramCompiler: Send + Sync {
    /// Apply a new configuration to the engine.
    fn initialize(&self, config: &MermaidConfig);

    /// Compile `code` with `config`.
    fn compile<'a>(&'a self, code: &'a str, config: &'a MermaidConfig) -> CompileFuture<'a>;
}

/// Compiled graphic, mounted as an `svg` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graphic {
    /// Intrinsic width attribute, if the engine emits one.
    pub width: Option<f64>,
    /// Intrinsic height attribute, if the engine emits one.
    pub height: Option<f64>,
    /// `viewBox` attribute, if the engine emits one.
    pub view_box: Option<String>,
    /// Bounding box of the drawn content.
    pub bbox: Rect,
}

impl Graphic {
    /// Graphic of a fixed size with matching bounding box and no `viewBox`.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            view_box: None,
            bbox: Rect::sized(width, height),
        }
    }
}

/// Compiler failure, carrying the engine's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    message: String,
}

impl CompileError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
