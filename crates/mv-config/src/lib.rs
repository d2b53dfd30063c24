//! Configuration for Mermaid diagram views.
//!
//! Two independent pieces of configuration reach a rendered diagram:
//!
//! - Toolbar options ([`MermaidToolbarOptions`]), resolved per display mode
//!   into a [`ResolvedToolbarConfig`] by [`resolve`]. Options load from JSON
//!   or TOML and are lenient: invalid values fall back to defaults.
//! - Compiler configuration ([`MermaidConfig`]), an opaque JSON object that
//!   is shallow-merged over [`MermaidConfig::defaults`] and distributed to
//!   subscribers through a [`ConfigBus`].

mod bus;
mod mermaid;
mod options;
mod toolbar;

use std::path::PathBuf;

pub use bus::{ConfigBus, Subscription};
pub use mermaid::MermaidConfig;
pub use options::{MermaidToolbarOptions, ModeOverrides, PositionOverrides};
pub use toolbar::{
    ButtonState, DownloadFormat, HorizontalPosition, ModeConfig, Positions,
    ResolvedToolbarConfig, ToolbarButton, ToolbarInput, ToolbarMode, VerticalPosition,
    is_resolved_toolbar_config, resolve,
};

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
