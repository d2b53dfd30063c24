//! CLI command implementations.

mod render;
mod toolbar;

pub(crate) use render::RenderArgs;
pub(crate) use toolbar::ToolbarArgs;
