//! Pan, zoom, and fullscreen state for one interactive diagram.
//!
//! [`ViewportController`] turns raw input (pointer, wheel, touch, toolbar
//! buttons) into a [`ViewportState`] that the host applies as a CSS
//! transform. Touch handling depends on the viewport: on narrow screens
//! outside fullscreen, single-finger gestures scroll the page and only
//! two-finger gestures reach the diagram.

mod controller;
mod fullscreen;
mod input;

pub use controller::{
    MAX_SCALE, MIN_SCALE, MOBILE_BREAKPOINT, PAN_STEP, PINCH_DAMPING, ViewportController,
    ViewportState, WHEEL_ZOOM_STEP, ZOOM_STEP,
};
pub use fullscreen::{ControlsVisibility, FullscreenEntry, FullscreenHost, LogNotifier, Notifier};
pub use input::{Disposition, PanDirection, Point, WheelInput};

/// Viewport error.
#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    /// The platform exposes no fullscreen entry point.
    #[error("Fullscreen mode is not supported in this browser")]
    CapabilityUnavailable,
}
