//! Viewport state machine.

use crate::ViewportError;
use crate::fullscreen::{ControlsVisibility, FullscreenEntry, FullscreenHost, Notifier};
use crate::input::{Disposition, PanDirection, Point, WheelInput};

/// Lower scale bound for every zoom input.
pub const MIN_SCALE: f64 = 0.2;
/// Largest scale wheel and pinch gestures may reach.
pub const MAX_SCALE: f64 = 10.0;
/// Multiplier of one zoom button press.
pub const ZOOM_STEP: f64 = 1.2;
/// Relative scale change of one wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;
/// Damping applied to the pinch distance ratio.
pub const PINCH_DAMPING: f64 = 0.2;
/// Pixels panned per keyboard or button step, at scale 1.
pub const PAN_STEP: f64 = 50.0;
/// Viewports at most this wide (CSS pixels) count as mobile.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

const FULLSCREEN_UNSUPPORTED: &str = "Fullscreen mode is not supported in this browser.";

/// Numeric view state of one diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub is_panning: bool,
    pub is_fullscreen: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            is_panning: false,
            is_fullscreen: false,
        }
    }
}

impl ViewportState {
    /// Scale as a rounded percentage, as shown by the zoom level indicator.
    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        (self.scale * 100.0).round()
    }

    /// CSS `transform` value for the diagram wrapper.
    #[must_use]
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Gesture {
    last_pointer: Point,
    last_touch: Point,
    touch_panning: bool,
    initial_touch_distance: f64,
}

/// Translates pointer, wheel, touch, and button input into view state.
#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    gesture: Gesture,
    viewport_width: f64,
    controls: ControlsVisibility,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(f64::INFINITY)
    }
}

impl ViewportController {
    /// Controller for a page whose layout viewport is `viewport_width` wide.
    #[must_use]
    pub fn new(viewport_width: f64) -> Self {
        Self {
            state: ViewportState::default(),
            gesture: Gesture::default(),
            viewport_width,
            controls: ControlsVisibility::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.state.is_fullscreen
    }

    #[must_use]
    pub fn controls(&self) -> &ControlsVisibility {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ControlsVisibility {
        &mut self.controls
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.viewport_width <= MOBILE_BREAKPOINT
    }

    /// Narrow viewport outside fullscreen: one finger scrolls the page and
    /// only two-finger gestures reach the diagram.
    #[must_use]
    pub fn is_mobile_non_fullscreen(&self) -> bool {
        self.is_mobile() && !self.state.is_fullscreen
    }

    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        self.state.zoom_percent()
    }

    #[must_use]
    pub fn css_transform(&self) -> String {
        self.state.css_transform()
    }

    // -- Zoom --------------------------------------------------------------

    /// Multiply the scale by [`ZOOM_STEP`]. Not clamped.
    pub fn zoom_in(&mut self) {
        self.state.scale *= ZOOM_STEP;
    }

    /// Divide the scale by [`ZOOM_STEP`], stopping at [`MIN_SCALE`].
    pub fn zoom_out(&mut self) {
        if self.state.scale > MIN_SCALE {
            self.state.scale = (self.state.scale / ZOOM_STEP).max(MIN_SCALE);
        }
    }

    pub fn reset_view(&mut self) {
        self.state.scale = 1.0;
        self.state.translate_x = 0.0;
        self.state.translate_y = 0.0;
    }

    /// Apply a gesture scale if it stays within bounds; out-of-range results
    /// leave the scale untouched.
    fn apply_bounded_scale(&mut self, scale: f64) {
        if (MIN_SCALE..=MAX_SCALE).contains(&scale) {
            self.state.scale = scale;
        }
    }

    fn translate_by(&mut self, dx: f64, dy: f64) {
        self.state.translate_x += dx / self.state.scale;
        self.state.translate_y += dy / self.state.scale;
    }

    // -- Mouse -------------------------------------------------------------

    pub fn start_pan(&mut self, at: Point) {
        self.state.is_panning = true;
        self.gesture.last_pointer = at;
    }

    /// Move by the pointer delta divided by the scale. Ignored unless panning.
    pub fn pan(&mut self, at: Point) {
        if !self.state.is_panning {
            return;
        }
        let last = self.gesture.last_pointer;
        self.translate_by(at.x - last.x, at.y - last.y);
        self.gesture.last_pointer = at;
    }

    pub fn end_pan(&mut self) {
        self.state.is_panning = false;
    }

    /// Ctrl+wheel or any wheel in fullscreen zooms. A plain wheel pans on
    /// desktop and scrolls the page on narrow viewports.
    pub fn handle_wheel(&mut self, input: WheelInput) -> Disposition {
        if input.ctrl_key || self.state.is_fullscreen {
            let delta = -sign(input.delta_y) * WHEEL_ZOOM_STEP;
            self.apply_bounded_scale(self.state.scale * (1.0 + delta));
        } else if self.is_mobile_non_fullscreen() {
            return Disposition::PassThrough;
        } else {
            self.translate_by(-input.delta_x, -input.delta_y);
        }
        Disposition::PreventDefault
    }

    // -- Touch -------------------------------------------------------------

    pub fn touch_start(&mut self, touches: &[Point]) -> Disposition {
        match touches {
            [first, second, ..] => {
                self.gesture.touch_panning = false;
                self.gesture.initial_touch_distance = first.distance(*second);
                self.gesture.last_touch = first.midpoint(*second);
                if self.is_mobile_non_fullscreen() {
                    Disposition::PreventDefault
                } else {
                    Disposition::Handled
                }
            }
            [only] if !self.is_mobile_non_fullscreen() => {
                self.gesture.touch_panning = true;
                self.gesture.last_touch = *only;
                Disposition::Handled
            }
            _ => Disposition::PassThrough,
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> Disposition {
        match touches {
            [first, second, ..] => {
                self.pinch(*first, *second);
                Disposition::PreventDefault
            }
            [_] if self.is_mobile_non_fullscreen() => Disposition::PassThrough,
            [only] => {
                if self.gesture.touch_panning {
                    let last = self.gesture.last_touch;
                    self.translate_by(only.x - last.x, only.y - last.y);
                    self.gesture.last_touch = *only;
                }
                Disposition::PreventDefault
            }
            [] if self.is_mobile_non_fullscreen() => Disposition::PassThrough,
            [] => Disposition::PreventDefault,
        }
    }

    /// Damped pinch zoom plus pan that follows the two-finger midpoint.
    fn pinch(&mut self, first: Point, second: Point) {
        let distance = first.distance(second);
        if self.gesture.initial_touch_distance > 0.0 {
            let ratio = distance / self.gesture.initial_touch_distance;
            self.apply_bounded_scale(self.state.scale * (1.0 + (ratio - 1.0) * PINCH_DAMPING));
            self.gesture.initial_touch_distance = distance;
        }

        let mid = first.midpoint(second);
        let last = self.gesture.last_touch;
        self.translate_by(mid.x - last.x, mid.y - last.y);
        self.gesture.last_touch = mid;
    }

    pub fn touch_end(&mut self) {
        self.gesture.touch_panning = false;
        self.gesture.initial_touch_distance = 0.0;
    }

    // -- Steps -------------------------------------------------------------

    /// Pan by [`PAN_STEP`] divided by the scale.
    pub fn pan_step(&mut self, direction: PanDirection) {
        let step = PAN_STEP / self.state.scale;
        match direction {
            PanDirection::Up => self.state.translate_y -= step,
            PanDirection::Down => self.state.translate_y += step,
            PanDirection::Left => self.state.translate_x -= step,
            PanDirection::Right => self.state.translate_x += step,
        }
    }

    pub fn pan_up(&mut self) {
        self.pan_step(PanDirection::Up);
    }

    pub fn pan_down(&mut self) {
        self.pan_step(PanDirection::Down);
    }

    pub fn pan_left(&mut self) {
        self.pan_step(PanDirection::Left);
    }

    pub fn pan_right(&mut self) {
        self.pan_step(PanDirection::Right);
    }

    // -- Fullscreen --------------------------------------------------------

    /// Enter or leave fullscreen through the first available entry point.
    ///
    /// Returns the new fullscreen state.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::CapabilityUnavailable`] when no request entry
    /// point exists; the notifier has then already shown a notice.
    pub fn toggle_fullscreen(
        &mut self,
        host: &mut dyn FullscreenHost,
        notifier: &dyn Notifier,
    ) -> Result<bool, ViewportError> {
        if host.is_active() {
            if let Some(entry) = FullscreenEntry::ORDER.into_iter().find(|&e| host.can_exit(e)) {
                host.exit(entry);
            }
            self.state.is_fullscreen = false;
            return Ok(false);
        }

        let Some(entry) = FullscreenEntry::ORDER
            .into_iter()
            .find(|&e| host.can_request(e))
        else {
            tracing::warn!("No fullscreen entry point available");
            notifier.notify(FULLSCREEN_UNSUPPORTED);
            return Err(ViewportError::CapabilityUnavailable);
        };
        host.request(entry);
        self.state.is_fullscreen = true;
        Ok(true)
    }

    /// Sync with the host's fullscreen state and pin the toolbar visible
    /// while fullscreen.
    pub fn update_fullscreen_controls(&mut self, host: &dyn FullscreenHost) {
        let active = host.is_active();
        self.state.is_fullscreen = active;
        self.controls.set_force_show(active);
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
