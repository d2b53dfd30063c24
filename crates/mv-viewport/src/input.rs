//! Input payloads and how the controller disposed of them.

/// Point in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub(crate) fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub(crate) fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Wheel event payload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelInput {
    pub delta_x: f64,
    pub delta_y: f64,
    pub ctrl_key: bool,
}

/// Direction of a keyboard or button pan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

/// What the host should do with the native event after the controller saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not intercepted; let the page handle it (e.g. scroll).
    PassThrough,
    /// Handled; the default action may still run.
    Handled,
    /// Handled; the host must cancel the default action.
    PreventDefault,
}

impl Disposition {
    #[must_use]
    pub fn prevents_default(self) -> bool {
        self == Self::PreventDefault
    }
}
