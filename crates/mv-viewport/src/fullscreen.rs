//! Fullscreen capability probing and toolbar visibility.

/// Platform entry points for fullscreen, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenEntry {
    Standard,
    Webkit,
    Moz,
    Ms,
}

impl FullscreenEntry {
    /// Probe order for both entering and exiting.
    pub const ORDER: [Self; 4] = [Self::Standard, Self::Webkit, Self::Moz, Self::Ms];
}

/// Host side of the fullscreen API, bound to one diagram wrapper.
pub trait FullscreenHost {
    /// Whether the document currently has a fullscreen element.
    fn is_active(&self) -> bool;

    /// Whether the element exposes the given request entry point.
    fn can_request(&self, entry: FullscreenEntry) -> bool;

    fn request(&mut self, entry: FullscreenEntry);

    /// Whether the document exposes the given exit entry point.
    fn can_exit(&self, entry: FullscreenEntry) -> bool;

    fn exit(&mut self, entry: FullscreenEntry);
}

/// User-facing notices.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(message, "User notice");
    }
}

/// Hover-driven toolbar visibility with a fullscreen override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlsVisibility {
    hovered: bool,
    force_show: bool,
}

impl ControlsVisibility {
    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = false;
    }

    pub fn set_force_show(&mut self, force: bool) {
        self.force_show = force;
    }

    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.force_show
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.force_show || self.hovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_show_overrides_hover() {
        let mut controls = ControlsVisibility::default();
        assert!(!controls.is_visible());
        controls.pointer_enter();
        assert!(controls.is_visible());
        controls.pointer_leave();
        controls.set_force_show(true);
        assert!(controls.is_visible());
        controls.set_force_show(false);
        assert!(!controls.is_visible());
    }
}
