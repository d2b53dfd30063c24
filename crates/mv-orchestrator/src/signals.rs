//! Host lifecycle signals.

/// Event emitted by the host page framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// The document finished parsing.
    DomContentLoaded,
    /// Client-side navigation swapped the page content.
    RouteChanged,
    /// Browser history navigation.
    PopState,
    /// The host theme finished applying. Only the first occurrence counts.
    ThemeReady,
}

/// Document readiness at initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadyState {
    /// Still parsing; wait for [`HostSignal::DomContentLoaded`].
    Loading,
    Interactive,
    #[default]
    Complete,
}

impl ReadyState {
    #[must_use]
    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }
}
