//! Diagram kinds recognized for post-render styling.

/// Diagram kind, detected from the source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    C4,
    GitGraph,
    Flowchart,
    Sequence,
    Gantt,
    Unknown,
}

const C4_HEADERS: [&str; 5] = [
    "c4context",
    "c4container",
    "c4component",
    "c4dynamic",
    "c4deployment",
];

impl DiagramKind {
    /// Detect the kind from diagram source.
    ///
    /// Looks at the first line that is neither blank nor a `%%` comment,
    /// case-insensitively. A `gitgraph:` marker anywhere also counts.
    #[must_use]
    pub fn detect(code: &str) -> Self {
        let lower = code.to_lowercase();
        let header = lower
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with("%%"))
            .unwrap_or_default();

        if C4_HEADERS.iter().any(|h| header.starts_with(h)) {
            Self::C4
        } else if header.starts_with("gitgraph") || lower.contains("gitgraph:") {
            Self::GitGraph
        } else if header.starts_with("flowchart") || header.starts_with("graph") {
            Self::Flowchart
        } else if header.starts_with("sequencediagram") {
            Self::Sequence
        } else if header.starts_with("gantt") {
            Self::Gantt
        } else {
            Self::Unknown
        }
    }

    /// Short name used in CSS classes.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::C4 => "c4",
            Self::GitGraph => "gitgraph",
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequence",
            Self::Gantt => "gantt",
            Self::Unknown => "unknown",
        }
    }

    /// Class added to the mount element after rendering.
    #[must_use]
    pub fn class_name(self) -> String {
        format!("mermaid-{}", self.name())
    }

    /// Whether the graphic should stretch to its container width.
    #[must_use]
    pub fn needs_container_sizing(self) -> bool {
        matches!(self, Self::C4 | Self::GitGraph)
    }
}
