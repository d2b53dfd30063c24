//! Error types for page model operations.

/// Error from a page model operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomError {
    /// Node does not exist or is not the expected kind.
    #[error("node {0} is not an element")]
    NotAnElement(usize),

    /// Insertion would make a node its own ancestor.
    #[error("hierarchy request error: node {child} cannot be inserted into {parent}")]
    HierarchyRequest {
        /// Parent node index.
        parent: usize,
        /// Child node index.
        child: usize,
    },

    /// Reference node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Parent node index.
        parent: usize,
        /// Expected child node index.
        child: usize,
    },

    /// Selector string could not be parsed.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Mutation observation is not available on this page.
    #[error("mutation observation is not supported")]
    ObserverUnsupported,

    /// XML parsing error.
    #[error("XML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
