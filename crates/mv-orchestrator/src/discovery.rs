//! Locating diagram sources in host markup.

use mv_dom::{Document, NodeId, Selector};
use mv_pipeline::{DiagramSource, WRAPPER_CLASS};

use crate::OrchestratorError;

/// Marks a code block that has already been handed to the pipeline.
pub const PROCESSED_ATTR: &str = "data-mermaid-processed";

const FENCE_CLASS: &str = "language-mermaid";
const COPY_CLASS: &str = "copy";
const LABEL_CLASS: &str = "lang";

/// Find every unprocessed diagram source, cleaning host controls on the way.
///
/// Returned sources are marked processed so later scans skip them. Wrappers
/// that fail to prepare are logged and skipped.
pub fn discover(doc: &mut Document, show_language_label: bool) -> Vec<DiagramSource> {
    let wrappers = candidate_wrappers(doc);
    let mut sources = Vec::new();

    for wrapper in wrappers {
        match prepare(doc, wrapper, show_language_label) {
            Ok(Some(source)) => sources.push(source),
            Ok(None) => {}
            Err(err) => tracing::warn!(node = wrapper.index(), error = %err, "Failed to prepare diagram block"),
        }
    }

    tracing::debug!(found = sources.len(), "Scanned page for diagrams");
    sources
}

/// Fenced blocks, or `pre` elements whose code carries a mermaid class when
/// the host emits no fence wrappers.
fn candidate_wrappers(doc: &Document) -> Vec<NodeId> {
    let root = doc.root();
    let fenced = doc.get_elements_by_class_name(root, FENCE_CLASS);
    if !fenced.is_empty() {
        return fenced;
    }

    let code = Selector::tag("code");
    doc.query_selector_all(root, &Selector::tag("pre"))
        .into_iter()
        .filter(|&pre| {
            doc.query_selector(pre, &code)
                .and_then(|node| doc.element(node))
                .is_some_and(|el| el.class_name().contains("mermaid"))
        })
        .collect()
}

fn prepare(
    doc: &mut Document,
    wrapper: NodeId,
    show_language_label: bool,
) -> Result<Option<DiagramSource>, OrchestratorError> {
    if doc.closest(wrapper, &Selector::class(WRAPPER_CLASS)).is_some() {
        return Ok(None);
    }

    for copy in doc.get_elements_by_class_name(wrapper, COPY_CLASS) {
        doc.remove(copy);
    }
    if !show_language_label {
        for label in doc.get_elements_by_class_name(wrapper, LABEL_CLASS) {
            doc.remove(label);
        }
    }

    let pre = if doc.element(wrapper).is_some_and(|el| el.tag() == "pre") {
        Some(wrapper)
    } else {
        doc.query_selector(wrapper, &Selector::tag("pre"))
    };
    let Some(pre) = pre else {
        return Ok(None);
    };

    let host = doc.expect_element_mut(pre)?;
    if host.has_attr(PROCESSED_ATTR) {
        return Ok(None);
    }
    host.set_attr(PROCESSED_ATTR, "true");

    let code = doc.text_content(pre);
    Ok(Some(DiagramSource::new(code.trim(), pre)))
}
