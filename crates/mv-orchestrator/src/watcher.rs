//! Mutation-driven rediscovery.

use mv_dom::{Compound, Document, DomError, MutationObserver, MutationRecord, NodeId, Selector};
use mv_pipeline::WRAPPER_CLASS;

/// Elements that carry diagram source.
fn source_selector() -> Selector {
    Selector::any(vec![
        Compound::class("language-mermaid"),
        Compound::tag("code").with_class("mermaid"),
        Compound::tag("pre").with_class("language-mermaid"),
        Compound::tag("code").with_class("language-mermaid"),
    ])
}

/// Whether a record adds a node that is, contains, or sits under diagram
/// source, outside any mounted view.
#[must_use]
pub fn is_relevant(doc: &Document, record: &MutationRecord) -> bool {
    let sources = source_selector();
    let mounted = Selector::class(WRAPPER_CLASS);
    record
        .added_nodes
        .iter()
        .any(|&node| introduces_source(doc, node, &sources, &mounted))
}

fn introduces_source(doc: &Document, node: NodeId, sources: &Selector, mounted: &Selector) -> bool {
    if doc.closest(node, mounted).is_some() {
        return false;
    }
    if doc.closest(node, sources).is_some() {
        return true;
    }

    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if doc.matches(current, mounted) {
            continue;
        }
        if doc.matches(current, sources) {
            return true;
        }
        stack.extend(doc.children(current).iter().copied());
    }
    false
}

/// Element to observe: `#app`, else `.Layout`, else `body`.
#[must_use]
pub fn observe_target(doc: &Document) -> Option<NodeId> {
    doc.get_element_by_id("app")
        .or_else(|| doc.query_selector(doc.root(), &Selector::class("Layout")))
        .or_else(|| doc.body())
}

/// Owns at most one mutation observer on the page.
#[derive(Debug, Default)]
pub struct MutationWatcher {
    observer: Option<MutationObserver>,
}

impl MutationWatcher {
    /// Replace the current observer with one on [`observe_target`].
    ///
    /// The previous observer is disconnected first, even when attaching fails.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::ObserverUnsupported`] when the page cannot observe.
    pub fn connect(&mut self, doc: &mut Document) -> Result<(), DomError> {
        self.disconnect();
        let target = observe_target(doc).ok_or(DomError::NotAnElement(doc.root().index()))?;
        self.observer = Some(doc.observe(target)?);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    /// Next record. Pending forever while disconnected; a closed channel
    /// disconnects the watcher.
    pub async fn recv(&mut self) -> Option<MutationRecord> {
        let Some(observer) = self.observer.as_mut() else {
            return std::future::pending().await;
        };
        let record = observer.recv().await;
        if record.is_none() {
            self.observer = None;
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(doc: &mut Document, parent: NodeId, html: &str) -> MutationRecord {
        let mut observer = doc.observe(doc.root()).unwrap();
        let fragment = doc.parse_fragment(html).unwrap();
        doc.append_child(parent, fragment).unwrap();
        let record = observer.try_recv().unwrap();
        observer.disconnect();
        record
    }

    #[test]
    fn test_fresh_fence_is_relevant() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let record = added(
            &mut doc,
            body,
            r#"<section><div class="language-mermaid"><pre><code>graph TD</code></pre></div></section>"#,
        );
        assert!(is_relevant(&doc, &record));
    }

    #[test]
    fn test_code_mermaid_is_relevant() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let record = added(&mut doc, body, r#"<pre><code class="mermaid">graph TD</code></pre>"#);
        assert!(is_relevant(&doc, &record));
    }

    #[test]
    fn test_content_hydrated_into_existing_fence_is_relevant() {
        let mut doc = Document::from_body_html(r#"<div class="language-mermaid" id="fence"/>"#).unwrap();
        let fence = doc.get_element_by_id("fence").unwrap();
        let record = added(&mut doc, fence, "<pre><code>graph TD</code></pre>");
        assert!(is_relevant(&doc, &record));
    }

    #[test]
    fn test_unrelated_markup_is_ignored() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let record = added(&mut doc, body, r#"<p>text <code class="rust">x</code></p>"#);
        assert!(!is_relevant(&doc, &record));
    }

    #[test]
    fn test_additions_inside_mounted_wrapper_are_ignored() {
        let mut doc = Document::from_body_html(r#"<div class="mermaid-wrapper"><div id="m"/></div>"#).unwrap();
        let mount = doc.get_element_by_id("m").unwrap();
        let record = added(&mut doc, mount, r#"<code class="mermaid">graph TD</code>"#);
        assert!(!is_relevant(&doc, &record));
    }

    #[test]
    fn test_mounted_wrapper_itself_is_ignored() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let record = added(
            &mut doc,
            body,
            r#"<div class="mermaid-wrapper"><div class="mermaid">graph TD</div></div>"#,
        );
        assert!(!is_relevant(&doc, &record));
    }

    #[test]
    fn test_observe_target_preference() {
        let doc = Document::from_body_html(r#"<div class="Layout"><div id="app"/></div>"#).unwrap();
        let target = observe_target(&doc).unwrap();
        assert_eq!(doc.element(target).unwrap().id(), Some("app"));

        let doc = Document::from_body_html(r#"<div class="Layout"/>"#).unwrap();
        let target = observe_target(&doc).unwrap();
        assert!(doc.element(target).unwrap().has_class("Layout"));

        let doc = Document::new();
        assert_eq!(observe_target(&doc), doc.body());
    }

    #[test]
    fn test_connect_replaces_previous_observer() {
        let mut doc = Document::new();
        let mut watcher = MutationWatcher::default();
        watcher.connect(&mut doc).unwrap();
        watcher.connect(&mut doc).unwrap();
        assert_eq!(doc.observer_count(), 1);

        watcher.disconnect();
        assert!(!watcher.is_active());
        assert_eq!(doc.observer_count(), 0);
    }

    #[test]
    fn test_connect_fails_without_observer_support() {
        let mut doc = Document::new();
        doc.set_observers_supported(false);
        let mut watcher = MutationWatcher::default();
        assert!(matches!(watcher.connect(&mut doc), Err(DomError::ObserverUnsupported)));
        assert!(!watcher.is_active());
    }
}
