//! Runtime stylesheet.

use mv_dom::Document;

/// Id of the injected `<style>` element.
pub const STYLE_ELEMENT_ID: &str = "vitepress-mermaid-renderer-styles";

const STYLES: &str = "\
.mermaid-wrapper { position: relative; margin: 1rem 0; }
.mermaid-container { overflow: hidden; position: relative; }
.diagram-wrapper { transform-origin: 0 0; transition: transform 0.1s ease-out; }
.mermaid-rendering { opacity: 0.5; }
.mermaid-error { color: #d32f2f; white-space: pre-wrap; font-family: monospace; }
";

/// Add the stylesheet to `head` unless it is already there.
///
/// Returns whether an element was inserted.
pub fn ensure_styles(doc: &mut Document) -> bool {
    if doc.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return false;
    }
    let Some(head) = doc.head() else {
        tracing::debug!("Page has no head, skipping style injection");
        return false;
    };

    let style = doc.create_element("style");
    if let Some(el) = doc.element_mut(style) {
        el.set_attr("id", STYLE_ELEMENT_ID);
    }
    doc.set_text_content(style, STYLES);
    match doc.append_child(head, style) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to inject diagram styles");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use mv_dom::Selector;

    use super::*;

    #[test]
    fn test_styles_injected_once() {
        let mut doc = Document::new();
        assert!(ensure_styles(&mut doc));
        assert!(!ensure_styles(&mut doc));

        let head = doc.head().unwrap();
        let styles = doc.query_selector_all(head, &Selector::tag("style"));
        assert_eq!(styles.len(), 1);
        assert!(doc.text_content(styles[0]).contains(".mermaid-rendering"));
    }

    #[test]
    fn test_page_without_head() {
        let mut doc = Document::empty();
        assert!(!ensure_styles(&mut doc));
    }
}
