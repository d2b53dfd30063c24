//! DOM edits performed by the pipeline.

use mv_dom::{Document, NodeId, Page, Rect, Selector};

use crate::compiler::Graphic;
use crate::kind::DiagramKind;
use crate::view::RenderedSize;

pub(crate) const WRAPPER_CLASS: &str = "mermaid-wrapper";
pub(crate) const CONTAINER_CLASS: &str = "mermaid-container";
pub(crate) const DIAGRAM_WRAPPER_CLASS: &str = "diagram-wrapper";
pub(crate) const MOUNT_CLASS: &str = "mermaid";
pub(crate) const RENDERING_CLASS: &str = "mermaid-rendering";
pub(crate) const ERROR_CLASS: &str = "mermaid-error";
pub(crate) const ERROR_ATTR: &str = "data-render-error";

/// Ids of a freshly built view.
pub(crate) struct ViewIds {
    pub wrapper: NodeId,
    pub wrapper_id: String,
    pub mount_id: String,
}

/// Build `div.mermaid-wrapper > div.mermaid-container > div.diagram-wrapper
/// > div.mermaid` holding `code`, detached.
pub(crate) fn build_view(doc: &mut Document, code: &str) -> ViewIds {
    let token = uuid::Uuid::new_v4().simple().to_string();
    let wrapper_id = format!("mermaid-wrapper-{token}");
    let mount_id = format!("mermaid-{token}");

    let wrapper = element(doc, "div", WRAPPER_CLASS);
    set_attr(doc, wrapper, "id", &wrapper_id);
    let container = element(doc, "div", CONTAINER_CLASS);
    let diagram = element(doc, "div", DIAGRAM_WRAPPER_CLASS);
    let mount = element(doc, "div", MOUNT_CLASS);
    set_attr(doc, mount, "id", &mount_id);
    doc.set_text_content(mount, code);

    adopt(doc, diagram, mount);
    adopt(doc, container, diagram);
    adopt(doc, wrapper, container);

    ViewIds {
        wrapper,
        wrapper_id,
        mount_id,
    }
}

fn element(doc: &mut Document, tag: &str, class: &str) -> NodeId {
    let node = doc.create_element(tag);
    if let Some(el) = doc.element_mut(node) {
        el.add_class(class);
    }
    node
}

fn set_attr(doc: &mut Document, node: NodeId, name: &str, value: &str) {
    if let Some(el) = doc.element_mut(node) {
        el.set_attr(name, value);
    }
}

fn adopt(doc: &mut Document, parent: NodeId, child: NodeId) {
    if let Err(err) = doc.append_child(parent, child) {
        tracing::debug!(error = %err, "Failed to assemble diagram view");
    }
}

/// Put the source text back into the mount and clear any previous result.
pub(crate) fn reset_mount(doc: &mut Document, mount: NodeId, code: &str) {
    doc.set_text_content(mount, code);
    if let Some(el) = doc.element_mut(mount) {
        el.remove_attr(ERROR_ATTR);
    }
}

/// Replace the mount content with the compiled graphic.
pub(crate) fn mount_graphic(doc: &mut Document, mount: NodeId, graphic: &Graphic) {
    doc.clear_children(mount);
    let svg = doc.create_element("svg");
    if let Some(el) = doc.element_mut(svg) {
        if let Some(width) = graphic.width {
            el.set_attr("width", width.to_string());
        }
        if let Some(height) = graphic.height {
            el.set_attr("height", height.to_string());
        }
        if let Some(view_box) = &graphic.view_box {
            el.set_attr("viewBox", view_box.as_str());
        }
        el.bbox = Some(graphic.bbox);
        el.rect = Rect::sized(
            graphic.width.unwrap_or(graphic.bbox.width),
            graphic.height.unwrap_or(graphic.bbox.height),
        );
    }
    adopt(doc, mount, svg);
}

/// Mirror a compile failure into the mount.
pub(crate) fn mark_error(doc: &mut Document, mount: NodeId, details: &str) {
    doc.clear_children(mount);
    if let Some(el) = doc.element_mut(mount) {
        el.set_attr(ERROR_ATTR, details);
    }
    let notice = element(doc, "div", ERROR_CLASS);
    doc.set_text_content(notice, details);
    adopt(doc, mount, notice);
}

/// Tag the mount with its kind, stretch container-sized kinds, and report
/// the resulting size of the graphic.
pub(crate) fn normalize_size(
    doc: &mut Document,
    mount: NodeId,
    svg: NodeId,
    kind: DiagramKind,
) -> RenderedSize {
    if let Some(el) = doc.element_mut(mount) {
        el.add_class(&kind.class_name());
    }

    let has_container = doc
        .closest(mount, &Selector::class(DIAGRAM_WRAPPER_CLASS))
        .is_some();
    if kind.needs_container_sizing() && has_container {
        if let Some(el) = doc.element_mut(svg) {
            el.set_style("width", "100%");
            el.set_style("height", "auto");
            el.set_style("max-width", "100%");
            el.set_style("display", "block");
            el.remove_attr("width");
            el.remove_attr("height");

            if !el.has_attr("viewBox")
                && let Some(bbox) = el.bbox
                && bbox.has_area()
            {
                el.set_attr("viewBox", format!("0 0 {} {}", bbox.width, bbox.height));
                el.set_attr("preserveAspectRatio", "xMidYMid meet");
            }
        }
        doc.force_reflow(svg);
    }

    let rect = doc.element(svg).map(|el| el.rect).unwrap_or_default();
    RenderedSize {
        width: rect.width,
        height: rect.height,
    }
}

/// Holds the `mermaid-rendering` class on a mount; removes it when dropped.
pub(crate) struct RenderingMarker {
    page: Page,
    mount: NodeId,
}

impl RenderingMarker {
    pub(crate) fn set(page: &Page, mount: NodeId) -> Self {
        page.with(|doc| {
            if let Some(el) = doc.element_mut(mount) {
                el.add_class(RENDERING_CLASS);
            }
        });
        Self {
            page: page.clone(),
            mount,
        }
    }
}

impl Drop for RenderingMarker {
    fn drop(&mut self) {
        let mut doc = self.page.lock();
        if let Some(el) = doc.element_mut(self.mount) {
            el.remove_class(RENDERING_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn mounted(code: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        doc.element_mut(body).unwrap().rect = Rect::sized(640.0, 0.0);
        let ids = build_view(&mut doc, code);
        doc.append_child(body, ids.wrapper).unwrap();
        let mount = doc.get_element_by_id(&ids.mount_id).unwrap();
        (doc, mount)
    }

    #[test]
    fn test_build_view_structure() {
        let mut doc = Document::new();
        let ids = build_view(&mut doc, "graph TD");
        let html = doc.outer_html(ids.wrapper);
        assert_eq!(
            html,
            format!(
                r#"<div class="mermaid-wrapper" id="{}"><div class="mermaid-container"><div class="diagram-wrapper"><div class="mermaid" id="{}">graph TD</div></div></div></div>"#,
                ids.wrapper_id, ids.mount_id
            )
        );
        assert!(ids.wrapper_id.starts_with("mermaid-wrapper-"));
    }

    #[test]
    fn test_error_then_reset() {
        let (mut doc, mount) = mounted("bad");
        mark_error(&mut doc, mount, "Parse error on line 1");
        assert_eq!(
            doc.element(mount).unwrap().attr(ERROR_ATTR),
            Some("Parse error on line 1")
        );
        assert!(
            doc.query_selector(mount, &Selector::class(ERROR_CLASS))
                .is_some()
        );

        reset_mount(&mut doc, mount, "bad");
        assert!(!doc.element(mount).unwrap().has_attr(ERROR_ATTR));
        assert_eq!(doc.text_content(mount), "bad");
    }

    #[test]
    fn test_normalize_plain_kind_keeps_size() {
        let (mut doc, mount) = mounted("graph TD");
        mount_graphic(&mut doc, mount, &Graphic::sized(300.0, 120.0));
        let svg = doc.query_selector(mount, &Selector::tag("svg")).unwrap();

        let size = normalize_size(&mut doc, mount, svg, DiagramKind::Flowchart);
        assert_eq!(size, RenderedSize { width: 300.0, height: 120.0 });
        assert!(doc.element(mount).unwrap().has_class("mermaid-flowchart"));
        assert_eq!(doc.element(svg).unwrap().attr("width"), Some("300"));
    }

    #[test]
    fn test_normalize_container_sized_kind() {
        let (mut doc, mount) = mounted("gitGraph");
        mount_graphic(&mut doc, mount, &Graphic::sized(320.0, 160.0));
        let svg = doc.query_selector(mount, &Selector::tag("svg")).unwrap();

        let size = normalize_size(&mut doc, mount, svg, DiagramKind::GitGraph);
        let el = doc.element(svg).unwrap();
        assert_eq!(el.attr("width"), None);
        assert_eq!(el.attr("height"), None);
        assert_eq!(el.attr("viewBox"), Some("0 0 320 160"));
        assert_eq!(el.attr("preserveAspectRatio"), Some("xMidYMid meet"));
        assert_eq!(el.style("width"), Some("100%"));
        assert_eq!(el.style("display"), Some("block"));
        assert_eq!(size, RenderedSize { width: 640.0, height: 320.0 });
    }

    #[test]
    fn test_normalize_keeps_existing_view_box() {
        let (mut doc, mount) = mounted("C4Context");
        let graphic = Graphic {
            view_box: Some("0 0 100 50".to_owned()),
            ..Graphic::sized(200.0, 100.0)
        };
        mount_graphic(&mut doc, mount, &graphic);
        let svg = doc.query_selector(mount, &Selector::tag("svg")).unwrap();

        normalize_size(&mut doc, mount, svg, DiagramKind::C4);
        let el = doc.element(svg).unwrap();
        assert_eq!(el.attr("viewBox"), Some("0 0 100 50"));
        assert_eq!(el.attr("preserveAspectRatio"), None);
    }

    #[test]
    fn test_rendering_marker_removed_on_drop() {
        let (doc, mount) = mounted("graph TD");
        let page = Page::new(doc);
        {
            let _marker = RenderingMarker::set(&page, mount);
            assert!(page.lock().element(mount).unwrap().has_class(RENDERING_CLASS));
        }
        assert!(!page.lock().element(mount).unwrap().has_class(RENDERING_CLASS));
    }
}
