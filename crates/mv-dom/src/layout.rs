//! Minimal layout for responsive graphics.
//!
//! Only what diagram sizing needs: a graphic styled `width: 100%` takes the
//! width of its nearest laid-out ancestor, and `height: auto` follows the
//! aspect ratio of its `viewBox`.

use crate::document::{Document, NodeId, Rect};

impl Document {
    /// Recompute the layout rectangle of an element and return it.
    ///
    /// Elements without responsive styles keep their current rectangle.
    pub fn force_reflow(&mut self, id: NodeId) -> Rect {
        let Some(el) = self.element(id) else {
            return Rect::default();
        };

        if el.style("display") == Some("none") {
            return Rect::default();
        }

        let mut rect = el.rect;
        if el.style("width") == Some("100%")
            && let Some(width) = self.container_width(id)
        {
            rect.width = width;
            if el.style("height") == Some("auto")
                && let Some((vb_width, vb_height)) = el.attr("viewBox").and_then(parse_view_box)
                && vb_width > 0.0
            {
                rect.height = width * vb_height / vb_width;
            }
        }

        if let Some(el) = self.element_mut(id) {
            el.rect = rect;
        }
        rect
    }

    fn container_width(&self, id: NodeId) -> Option<f64> {
        let mut current = self.parent_element(id);
        while let Some(node) = current {
            let width = self.element(node).map_or(0.0, |el| el.rect.width);
            if width > 0.0 {
                return Some(width);
            }
            current = self.parent_element(node);
        }
        None
    }
}

/// Parse `"min-x min-y width height"` into `(width, height)`.
fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let parts: Vec<f64> = value
        .split([' ', ','])
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, width, height] => Some((*width, *height)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    fn page_with_svg(svg_attrs: &str) -> (Document, NodeId) {
        let html = format!(r#"<div class="diagram-wrapper"><div class="mermaid"><svg {svg_attrs}/></div></div>"#);
        let mut doc = Document::from_body_html(&html).unwrap();
        let wrapper = doc
            .query_selector(doc.root(), &Selector::class("diagram-wrapper"))
            .unwrap();
        doc.element_mut(wrapper).unwrap().rect = Rect::sized(800.0, 400.0);
        let svg = doc.query_selector(doc.root(), &Selector::tag("svg")).unwrap();
        doc.element_mut(svg).unwrap().rect = Rect::sized(300.0, 150.0);
        (doc, svg)
    }

    #[test]
    fn test_responsive_width_follows_container() {
        let (mut doc, svg) =
            page_with_svg(r#"viewBox="0 0 300 150" style="width: 100%; height: auto""#);
        let rect = doc.force_reflow(svg);
        assert!((rect.width - 800.0).abs() < f64::EPSILON);
        assert!((rect.height - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fixed_graphic_keeps_rect() {
        let (mut doc, svg) = page_with_svg(r#"width="300""#);
        let rect = doc.force_reflow(svg);
        assert_eq!(rect, Rect::sized(300.0, 150.0));
    }

    #[test]
    fn test_hidden_graphic_has_no_box() {
        let (mut doc, svg) = page_with_svg(r#"style="display: none""#);
        assert_eq!(doc.force_reflow(svg), Rect::default());
    }

    #[test]
    fn test_parse_view_box() {
        assert_eq!(parse_view_box("0 0 10 20"), Some((10.0, 20.0)));
        assert_eq!(parse_view_box("0,0,10,20"), Some((10.0, 20.0)));
        assert_eq!(parse_view_box("0 0 10"), None);
        assert_eq!(parse_view_box("a b c d"), None);
    }
}
