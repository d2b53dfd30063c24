//! Arena document and element types.

use std::collections::BTreeMap;

use tokio::sync::mpsc;

use crate::error::DomError;
use crate::observer::{MutationObserver, MutationRecord, ObserverEntry};
use crate::selector::Selector;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index, for diagnostics.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Rectangle anchored at the origin.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Whether both dimensions are non-zero.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width != 0.0 && self.height != 0.0
    }
}

/// Element data: tag, attributes, inline styles, and layout.
///
/// `id` and `class` live in the attribute map; inline styles are kept apart
/// and serialized back into a `style` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    /// Bounding client rectangle as last laid out.
    pub rect: Rect,
    /// Intrinsic graphic bounds (`getBBox`), only set on graphics.
    pub bbox: Option<Rect>,
}

impl Element {
    /// Create an element with the given tag (stored lower-cased).
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Tag name in lower case.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Value of the `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// All attributes in name order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set an attribute. A `style` attribute is parsed into inline styles.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if name == "style" {
            self.styles = parse_style(&value);
        } else {
            self.attrs.insert(name, value);
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.remove(name)
    }

    /// Whether the attribute is present.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Class names in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Raw `class` attribute value (empty when absent).
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.attr("class").unwrap_or_default()
    }

    /// Whether the element carries the class.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.attrs.insert("class".to_owned(), joined);
    }

    /// Remove every occurrence of a class.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        let joined = remaining.join(" ");
        self.attrs.insert("class".to_owned(), joined);
    }

    /// Inline style value.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.styles.insert(property.into(), value.into());
    }

    /// Remove an inline style property.
    pub fn remove_style(&mut self, property: &str) {
        self.styles.remove(property);
    }

    /// Inline styles serialized as a `style` attribute value.
    #[must_use]
    pub fn style_text(&self) -> String {
        self.styles
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn parse_style(value: &str) -> BTreeMap<String, String> {
    value
        .split(';')
        .filter_map(|decl| {
            let (prop, val) = decl.split_once(':')?;
            let prop = prop.trim();
            let val = val.trim();
            (!prop.is_empty()).then(|| (prop.to_owned(), val.to_owned()))
        })
        .collect()
}

/// Node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    /// Detached container whose children move on insertion.
    Fragment,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document.
///
/// Nodes are never freed; removed nodes stay in the arena detached from the
/// tree, matching how scripts may still hold references to removed elements.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observers: Vec<ObserverEntry>,
    next_observer_id: u64,
    observers_supported: bool,
    viewport_width: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with `html`, `head`, and `body` elements.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.attach(doc.root, head, None);
        doc.attach(doc.root, body, None);
        doc
    }

    /// Create a document with only the `html` root (no head, no body).
    #[must_use]
    pub fn empty() -> Self {
        let root = Node {
            kind: NodeKind::Element(Element::new("html")),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            observers: Vec::new(),
            next_observer_id: 0,
            observers_supported: true,
            viewport_width: 1280.0,
        }
    }

    /// Create a document and parse `html` into its body.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is not well-formed XML.
    pub fn from_body_html(html: &str) -> Result<Self, DomError> {
        let mut doc = Self::new();
        let fragment = doc.parse_fragment(html)?;
        let body = doc.body().ok_or(DomError::NotAnElement(0))?;
        doc.append_child(body, fragment)?;
        Ok(doc)
    }

    /// The `html` root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `head` element, if present.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.child_with_tag(self.root, "head")
    }

    /// The `body` element, if present.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.child_with_tag(self.root, "body")
    }

    fn child_with_tag(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.element(c).is_some_and(|e| e.tag() == tag))
    }

    /// Layout viewport width in CSS pixels.
    #[must_use]
    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Set the layout viewport width.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Declare whether this page can deliver mutation records.
    pub fn set_observers_supported(&mut self, supported: bool) {
        self.observers_supported = supported;
    }

    // -- Node creation -----------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Create an empty fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    // -- Accessors ---------------------------------------------------------

    /// Node payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    /// Element data, if the node is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Mutable element data, if the node is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Mutable element data or [`DomError::NotAnElement`].
    pub fn expect_element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        self.element_mut(id).ok_or(DomError::NotAnElement(id.0))
    }

    pub(crate) fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Whether the node is a fragment.
    #[must_use]
    pub fn is_fragment(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Fragment))
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Nearest ancestor that is an element.
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.element(p).is_some())
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// First child that is an element.
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.element(c).is_some())
    }

    /// Whether the node is attached to the document root.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    ///
    /// Iterative pre-order walk; safe on arbitrarily deep trees.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    // -- Queries -----------------------------------------------------------

    /// Whether the node is an element matching the selector.
    #[must_use]
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id).is_some_and(|el| selector.matches(el))
    }

    /// Closest inclusive ancestor matching the selector.
    #[must_use]
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// First descendant of `scope` matching the selector.
    #[must_use]
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.matches(n, selector))
    }

    /// All descendants of `scope` matching the selector, in document order.
    #[must_use]
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    /// Descendants of `scope` carrying the class.
    #[must_use]
    pub fn get_elements_by_class_name(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.element(n).is_some_and(|el| el.has_class(class)))
            .collect()
    }

    /// Connected element with the given id.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.element(n).is_some_and(|el| el.id() == Some(id)))
    }

    /// Concatenated text of the node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeKind::Text(text)) = self.kind(id) {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // -- Mutation ----------------------------------------------------------

    /// Append `child` to `parent`. Fragments move their children instead.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::HierarchyRequest`] if `child` is an ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or at the end).
    ///
    /// # Errors
    ///
    /// Returns an error on hierarchy violations or a foreign `reference`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest {
                parent: parent.0,
                child: child.0,
            });
        }
        if let Some(reference) = reference
            && self.parent(reference) != Some(parent)
        {
            return Err(DomError::NotAChild {
                parent: parent.0,
                child: reference.0,
            });
        }

        let moved = if self.is_fragment(child) {
            std::mem::take(&mut self.nodes[child.0].children)
        } else {
            self.detach(child);
            vec![child]
        };

        for &node in &moved {
            self.nodes[node.0].parent = None;
            self.attach(parent, node, reference);
        }

        if !moved.is_empty() {
            self.record(MutationRecord {
                target: parent,
                added_nodes: moved,
                removed_nodes: Vec::new(),
            });
        }
        Ok(())
    }

    /// Replace `old` (a child of `parent`) with `new`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotAChild`] if `old` is not a child of `parent`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new: NodeId,
        old: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(old) != Some(parent) {
            return Err(DomError::NotAChild {
                parent: parent.0,
                child: old.0,
            });
        }
        self.insert_before(parent, new, Some(old))?;
        self.remove(old);
        Ok(())
    }

    /// Detach a node from its parent. No-op for detached nodes.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.detach(id) {
            self.record(MutationRecord {
                target: parent,
                added_nodes: Vec::new(),
                removed_nodes: vec![id],
            });
        }
    }

    /// Remove all children of a node.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let node = self.create_text(text);
        self.attach(id, node, None);
        self.record(MutationRecord {
            target: id,
            added_nodes: vec![node],
            removed_nodes: Vec::new(),
        });
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let position = reference
            .and_then(|r| self.nodes[parent.0].children.iter().position(|&c| c == r))
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(id.0)?.parent?;
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
        Some(parent)
    }

    // -- Observation -------------------------------------------------------

    /// Start observing child-list mutations in the subtree of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::ObserverUnsupported`] when the page cannot deliver records.
    pub fn observe(&mut self, target: NodeId) -> Result<MutationObserver, DomError> {
        if !self.observers_supported {
            return Err(DomError::ObserverUnsupported);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push(ObserverEntry {
            id,
            target,
            sender: tx,
        });
        Ok(MutationObserver::new(id, rx))
    }

    /// Number of live observers (disconnected ones are pruned first).
    pub fn observer_count(&mut self) -> usize {
        self.observers.retain(|o| !o.sender.is_closed());
        self.observers.len()
    }

    fn record(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        self.observers.retain(|o| !o.sender.is_closed());
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, o)| self.is_inclusive_ancestor(o.target, record.target))
            .map(|(i, _)| i)
            .collect();
        for index in interested {
            let entry = &self.observers[index];
            if entry.sender.send(record.clone()).is_err() {
                tracing::debug!(observer = entry.id, "Mutation observer closed during delivery");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_new_document_has_head_and_body() {
        let doc = Document::new();
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert!(Document::empty().body().is_none());
    }

    #[test]
    fn test_class_list_operations() {
        let mut el = Element::new("DIV");
        assert_eq!(el.tag(), "div");
        el.add_class("a");
        el.add_class("b");
        el.add_class("a");
        assert_eq!(el.class_name(), "a b");
        el.remove_class("a");
        assert_eq!(el.class_name(), "b");
        assert!(el.has_class("b"));
        assert!(!el.has_class("a"));
    }

    #[test]
    fn test_style_attribute_parsed() {
        let mut el = Element::new("svg");
        el.set_attr("style", "max-width: 100px; display:block");
        assert_eq!(el.style("max-width"), Some("100px"));
        assert_eq!(el.style("display"), Some("block"));
        assert!(!el.has_attr("style"));
        assert_eq!(el.style_text(), "display: block; max-width: 100px");
    }

    #[test]
    fn test_append_and_descendants_order() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = doc.create_element("div");
        let b = doc.create_element("span");
        let c = doc.create_element("p");
        doc.append_child(body, a).unwrap();
        doc.append_child(a, b).unwrap();
        doc.append_child(body, c).unwrap();

        assert_eq!(doc.descendants(body), vec![a, b, c]);
        assert_eq!(doc.parent(b), Some(a));
        assert!(doc.is_connected(b));
    }

    #[test]
    fn test_append_rejects_cycle() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = doc.create_element("div");
        doc.append_child(body, a).unwrap();
        let err = doc.append_child(a, body).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest { .. }));
    }

    #[test]
    fn test_fragment_children_move_on_insert() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let fragment = doc.create_fragment();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(fragment, a).unwrap();
        doc.append_child(fragment, b).unwrap();

        doc.append_child(body, fragment).unwrap();
        assert_eq!(doc.children(body), &[a, b]);
        assert!(doc.children(fragment).is_empty());
    }

    #[test]
    fn test_replace_child() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let old = doc.create_element("pre");
        let new = doc.create_element("div");
        doc.append_child(body, old).unwrap();

        doc.replace_child(body, new, old).unwrap();
        assert_eq!(doc.children(body), &[new]);
        assert!(!doc.is_connected(old));
    }

    #[test]
    fn test_replace_child_requires_parent() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let old = doc.create_element("pre");
        let new = doc.create_element("div");
        assert!(matches!(
            doc.replace_child(body, new, old),
            Err(DomError::NotAChild { .. })
        ));
    }

    #[test]
    fn test_get_element_by_id_ignores_detached() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let el = doc.create_element("div");
        doc.expect_element_mut(el).unwrap().set_attr("id", "target");
        assert_eq!(doc.get_element_by_id("target"), None);

        doc.append_child(body, el).unwrap();
        assert_eq!(doc.get_element_by_id("target"), Some(el));

        doc.remove(el);
        assert_eq!(doc.get_element_by_id("target"), None);
    }

    #[test]
    fn test_closest_is_inclusive() {
        let mut doc = Document::from_body_html(
            r#"<div class="mermaid-wrapper"><div class="inner"><span>x</span></div></div>"#,
        )
        .unwrap();
        let wrapper_sel = Selector::class("mermaid-wrapper");
        let span = doc.query_selector(doc.root(), &Selector::tag("span")).unwrap();
        let wrapper = doc.query_selector(doc.root(), &wrapper_sel).unwrap();
        assert_eq!(doc.closest(span, &wrapper_sel), Some(wrapper));
        assert_eq!(doc.closest(wrapper, &wrapper_sel), Some(wrapper));

        let detached = doc.create_element("span");
        assert_eq!(doc.closest(detached, &wrapper_sel), None);
    }

    #[test]
    fn test_text_content_concatenates() {
        let doc = Document::from_body_html("<pre><code>graph TD\n<span>A</span></code></pre>").unwrap();
        let pre = doc.query_selector(doc.root(), &Selector::tag("pre")).unwrap();
        assert_eq!(doc.text_content(pre), "graph TD\nA");
    }

    #[test]
    fn test_observer_receives_subtree_records() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let mut observer = doc.observe(body).unwrap();

        let outer = doc.create_element("div");
        doc.append_child(body, outer).unwrap();
        let inner = doc.create_element("span");
        doc.append_child(outer, inner).unwrap();

        let first = observer.try_recv().unwrap();
        assert_eq!(first.target, body);
        assert_eq!(first.added_nodes, vec![outer]);
        let second = observer.try_recv().unwrap();
        assert_eq!(second.target, outer);
        assert_eq!(second.added_nodes, vec![inner]);
        assert!(observer.try_recv().is_none());
    }

    #[test]
    fn test_observer_outside_subtree_not_notified() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let head = doc.head().unwrap();
        let mut observer = doc.observe(body).unwrap();

        let style = doc.create_element("style");
        doc.append_child(head, style).unwrap();
        assert!(observer.try_recv().is_none());
    }

    #[test]
    fn test_disconnected_observer_is_pruned() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let observer = doc.observe(body).unwrap();
        assert_eq!(doc.observer_count(), 1);
        observer.disconnect();
        assert_eq!(doc.observer_count(), 0);
    }

    #[test]
    fn test_observe_unsupported() {
        let mut doc = Document::new();
        doc.set_observers_supported(false);
        let body = doc.body().unwrap();
        assert!(matches!(doc.observe(body), Err(DomError::ObserverUnsupported)));
    }
}
