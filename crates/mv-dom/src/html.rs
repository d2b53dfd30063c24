//! XHTML fragment parsing and serialization.

use std::borrow::Cow;
use std::fmt::Write as _;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::document::{Document, NodeId, NodeKind};
use crate::error::DomError;

impl Document {
    /// Parse an XHTML fragment into a new detached fragment node.
    ///
    /// Markup must be well-formed XML; named entities beyond the XML set are
    /// limited to the few that appear in rendered code blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be parsed.
    pub fn parse_fragment(&mut self, html: &str) -> Result<NodeId, DomError> {
        let wrapped = format!("<root>{html}</root>");
        let mut reader = Reader::from_str(&wrapped);
        reader.config_mut().trim_text(false);

        let fragment = self.create_fragment();
        // The synthetic <root> maps onto the fragment itself.
        let mut stack: Vec<NodeId> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    if stack.is_empty() {
                        stack.push(fragment);
                    } else {
                        let node = self.element_from_start(&reader, &e);
                        self.adopt(stack[stack.len() - 1], node);
                        stack.push(node);
                    }
                }
                Event::Empty(e) => {
                    if let Some(&parent) = stack.last() {
                        let node = self.element_from_start(&reader, &e);
                        self.adopt(parent, node);
                    }
                }
                Event::Text(e) => {
                    if let Some(&parent) = stack.last() {
                        let text = reader.decoder().decode(&e)?.into_owned();
                        self.append_text(parent, &text);
                    }
                }
                Event::GeneralRef(e) => {
                    if let Some(&parent) = stack.last() {
                        let entity = reader.decoder().decode(&e)?.into_owned();
                        self.append_text(parent, &decode_entity(&entity));
                    }
                }
                Event::CData(e) => {
                    if let Some(&parent) = stack.last() {
                        let text = String::from_utf8_lossy(&e).into_owned();
                        self.append_text(parent, &text);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                    if stack.is_empty() {
                        break;
                    }
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }

        Ok(fragment)
    }

    fn element_from_start<R>(&mut self, reader: &Reader<R>, e: &BytesStart) -> NodeId {
        let tag = decode_lossy(reader, e.name().as_ref());
        let node = self.create_element(&tag);
        for attr in e.attributes().flatten() {
            let key = decode_lossy(reader, attr.key.as_ref());
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                Cow::into_owned,
            );
            if let Some(el) = self.element_mut(node) {
                el.set_attr(key, value);
            }
        }
        node
    }

    /// Attach a freshly parsed node. Detached fragments are invisible to observers.
    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        // Both nodes were just created and are detached, so this cannot fail.
        if let Err(err) = self.append_child(parent, child) {
            tracing::debug!(error = %err, "Failed to attach parsed node");
        }
    }

    /// Merge text into a trailing text node or create one.
    fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = self.children(parent).last().copied();
        if let Some(last) = last
            && let Some(existing) = self.text_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text);
        self.adopt(parent, node);
    }

    /// Serialize a node including itself.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of a node.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
            Some(NodeKind::Fragment) => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            Some(NodeKind::Element(el)) => {
                let _ = write!(out, "<{}", el.tag());
                for (name, value) in el.attrs() {
                    let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
                }
                let style = el.style_text();
                if !style.is_empty() {
                    let _ = write!(out, " style=\"{}\"", escape_attr(&style));
                }
                out.push('>');
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{}>", el.tag());
            }
            None => {}
        }
    }
}

fn decode_lossy<R>(reader: &Reader<R>, bytes: &[u8]) -> String {
    reader.decoder().decode(bytes).map_or_else(
        |_| String::from_utf8_lossy(bytes).into_owned(),
        Cow::into_owned,
    )
}

/// Decode an entity reference to its character value.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        "nbsp" => "\u{00a0}".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
