//! Minimal selector language.
//!
//! Supports compound selectors made of an optional tag, an optional `#id`,
//! and any number of `.class` parts, combined into comma-separated lists.
//! Combinators are not supported; discovery never needs them.

use crate::document::Element;
use crate::error::DomError;

/// One compound selector, e.g. `code.language-mermaid`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    /// Match elements with the given tag name.
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into().to_ascii_lowercase()),
            ..Self::default()
        }
    }

    /// Match elements carrying the given class.
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            classes: vec![class.into()],
            ..Self::default()
        }
    }

    /// Add a required class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Require the given element id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether the element satisfies every part of this compound.
    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && !element.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.id() != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|class| element.has_class(class))
    }

    fn parse(input: &str) -> Result<Self, DomError> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return Err(DomError::InvalidSelector(input.to_owned()));
        }

        let mut compound = Self::default();
        let mut rest = input;

        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        if tag_end > 0 {
            compound.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return Err(DomError::InvalidSelector(input.to_owned()));
            }
            if marker == '.' {
                compound.classes.push(name.to_owned());
            } else {
                compound.id = Some(name.to_owned());
            }
            rest = &body[end..];
        }

        Ok(compound)
    }
}

/// A list of compound selectors; matches when any member matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parse a selector string such as `".language-mermaid, code.mermaid"`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidSelector`] for empty parts or unsupported syntax.
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let alternatives = input
            .split(',')
            .map(Compound::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    /// Selector matching a single class.
    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Compound::class(class).into()
    }

    /// Selector matching a tag name.
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Compound::tag(tag).into()
    }

    /// Selector matching an element id.
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Compound::default().with_id(id).into()
    }

    /// Selector matching any of the given compounds.
    #[must_use]
    pub fn any(alternatives: Vec<Compound>) -> Self {
        Self { alternatives }
    }

    /// Whether the element matches any alternative.
    #[must_use]
    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }
}

impl From<Compound> for Selector {
    fn from(compound: Compound) -> Self {
        Self {
            alternatives: vec![compound],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, class: &str) -> Element {
        let mut el = Element::new(tag);
        el.set_attr("class", class);
        el
    }

    #[test]
    fn test_parse_tag_and_class() {
        let selector = Selector::parse("code.mermaid").unwrap();
        assert!(selector.matches(&element("code", "mermaid")));
        assert!(selector.matches(&element("CODE", "x mermaid")));
        assert!(!selector.matches(&element("pre", "mermaid")));
        assert!(!selector.matches(&element("code", "language-mermaid")));
    }

    #[test]
    fn test_parse_list() {
        let selector = Selector::parse(".language-mermaid, pre.language-mermaid, code.mermaid").unwrap();
        assert!(selector.matches(&element("div", "language-mermaid")));
        assert!(selector.matches(&element("code", "mermaid")));
        assert!(!selector.matches(&element("div", "mermaid")));
    }

    #[test]
    fn test_parse_id() {
        let selector = Selector::parse("div#app").unwrap();
        let mut el = Element::new("div");
        el.set_attr("id", "app");
        assert!(selector.matches(&el));
        el.set_attr("id", "other");
        assert!(!selector.matches(&el));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div .x").is_err());
        assert!(Selector::parse("div.").is_err());
        assert!(Selector::parse("a,,b").is_err());
    }

    #[test]
    fn test_multiple_classes_required() {
        let selector = Selector::parse(".a.b").unwrap();
        assert!(selector.matches(&element("span", "b a")));
        assert!(!selector.matches(&element("span", "a")));
    }
}
