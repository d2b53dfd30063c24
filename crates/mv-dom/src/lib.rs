//! In-memory page model for the Mermaid view runtime.
//!
//! The runtime reads and rewrites the host page the same way a browser script
//! would. This crate provides the page it operates on:
//!
//! - [`Document`]: arena of element, text, and fragment nodes addressed by [`NodeId`]
//! - [`Selector`]: the small selector language used for discovery (`tag`, `.class`,
//!   `#id`, `tag.class`, comma lists)
//! - [`MutationObserver`]: child-list mutation records delivered over a channel
//! - [`Page`]: cloneable shared handle used by concurrent collaborators
//!
//! Host bindings mirror browser state into a [`Document`]; tests build one from
//! XHTML fragments with [`Document::from_body_html`].
//!
//! # Example
//!
//! ```
//! use mv_dom::{Document, Selector};
//!
//! let doc = Document::from_body_html(
//!     r#"<div class="language-mermaid"><pre><code>graph TD; A--&gt;B</code></pre></div>"#,
//! )
//! .unwrap();
//! let wrappers = doc.query_selector_all(doc.root(), &Selector::class("language-mermaid"));
//! assert_eq!(wrappers.len(), 1);
//! ```

mod document;
mod error;
mod html;
mod layout;
mod observer;
mod page;
mod selector;

pub use document::{Document, Element, NodeId, NodeKind, Rect};
pub use error::DomError;
pub use observer::{MutationObserver, MutationRecord};
pub use page::Page;
pub use selector::{Compound, Selector};
