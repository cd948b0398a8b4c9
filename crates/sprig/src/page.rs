//! Page - the document handle
//!
//! Owns the parsed document behind a shared handle; `select` is the entry
//! point into the chainable wrapper.

use std::cell::RefCell;
use std::rc::Rc;

use sprig_dom::{Document, NodeId, SelectorList};

use crate::selection::Selection;

/// A loaded document
#[derive(Clone)]
pub struct Page {
    doc: Rc<RefCell<Document>>,
}

impl Page {
    /// Parse an HTML string into a page
    pub fn from_html(html: &str) -> Self {
        Self {
            doc: Rc::new(RefCell::new(sprig_html::parse(html))),
        }
    }

    /// An empty page (document root only)
    pub fn empty() -> Self {
        Self {
            doc: Rc::new(RefCell::new(Document::new("about:blank"))),
        }
    }

    /// Select all elements matching a CSS selector, in document order.
    ///
    /// A selector that matches nothing - or does not parse - yields
    /// [`Selection::Empty`].
    pub fn select(&self, selector: &str) -> Selection {
        let list = match SelectorList::parse(selector) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(selector, %err, "invalid selector");
                return Selection::Empty;
            }
        };
        let nodes = self.doc.borrow().query(&list);
        tracing::debug!(selector, matches = nodes.len(), "select");
        Selection::new(self.doc.clone(), nodes)
    }

    /// Create a detached element, e.g. to `append` somewhere
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.doc.borrow_mut().tree_mut().create_element(tag)
    }

    /// Serialize the whole document back to markup
    pub fn html(&self) -> String {
        let doc = self.doc.borrow();
        sprig_html::serialize_children(doc.tree(), doc.tree().root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_matches() {
        let page = Page::from_html("<p>a</p><p>b</p>");
        assert_eq!(page.select("p").len(), 2);
    }

    #[test]
    fn test_select_no_match_is_empty() {
        let page = Page::from_html("<p>a</p>");
        assert!(!page.select("article").exists());
    }

    #[test]
    fn test_select_invalid_selector_is_empty() {
        let page = Page::from_html("<p>a</p>");
        assert!(!page.select("p >> ?").exists());
        assert!(!page.select("").exists());
    }

    #[test]
    fn test_html_round_trip() {
        let page = Page::from_html("<body><p>hi</p></body>");
        assert!(page.html().contains("<p>hi</p>"));
    }
}
