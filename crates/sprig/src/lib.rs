//! sprig - chainable DOM helpers
//!
//! A small DOM-manipulation layer: select elements from a parsed document
//! with a CSS selector, then traverse and mutate them through a chainable
//! wrapper. A standalone callback-based request helper rides along.
//!
//! ```
//! use sprig::Page;
//!
//! let page = Page::from_html("<ul><li>one</li><li>two</li></ul>");
//! let items = page.select("li");
//! assert_eq!(items.len(), 2);
//!
//! items.css("color", "red").toggle_class("lit");
//! assert!(page.select("li.lit").exists());
//! ```
//!
//! Traversal methods build a new [`Selection`]; mutation methods return the
//! one they were called on. A selector that matches nothing yields
//! [`Selection::Empty`] - never an error.

mod page;
mod selection;

pub use page::Page;
pub use selection::{Content, ElementSet, Selection};
pub use sprig_dom::{Event, EventType, NodeId};
pub use sprig_net::{ajax, perform, Method, RequestConfig, Response};
