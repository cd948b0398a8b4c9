//! sprig DOM - Document Object Model
//!
//! Arena-based DOM tree with attribute, class and inline-style mutation,
//! an event listener registry, and a small CSS selector engine.

mod document;
mod events;
mod node;
mod selector;
mod style;
mod tree;

pub use document::Document;
pub use events::{Event, EventRegistry, EventType, Handler};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use selector::{
    AttributeMatcher, AttributeSelector, PseudoClass, SelectorComponent, SelectorError,
    SelectorList, query_all,
};
pub use style::{parse_declarations, serialize_declarations};
pub use tree::{Ancestors, Children, Descendants, DomTree};

/// Node identifier (index into the tree arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Absent node (no parent, no sibling)
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Check if this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
