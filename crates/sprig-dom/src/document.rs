//! Document - High-level document API

use crate::events::{EventRegistry, EventType, Handler};
use crate::selector::{query_all, SelectorList};
use crate::tree::DomTree;
use crate::NodeId;

/// A document: the DOM tree plus its event listener table
pub struct Document {
    tree: DomTree,
    url: String,
    events: EventRegistry,
}

impl Document {
    /// Create an empty document (root node only)
    pub fn new(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            events: EventRegistry::new(),
        }
    }

    /// Document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The document element (first element child of the root), e.g. `<html>`
    pub fn document_element(&self) -> NodeId {
        self.tree
            .children(self.tree.root())
            .find(|&id| self.tree.is_element(id))
            .unwrap_or(NodeId::NONE)
    }

    /// All elements matching the selector list, in document order
    pub fn query(&self, list: &SelectorList) -> Vec<NodeId> {
        query_all(&self.tree, list)
    }

    /// Register an event handler on a node
    pub fn add_event_listener<F>(&mut self, target: NodeId, event_type: EventType, handler: F)
    where
        F: FnMut(&mut crate::Event) + 'static,
    {
        self.events.add(target, event_type, handler);
    }

    /// Register a shared handler on a node
    pub fn add_shared_listener(&mut self, target: NodeId, event_type: EventType, handler: Handler) {
        self.events.add_shared(target, event_type, handler);
    }

    /// Snapshot of the handlers bound to a node
    pub fn handlers_for(&self, target: NodeId, event_type: EventType) -> Vec<Handler> {
        self.events.handlers(target, event_type)
    }

    /// Number of handlers bound to a node
    pub fn listener_count(&self, target: NodeId, event_type: EventType) -> usize {
        self.events.count(target, event_type)
    }
}
