//! DOM Tree (arena-based allocation)
//!
//! Index 0 is always the document root. Detached nodes keep their arena
//! slot; a node has at most one parent, so inserting an attached node
//! moves it.

use crate::node::{ElementData, Node, NodeData};
use crate::NodeId;

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes ever allocated (detached slots included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The document root
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element node
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(Node::element(ElementData::new(name)))
    }

    /// Create a detached element node from prepared element data
    pub fn create_element_from(&mut self, data: ElementData) -> NodeId {
        self.alloc(Node::element(data))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.alloc(Node::comment(content.to_string()))
    }

    /// Parent of a node (NONE for the root and detached nodes)
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NONE, |n| n.parent)
    }

    /// Parent, but only if it is an element
    pub fn element_parent(&self, id: NodeId) -> NodeId {
        let parent = self.parent(id);
        match self.get(parent) {
            Some(node) if node.is_element() => parent,
            _ => NodeId::NONE,
        }
    }

    /// Element data of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data of a node, if it is an element
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Check whether a node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.detach(child);
        let last = self.nodes[parent.index()].last_child;
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
            self.nodes[child.index()].prev_sibling = last;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        self.nodes[child.index()].parent = parent;
    }

    /// Insert `child` as the first child of `parent`, detaching it first
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.detach(child);
        let first = self.nodes[parent.index()].first_child;
        if first.is_valid() {
            self.nodes[first.index()].prev_sibling = child;
            self.nodes[child.index()].next_sibling = first;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
        self.nodes[parent.index()].first_child = child;
        self.nodes[child.index()].parent = parent;
    }

    /// Unlink a node from its parent and siblings; the arena slot survives
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else if parent.is_valid() {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else if parent.is_valid() {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Detach every child of a node, returning the detached IDs in order
    pub fn clear_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children: Vec<NodeId> = self.children(id).collect();
        for &child in &children {
            self.detach(child);
        }
        children
    }

    /// Iterate direct children in document order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Iterate ancestors from the parent upwards (root included)
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Iterate the subtree below a node in document (pre-)order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Concatenated text of every text node in the subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
        }
        for desc in self.descendants(id) {
            if let Some(text) = self.get(desc).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.nodes[current.index()].next_sibling;
        Some(current)
    }
}

/// Iterator over ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let current = self.next;
        self.next = self.tree.nodes[current.index()].parent;
        Some(current)
    }
}

/// Pre-order iterator over a subtree (start node excluded)
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let mut children: Vec<NodeId> = self.tree.children(current).collect();
        children.reverse();
        self.stack.extend(children);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p = tree.create_element("p");
        let text = tree.create_text("hi");
        tree.append_child(tree.root(), div);
        tree.append_child(div, p);
        tree.append_child(p, text);
        (tree, div, p, text)
    }

    #[test]
    fn test_append_links_siblings() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        tree.append_child(tree.root(), parent);
        tree.append_child(parent, a);
        tree.append_child(parent, b);

        let children: Vec<NodeId> = tree.children(parent).collect();
        assert_eq!(children, vec![a, b]);
    }

    #[test]
    fn test_prepend_orders_first() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        tree.append_child(parent, a);
        tree.prepend_child(parent, b);

        let children: Vec<NodeId> = tree.children(parent).collect();
        assert_eq!(children, vec![b, a]);
    }

    #[test]
    fn test_append_moves_attached_node() {
        let mut tree = DomTree::new();
        let first = tree.create_element("div");
        let second = tree.create_element("div");
        let child = tree.create_element("span");
        tree.append_child(first, child);
        tree.append_child(second, child);

        assert_eq!(tree.children(first).count(), 0);
        assert_eq!(tree.children(second).collect::<Vec<_>>(), vec![child]);
        assert_eq!(tree.parent(child), second);
    }

    #[test]
    fn test_detach_unlinks_middle_sibling() {
        let mut tree = DomTree::new();
        let parent = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        let c = tree.create_element("li");
        for id in [a, b, c] {
            tree.append_child(parent, id);
        }
        tree.detach(b);

        assert_eq!(tree.children(parent).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(tree.parent(b), NodeId::NONE);
    }

    #[test]
    fn test_descendants_document_order() {
        let (tree, div, p, text) = sample();
        let order: Vec<NodeId> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![div, p, text]);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let (tree, div, p, text) = sample();
        let chain: Vec<NodeId> = tree.ancestors(text).collect();
        assert_eq!(chain, vec![p, div, tree.root()]);
    }

    #[test]
    fn test_text_content_concatenates() {
        let (tree, div, _, _) = sample();
        assert_eq!(tree.text_content(div), "hi");
    }

    #[test]
    fn test_element_parent_skips_document() {
        let (tree, div, p, _) = sample();
        assert_eq!(tree.element_parent(p), div);
        assert_eq!(tree.element_parent(div), NodeId::NONE);
    }
}
