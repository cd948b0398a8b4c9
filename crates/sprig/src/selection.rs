//! Selection - the chainable element wrapper
//!
//! A `Selection` is either `Empty` (the no-match sentinel) or a populated
//! `ElementSet`. Traversal methods construct a new selection; mutation
//! methods act on the referenced nodes and hand back the selection they
//! were called on. On `Empty` every traversal yields `Empty` and every
//! mutation is a no-op, so chains never panic.

use std::cell::RefCell;
use std::rc::Rc;

use sprig_dom::{Document, DomTree, Event, EventType, Handler, NodeId, SelectorList};

/// Insertable content
#[derive(Debug, Clone)]
pub enum Content {
    /// An existing node. A node has one parent, so inserting it into a
    /// multi-element selection moves it along; the last target keeps it.
    Node(NodeId),
    /// Markup, parsed fresh for every target element.
    Markup(String),
}

impl From<&str> for Content {
    fn from(markup: &str) -> Self {
        Self::Markup(markup.to_string())
    }
}

impl From<String> for Content {
    fn from(markup: String) -> Self {
        Self::Markup(markup)
    }
}

impl From<NodeId> for Content {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

#[derive(Clone, Copy)]
enum InsertAt {
    Start,
    End,
}

/// Result of a query or traversal: the no-match sentinel or a populated set
#[derive(Clone)]
pub enum Selection {
    /// Nothing matched
    Empty,
    /// At least one element matched
    Matched(ElementSet),
}

impl Selection {
    pub(crate) fn new(doc: Rc<RefCell<Document>>, nodes: Vec<NodeId>) -> Self {
        if nodes.is_empty() {
            Self::Empty
        } else {
            Self::Matched(ElementSet { doc, nodes })
        }
    }

    /// Did the query match anything?
    pub fn exists(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Number of matched elements
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Matched(set) => set.nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.exists()
    }

    /// Matched node IDs in document-query order
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            Self::Empty => &[],
            Self::Matched(set) => &set.nodes,
        }
    }

    /// Unique immediate parents of the matched elements. With a selector,
    /// only matching parents are kept (general path); a single-element
    /// selection returns its parent outright.
    pub fn parent(&self, selector: Option<&str>) -> Selection {
        match self {
            Self::Empty => Self::Empty,
            Self::Matched(set) => set.parents_at(1, selector),
        }
    }

    /// Same contract as [`parent`](Self::parent), one level further up.
    pub fn grand_parent(&self, selector: Option<&str>) -> Selection {
        match self {
            Self::Empty => Self::Empty,
            Self::Matched(set) => set.parents_at(2, selector),
        }
    }

    /// Walk each element's ancestor chain rootward; the first ancestor
    /// matching `selector` wins and is returned alone. The selector is
    /// required: an empty one yields `Empty`.
    pub fn ancestor(&self, selector: &str) -> Selection {
        match self {
            Self::Empty => Self::Empty,
            Self::Matched(set) => set.ancestor(selector),
        }
    }

    /// Bind a click handler to every matched element
    pub fn on_click<F>(self, handler: F) -> Self
    where
        F: FnMut(&mut Event) + 'static,
    {
        if let Self::Matched(set) = &self {
            set.bind(EventType::Click, handler, false);
        }
        self
    }

    /// Bind an input handler to every matched element
    pub fn on_input<F>(self, handler: F) -> Self
    where
        F: FnMut(&mut Event) + 'static,
    {
        if let Self::Matched(set) = &self {
            set.bind(EventType::Input, handler, false);
        }
        self
    }

    /// Bind a submit handler to the first matched element only
    pub fn on_submit<F>(self, handler: F) -> Self
    where
        F: FnMut(&mut Event) + 'static,
    {
        if let Self::Matched(set) = &self {
            set.bind(EventType::Submit, handler, true);
        }
        self
    }

    /// Replace the inner content of every matched element with the parsed
    /// markup. Empty markup is a no-op.
    pub fn insert_text(self, markup: &str) -> Self {
        if let Self::Matched(set) = &self {
            set.insert_text(markup);
        }
        self
    }

    /// Insert content at the end of every matched element
    pub fn append(self, content: impl Into<Content>) -> Self {
        if let Self::Matched(set) = &self {
            set.insert(&content.into(), InsertAt::End);
        }
        self
    }

    /// Insert content at the start of every matched element
    pub fn prepend(self, content: impl Into<Content>) -> Self {
        if let Self::Matched(set) = &self {
            set.insert(&content.into(), InsertAt::Start);
        }
        self
    }

    /// Remove every matched element from the document. Consumes the
    /// selection; deletion is the end of a chain.
    pub fn delete(self) {
        if let Self::Matched(set) = &self {
            set.delete();
        }
    }

    /// Set an inline style property on every matched element
    pub fn css(self, property: &str, value: &str) -> Self {
        if let Self::Matched(set) = &self {
            set.css(property, value);
        }
        self
    }

    /// Toggle a class on every matched element independently
    pub fn toggle_class(self, name: &str) -> Self {
        if let Self::Matched(set) = &self {
            set.toggle_class(name);
        }
        self
    }

    /// Fire the handlers bound for an event type on every matched element
    pub fn trigger(&self, event_type: EventType) -> &Self {
        if let Self::Matched(set) = self {
            set.trigger(event_type);
        }
        self
    }

    /// Text content of each matched element
    pub fn texts(&self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::Matched(set) => set.texts(),
        }
    }

    /// Attribute value of the first matched element
    pub fn attr(&self, name: &str) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Matched(set) => set.attr(name),
        }
    }

    /// Inner HTML of the first matched element
    pub fn inner_html(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Matched(set) => Some(set.inner_html()),
        }
    }
}

/// A populated, ordered set of element references. The document owns the
/// nodes; the set holds IDs plus a shared handle to reach them.
#[derive(Clone)]
pub struct ElementSet {
    doc: Rc<RefCell<Document>>,
    nodes: Vec<NodeId>,
}

impl ElementSet {
    /// Matched node IDs in document-query order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Populated by construction
    pub fn is_empty(&self) -> bool {
        false
    }

    fn parents_at(&self, depth: usize, selector: Option<&str>) -> Selection {
        let filter = match selector {
            None => None,
            Some(s) => match SelectorList::parse(s) {
                Ok(list) => Some(list),
                Err(err) => {
                    tracing::warn!(selector = s, %err, "invalid selector");
                    return Selection::Empty;
                }
            },
        };

        let doc = self.doc.borrow();
        let tree = doc.tree();

        // one element has one parent: return it outright (no dedup, and no
        // filter on this path) as long as it exists
        if self.nodes.len() == 1 {
            if let Some(target) = element_parent_at(tree, self.nodes[0], depth) {
                return Selection::new(self.doc.clone(), vec![target]);
            }
        }

        let mut parents = Vec::new();
        for &node in &self.nodes {
            let Some(target) = element_parent_at(tree, node, depth) else {
                continue;
            };
            if parents.contains(&target) {
                continue;
            }
            if filter.as_ref().map_or(true, |list| list.matches(tree, target)) {
                parents.push(target);
            }
        }
        Selection::new(self.doc.clone(), parents)
    }

    fn ancestor(&self, selector: &str) -> Selection {
        if selector.trim().is_empty() {
            return Selection::Empty;
        }
        let list = match SelectorList::parse(selector) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(selector, %err, "invalid selector");
                return Selection::Empty;
            }
        };

        let doc = self.doc.borrow();
        let tree = doc.tree();
        for &node in &self.nodes {
            let mut current = node;
            loop {
                let parent = tree.element_parent(current);
                if !parent.is_valid() {
                    // the root element was match-checked on the previous pass
                    break;
                }
                current = parent;
                if list.matches(tree, current) {
                    // first match across the whole set wins
                    return Selection::new(self.doc.clone(), vec![current]);
                }
            }
        }
        Selection::Empty
    }

    fn bind<F>(&self, event_type: EventType, handler: F, first_only: bool)
    where
        F: FnMut(&mut Event) + 'static,
    {
        let shared: Handler = Rc::new(RefCell::new(handler));
        let mut doc = self.doc.borrow_mut();
        let targets = if first_only {
            &self.nodes[..1]
        } else {
            &self.nodes[..]
        };
        for &node in targets {
            doc.add_shared_listener(node, event_type, shared.clone());
        }
    }

    fn trigger(&self, event_type: EventType) {
        for &node in &self.nodes {
            // snapshot first so handlers may borrow the document themselves
            let handlers = self.doc.borrow().handlers_for(node, event_type);
            let mut event = Event::new(event_type, node);
            for handler in handlers {
                (*handler.borrow_mut())(&mut event);
            }
        }
    }

    fn insert_text(&self, markup: &str) {
        if markup.is_empty() {
            return;
        }
        let mut doc = self.doc.borrow_mut();
        let tree = doc.tree_mut();
        for &node in &self.nodes {
            tree.clear_children(node);
            for fresh in sprig_html::parse_fragment_into(tree, markup) {
                tree.append_child(node, fresh);
            }
        }
    }

    fn insert(&self, content: &Content, position: InsertAt) {
        match content {
            Content::Markup(markup) if markup.is_empty() => {}
            Content::Markup(markup) => {
                let mut doc = self.doc.borrow_mut();
                let tree = doc.tree_mut();
                for &node in &self.nodes {
                    let fresh = sprig_html::parse_fragment_into(tree, markup);
                    match position {
                        InsertAt::End => {
                            for id in fresh {
                                tree.append_child(node, id);
                            }
                        }
                        InsertAt::Start => {
                            for id in fresh.into_iter().rev() {
                                tree.prepend_child(node, id);
                            }
                        }
                    }
                }
            }
            Content::Node(id) => {
                let mut doc = self.doc.borrow_mut();
                let tree = doc.tree_mut();
                for &node in &self.nodes {
                    match position {
                        InsertAt::End => tree.append_child(node, *id),
                        InsertAt::Start => tree.prepend_child(node, *id),
                    }
                }
            }
        }
    }

    fn delete(&self) {
        let mut doc = self.doc.borrow_mut();
        let tree = doc.tree_mut();
        for &node in &self.nodes {
            tree.detach(node);
        }
    }

    fn css(&self, property: &str, value: &str) {
        let mut doc = self.doc.borrow_mut();
        for &node in &self.nodes {
            if let Some(elem) = doc.tree_mut().element_mut(node) {
                elem.set_style_property(property, value);
            }
        }
    }

    fn toggle_class(&self, name: &str) {
        let mut doc = self.doc.borrow_mut();
        for &node in &self.nodes {
            if let Some(elem) = doc.tree_mut().element_mut(node) {
                elem.toggle_class(name);
            }
        }
    }

    fn texts(&self) -> Vec<String> {
        let doc = self.doc.borrow();
        self.nodes
            .iter()
            .map(|&node| doc.tree().text_content(node))
            .collect()
    }

    fn attr(&self, name: &str) -> Option<String> {
        let doc = self.doc.borrow();
        doc.tree()
            .element(self.nodes[0])
            .and_then(|elem| elem.get_attr(name).map(str::to_string))
    }

    fn inner_html(&self) -> String {
        let doc = self.doc.borrow();
        sprig_html::serialize_children(doc.tree(), self.nodes[0])
    }
}

fn element_parent_at(tree: &DomTree, node: NodeId, depth: usize) -> Option<NodeId> {
    let mut current = node;
    for _ in 0..depth {
        let parent = tree.element_parent(current);
        if !parent.is_valid() {
            return None;
        }
        current = parent;
    }
    Some(current)
}
