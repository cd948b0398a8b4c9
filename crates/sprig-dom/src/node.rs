//! DOM Node
//!
//! Nodes are linked by `NodeId` rather than pointers; the tree arena owns
//! all node storage.

use crate::NodeId;

/// A single node in the tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn unlinked(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a document root node
    pub fn document() -> Self {
        Self::unlinked(NodeData::Document)
    }

    /// Create an element node
    pub fn element(data: ElementData) -> Self {
        Self::unlinked(NodeData::Element(data))
    }

    /// Create a text node
    pub fn text(content: String) -> Self {
        Self::unlinked(NodeData::Text(content))
    }

    /// Create a comment node
    pub fn comment(content: String) -> Self {
        Self::unlinked(NodeData::Comment(content))
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Check if this is the document root
    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeData::Document)
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name (lowercase)
    pub name: String,
    /// Attributes in document order
    attrs: Vec<Attribute>,
    /// Cached id attribute (very common lookup)
    pub id: Option<String>,
    /// Cached class list
    pub classes: Vec<String>,
}

impl ElementData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
            id: None,
            classes: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Check for attribute presence
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    /// Set an attribute, keeping the id/class caches coherent
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "id" => self.id = Some(value.to_string()),
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            _ => {}
        }
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                attr.value = value.to_string();
                return;
            }
        }
        self.attrs.push(Attribute {
            name,
            value: value.to_string(),
        });
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "id" => self.id = None,
            "class" => self.classes.clear(),
            _ => {}
        }
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// Attributes in document order
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Check class membership
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    /// Toggle a class; returns whether the class is present afterwards
    pub fn toggle_class(&mut self, name: &str) -> bool {
        let present = if let Some(pos) = self.classes.iter().position(|c| c == name) {
            self.classes.remove(pos);
            false
        } else {
            self.classes.push(name.to_string());
            true
        };
        self.write_class_attr();
        present
    }

    fn write_class_attr(&mut self) {
        let joined = self.classes.join(" ");
        if joined.is_empty() {
            let pos = self.attrs.iter().position(|a| a.name == "class");
            if let Some(pos) = pos {
                self.attrs.remove(pos);
            }
            return;
        }
        for attr in self.attrs.iter_mut() {
            if attr.name == "class" {
                attr.value = joined;
                return;
            }
        }
        self.attrs.push(Attribute {
            name: "class".to_string(),
            value: joined,
        });
    }
}

/// Attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_caches_id_and_class() {
        let mut elem = ElementData::new("div");
        elem.set_attr("id", "main");
        elem.set_attr("class", "a b");

        assert_eq!(elem.id.as_deref(), Some("main"));
        assert_eq!(elem.classes, vec!["a", "b"]);
        assert_eq!(elem.get_attr("id"), Some("main"));
    }

    #[test]
    fn test_set_attr_overwrites() {
        let mut elem = ElementData::new("div");
        elem.set_attr("title", "one");
        elem.set_attr("title", "two");

        assert_eq!(elem.get_attr("title"), Some("two"));
        assert_eq!(elem.attrs().len(), 1);
    }

    #[test]
    fn test_toggle_class_pair_restores() {
        let mut elem = ElementData::new("p");
        elem.set_attr("class", "note");

        assert!(elem.toggle_class("active"));
        assert!(elem.has_class("active"));
        assert!(!elem.toggle_class("active"));
        assert!(!elem.has_class("active"));
        assert_eq!(elem.get_attr("class"), Some("note"));
    }

    #[test]
    fn test_toggle_class_writes_attr() {
        let mut elem = ElementData::new("p");
        elem.toggle_class("lit");

        assert_eq!(elem.get_attr("class"), Some("lit"));
        elem.toggle_class("lit");
        assert_eq!(elem.get_attr("class"), None);
    }

    #[test]
    fn test_remove_attr_clears_cache() {
        let mut elem = ElementData::new("div");
        elem.set_attr("id", "x");
        assert_eq!(elem.remove_attr("id").as_deref(), Some("x"));
        assert!(elem.id.is_none());
    }
}
