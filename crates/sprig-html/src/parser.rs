//! HTML5 parser
//!
//! Uses html5ever's built-in RcDom and converts into the sprig arena.
//! This is simpler and more reliable than implementing TreeSink directly.
//! Whitespace-only text nodes are dropped during conversion.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use sprig_dom::{Document, DomTree, ElementData, NodeId};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    parse_with_url(html, "about:blank")
}

/// Parse HTML with a base URL
pub fn parse_with_url(html: &str, url: &str) -> Document {
    tracing::debug!(url, "parsing HTML document");

    let dom = read_rcdom(html);
    let mut doc = Document::new(url);
    let root = doc.tree().root();
    convert_children(&dom.document, doc.tree_mut(), root);

    tracing::debug!(nodes = doc.tree().len(), "parsed document");
    doc
}

/// Parse markup as fragment content and materialize it in `tree`,
/// returning the new top-level node IDs in order (detached, ready to be
/// inserted).
///
/// html5ever wraps any input in a synthesized html/head/body scaffold;
/// the fragment is whatever ended up inside those sections.
pub fn parse_fragment_into(tree: &mut DomTree, markup: &str) -> Vec<NodeId> {
    let dom = read_rcdom(markup);
    let mut scratch = DomTree::new();
    let root = scratch.root();
    convert_children(&dom.document, &mut scratch, root);

    let mut out = Vec::new();
    let html = scratch
        .children(root)
        .find(|&id| scratch.is_element(id));
    let Some(html) = html else { return out };

    for section in scratch.children(html).collect::<Vec<_>>() {
        for child in scratch.children(section).collect::<Vec<_>>() {
            out.push(deep_copy(&scratch, child, tree));
        }
    }
    out
}

fn read_rcdom(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .expect("reading from an in-memory string cannot fail")
}

fn convert_children(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    for child in handle.children.borrow().iter() {
        convert_node(child, tree, parent);
    }
}

fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    match &handle.data {
        RcNodeData::Document => convert_children(handle, tree, parent),
        RcNodeData::Doctype { .. } => {}
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                let id = tree.create_text(&text);
                tree.append_child(parent, id);
            }
        }
        RcNodeData::Comment { contents } => {
            let id = tree.create_comment(&contents.to_string());
            tree.append_child(parent, id);
        }
        RcNodeData::Element { name, attrs, .. } => {
            let mut elem = ElementData::new(name.local.as_ref());
            for attr in attrs.borrow().iter() {
                elem.set_attr(attr.name.local.as_ref(), &attr.value);
            }
            let id = tree.create_element_from(elem);
            tree.append_child(parent, id);
            convert_children(handle, tree, id);
        }
        RcNodeData::ProcessingInstruction { .. } => {}
    }
}

/// Copy a subtree from one arena into another, returning the new root
fn deep_copy(src: &DomTree, id: NodeId, dst: &mut DomTree) -> NodeId {
    use sprig_dom::NodeData;

    let Some(data) = src.get(id).map(|n| n.data.clone()) else {
        return NodeId::NONE;
    };
    let copied = match data {
        NodeData::Element(elem) => dst.create_element_from(elem),
        NodeData::Text(text) => dst.create_text(&text),
        NodeData::Comment(text) => dst.create_comment(&text),
        NodeData::Document => return NodeId::NONE,
    };
    for child in src.children(id).collect::<Vec<_>>() {
        let copy = deep_copy(src, child, dst);
        if copy.is_valid() {
            dst.append_child(copied, copy);
        }
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_dom::SelectorList;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = parse(html);

        assert!(doc.tree().len() > 1, "expected nodes, got {}", doc.tree().len());
        let list = SelectorList::parse("p").unwrap();
        assert_eq!(doc.query(&list).len(), 1);
    }

    #[test]
    fn test_parse_wraps_fragment_markup() {
        let doc = parse("<div><span>Text</span></div>");

        // even fragments get wrapped in html/head/body by html5ever
        let list = SelectorList::parse("span").unwrap();
        let found = doc.query(&list);
        assert_eq!(found.len(), 1);
        assert_eq!(doc.tree().text_content(found[0]), "Text");
    }

    #[test]
    fn test_parse_attributes_cached() {
        let doc = parse(r#"<p id="x" class="a b">hi</p>"#);
        let list = SelectorList::parse("#x.a.b").unwrap();

        assert_eq!(doc.query(&list).len(), 1);
    }

    #[test]
    fn test_parse_drops_blank_text() {
        let doc = parse("<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>");
        let list = SelectorList::parse("li").unwrap();
        let items = doc.query(&list);

        assert_eq!(items.len(), 2);
        for li in items {
            let children: Vec<_> = doc.tree().children(li).collect();
            assert_eq!(children.len(), 1);
        }
    }

    #[test]
    fn test_fragment_into_tree() {
        let mut doc = parse("<body><div id=\"host\"></div></body>");
        let nodes = parse_fragment_into(doc.tree_mut(), "<b>bold</b> plain");

        assert_eq!(nodes.len(), 2);
        let first = doc.tree().element(nodes[0]).map(|e| e.name.clone());
        assert_eq!(first.as_deref(), Some("b"));
        assert_eq!(doc.tree().get(nodes[1]).and_then(|n| n.as_text()), Some(" plain"));
    }

    #[test]
    fn test_fragment_nodes_are_detached() {
        let mut doc = parse("<body></body>");
        let nodes = parse_fragment_into(doc.tree_mut(), "<i>x</i>");

        assert_eq!(nodes.len(), 1);
        assert_eq!(doc.tree().parent(nodes[0]), sprig_dom::NodeId::NONE);
    }
}
