//! HTML serialization
//!
//! Writes a subtree back out as markup. Void elements get no closing tag.

use sprig_dom::{DomTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Serialize a node and its subtree (outer HTML)
pub fn serialize_node(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

/// Serialize only a node's children (inner HTML)
pub fn serialize_children(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    for child in tree.children(id) {
        write_node(tree, child, &mut out);
    }
    out
}

fn write_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.data {
        NodeData::Document => {
            for child in tree.children(id) {
                write_node(tree, child, out);
            }
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.name);
            for attr in elem.attrs() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attr(&attr.value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.name.as_str()) {
                return;
            }
            for child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&elem.name);
            out.push('>');
        }
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}
