//! CSS selector engine
//!
//! Parses and matches selector lists of compound simple selectors: `*`,
//! type, `#id`, `.class`, attribute selectors with the full operator set,
//! and the tree-structural pseudo-classes the query entry needs.
//! Combinators are not part of the grammar.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::node::Node;
use crate::tree::DomTree;
use crate::NodeId;

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character `{0}` at byte {1}")]
    UnexpectedChar(char, usize),

    #[error("combinators are not supported")]
    UnsupportedCombinator,

    #[error("unsupported pseudo-class `:{0}`")]
    UnsupportedPseudoClass(String),

    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
}

/// A comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    compounds: Vec<Compound>,
}

/// One compound selector: every component must match the same element
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    components: Vec<SelectorComponent>,
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :root, :first-child, etc.
    PseudoClass(PseudoClass),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Includes(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else { return false };
        match &self.matcher {
            None => true,
            Some(AttributeMatcher::Exact(want)) => value == want,
            Some(AttributeMatcher::Includes(want)) => {
                value.split_whitespace().any(|word| word == want)
            }
            Some(AttributeMatcher::DashMatch(want)) => {
                value == want
                    || value
                        .strip_prefix(want.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Some(AttributeMatcher::Prefix(want)) => {
                !want.is_empty() && value.starts_with(want.as_str())
            }
            Some(AttributeMatcher::Suffix(want)) => {
                !want.is_empty() && value.ends_with(want.as_str())
            }
            Some(AttributeMatcher::Substring(want)) => {
                !want.is_empty() && value.contains(want.as_str())
            }
        }
    }
}

/// Supported pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
}

impl PseudoClass {
    /// Parse from the identifier after `:`
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "root" => Some(Self::Root),
            "empty" => Some(Self::Empty),
            "first-child" => Some(Self::FirstChild),
            "last-child" => Some(Self::LastChild),
            "only-child" => Some(Self::OnlyChild),
            _ => None,
        }
    }
}

type Scanner<'a> = Peekable<CharIndices<'a>>;

impl SelectorList {
    /// Parse a selector list such as `p.note, [data-kind^=x], :root`
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut compounds = Vec::new();
        let mut components: Vec<SelectorComponent> = Vec::new();
        let mut scanner: Scanner<'_> = trimmed.char_indices().peekable();

        while let Some(&(pos, ch)) = scanner.peek() {
            match ch {
                ',' => {
                    scanner.next();
                    skip_whitespace(&mut scanner);
                    if components.is_empty() {
                        return Err(SelectorError::UnexpectedChar(',', pos));
                    }
                    compounds.push(Compound {
                        components: std::mem::take(&mut components),
                    });
                }
                c if c.is_whitespace() => {
                    skip_whitespace(&mut scanner);
                    // whitespace is only allowed before a comma or the end;
                    // anything else would be a descendant combinator
                    match scanner.peek() {
                        None | Some(&(_, ',')) => {}
                        Some(_) => return Err(SelectorError::UnsupportedCombinator),
                    }
                }
                '*' => {
                    scanner.next();
                    components.push(SelectorComponent::Universal);
                }
                '#' => {
                    scanner.next();
                    let name = read_ident(&mut scanner);
                    if name.is_empty() {
                        return Err(SelectorError::UnexpectedChar('#', pos));
                    }
                    components.push(SelectorComponent::Id(name));
                }
                '.' => {
                    scanner.next();
                    let name = read_ident(&mut scanner);
                    if name.is_empty() {
                        return Err(SelectorError::UnexpectedChar('.', pos));
                    }
                    components.push(SelectorComponent::Class(name));
                }
                ':' => {
                    scanner.next();
                    let name = read_ident(&mut scanner);
                    let pseudo = PseudoClass::parse(&name)
                        .ok_or(SelectorError::UnsupportedPseudoClass(name))?;
                    components.push(SelectorComponent::PseudoClass(pseudo));
                }
                '[' => {
                    scanner.next();
                    components.push(SelectorComponent::Attribute(parse_attribute(
                        &mut scanner,
                    )?));
                }
                c if is_ident_char(c) => {
                    let name = read_ident(&mut scanner);
                    components.push(SelectorComponent::Type(name.to_ascii_lowercase()));
                }
                other => return Err(SelectorError::UnexpectedChar(other, pos)),
            }
        }

        if components.is_empty() {
            return Err(SelectorError::Empty);
        }
        compounds.push(Compound { components });
        Ok(Self { compounds })
    }

    /// Check whether any compound in the list matches the element
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.compounds
            .iter()
            .any(|compound| match_compound(tree, id, compound))
    }
}

/// All elements below the document root matching the list, in document order
pub fn query_all(tree: &DomTree, list: &SelectorList) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&id| list.matches(tree, id))
        .collect()
}

fn match_compound(tree: &DomTree, id: NodeId, compound: &Compound) -> bool {
    if tree.element(id).is_none() {
        return false;
    }
    compound
        .components
        .iter()
        .all(|component| match_component(tree, id, component))
}

fn match_component(tree: &DomTree, id: NodeId, component: &SelectorComponent) -> bool {
    let Some(elem) = tree.element(id) else {
        return false;
    };
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => elem.name.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(want) => elem.id.as_deref() == Some(want.as_str()),
        SelectorComponent::Class(want) => elem.has_class(want),
        SelectorComponent::Attribute(sel) => sel.matches(elem.get_attr(&sel.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(tree, id, *pseudo),
    }
}

fn match_pseudo_class(tree: &DomTree, id: NodeId, pseudo: PseudoClass) -> bool {
    match pseudo {
        PseudoClass::Root => tree.get(tree.parent(id)).is_some_and(Node::is_document),
        PseudoClass::Empty => !tree.children(id).any(|child| {
            tree.get(child).is_some_and(|node| {
                node.is_element() || node.as_text().is_some_and(|t| !t.is_empty())
            })
        }),
        PseudoClass::FirstChild => element_sibling(tree, id, Direction::Prev).is_none(),
        PseudoClass::LastChild => element_sibling(tree, id, Direction::Next).is_none(),
        PseudoClass::OnlyChild => {
            element_sibling(tree, id, Direction::Prev).is_none()
                && element_sibling(tree, id, Direction::Next).is_none()
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Prev,
    Next,
}

fn element_sibling(tree: &DomTree, id: NodeId, direction: Direction) -> Option<NodeId> {
    let mut current = id;
    loop {
        let node = tree.get(current)?;
        current = match direction {
            Direction::Prev => node.prev_sibling,
            Direction::Next => node.next_sibling,
        };
        if !current.is_valid() {
            return None;
        }
        if tree.is_element(current) {
            return Some(current);
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn skip_whitespace(scanner: &mut Scanner<'_>) {
    while scanner.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
        scanner.next();
    }
}

fn read_ident(scanner: &mut Scanner<'_>) -> String {
    let mut out = String::new();
    while let Some(&(_, c)) = scanner.peek() {
        if !is_ident_char(c) {
            break;
        }
        out.push(c);
        scanner.next();
    }
    out
}

fn parse_attribute(scanner: &mut Scanner<'_>) -> Result<AttributeSelector, SelectorError> {
    skip_whitespace(scanner);
    let name = read_ident(scanner).to_ascii_lowercase();
    if name.is_empty() {
        return Err(SelectorError::UnterminatedAttribute);
    }
    skip_whitespace(scanner);

    let op = match scanner.peek() {
        Some(&(_, ']')) => {
            scanner.next();
            return Ok(AttributeSelector {
                name,
                matcher: None,
            });
        }
        Some(&(_, c @ ('~' | '|' | '^' | '$' | '*'))) => {
            scanner.next();
            match scanner.next() {
                Some((_, '=')) => c,
                Some((pos, other)) => return Err(SelectorError::UnexpectedChar(other, pos)),
                None => return Err(SelectorError::UnterminatedAttribute),
            }
        }
        Some(&(_, '=')) => {
            scanner.next();
            '='
        }
        Some(&(pos, other)) => return Err(SelectorError::UnexpectedChar(other, pos)),
        None => return Err(SelectorError::UnterminatedAttribute),
    };

    skip_whitespace(scanner);
    let value = read_attribute_value(scanner)?;
    skip_whitespace(scanner);
    match scanner.next() {
        Some((_, ']')) => {}
        _ => return Err(SelectorError::UnterminatedAttribute),
    }

    let matcher = match op {
        '=' => AttributeMatcher::Exact(value),
        '~' => AttributeMatcher::Includes(value),
        '|' => AttributeMatcher::DashMatch(value),
        '^' => AttributeMatcher::Prefix(value),
        '$' => AttributeMatcher::Suffix(value),
        _ => AttributeMatcher::Substring(value),
    };
    Ok(AttributeSelector {
        name,
        matcher: Some(matcher),
    })
}

fn read_attribute_value(scanner: &mut Scanner<'_>) -> Result<String, SelectorError> {
    match scanner.peek() {
        Some(&(_, quote @ ('"' | '\''))) => {
            scanner.next();
            let mut out = String::new();
            for (_, c) in scanner.by_ref() {
                if c == quote {
                    return Ok(out);
                }
                out.push(c);
            }
            Err(SelectorError::UnterminatedAttribute)
        }
        _ => Ok(read_ident(scanner)),
    }
}
