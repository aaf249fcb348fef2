//! Core type definitions
//!
//! Key design principles:
//! 1. Elements live in the arena and are addressed by `NodeId` (4 bytes)
//! 2. Text and attributes are immutable values, shared freely
//! 3. SmallVec for children and attributes (most elements have few)
//! 4. One closed enum for everything that can be inserted or visited

use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::node_set::NodeSet;

/// Element identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable text payload.
///
/// Cloning shares the allocation; a text never has a parent, so the same
/// value may sit under any number of elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Text(Arc<str>);

impl Text {
    pub fn new(value: impl fmt::Display) -> Self {
        Self(Arc::from(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable (name, value) pair. `value` is `None` for boolean-style
/// attributes such as `disabled`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: String,
    value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Lookup key within the owning element
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Make a text node from the display form of any value
pub fn text(value: impl fmt::Display) -> Text {
    Text::new(value)
}

/// Make an attribute from a name and the display form of any value
pub fn attr(name: impl Into<String>, value: impl fmt::Display) -> Attribute {
    Attribute::new(name, Some(value.to_string()))
}

/// Make a valueless attribute (`<input disabled />`)
pub fn flag(name: impl Into<String>) -> Attribute {
    Attribute::new(name, None)
}

/// Anything that can be inserted into, removed from, or visited in a tree.
///
/// The set of kinds is closed: text, attribute, element, node set.
#[derive(Debug, Clone)]
pub enum Node {
    Text(Text),
    Attr(Attribute),
    Element(NodeId),
    Set(NodeSet),
}

impl From<Text> for Node {
    fn from(value: Text) -> Self {
        Node::Text(value)
    }
}

impl From<Attribute> for Node {
    fn from(value: Attribute) -> Self {
        Node::Attr(value)
    }
}

impl From<NodeId> for Node {
    fn from(value: NodeId) -> Self {
        Node::Element(value)
    }
}

impl From<NodeSet> for Node {
    fn from(value: NodeSet) -> Self {
        Node::Set(value)
    }
}

impl From<&NodeSet> for Node {
    fn from(value: &NodeSet) -> Self {
        Node::Set(value.clone())
    }
}

/// An entry in an element's child sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Text(Text),
    Element(NodeId),
}

impl Child {
    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            Child::Element(id) => Some(*id),
            Child::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Child::Text(t) => Some(t),
            Child::Element(_) => None,
        }
    }
}

/// Where to splice a child into a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Index(usize),
    End,
}

impl Position {
    pub const START: Position = Position::Index(0);
}

/// The element node stored in the arena
///
/// Design philosophy:
/// - The parent's child list is the only ownership edge
/// - `parent` is a back-reference for sibling positioning only
/// - Attributes keep first-insertion order, so rendering is stable
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub(crate) tag: String,
    pub(crate) attrs: SmallVec<[(String, Attribute); 4]>,
    pub(crate) children: SmallVec<[Child; 4]>,
    pub(crate) parent: Option<NodeId>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: SmallVec::new(),
            children: SmallVec::new(),
            parent: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter().map(|(_, a)| a)
    }

    /// Case-insensitive attribute lookup
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        let key = name.to_lowercase();
        self.attrs.iter().find(|(k, _)| *k == key).map(|(_, a)| a)
    }

    /// Install an attribute, overwriting one with the same key in place
    pub(crate) fn set_attr(&mut self, attr: Attribute) {
        let key = attr.key();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = attr,
            None => self.attrs.push((key, attr)),
        }
    }

    pub(crate) fn remove_attr(&mut self, name: &str) -> Option<Attribute> {
        let key = name.to_lowercase();
        let pos = self.attrs.iter().position(|(k, _)| *k == key)?;
        Some(self.attrs.remove(pos).1)
    }

    /// Position of an element child, by identity
    pub(crate) fn position_of(&self, child: NodeId) -> Option<usize> {
        self.children
            .iter()
            .rposition(|c| c.as_element() == Some(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_keys_are_case_insensitive() {
        let mut node = ElementNode::new("input");
        node.set_attr(attr("Type", "text"));
        node.set_attr(attr("TYPE", "password"));

        assert_eq!(node.attributes().count(), 1);
        let found = node.attr("type").unwrap();
        assert_eq!(found.name(), "TYPE");
        assert_eq!(found.value(), Some("password"));
    }

    #[test]
    fn test_overwrite_keeps_first_insertion_order() {
        let mut node = ElementNode::new("link");
        node.set_attr(attr("type", "stylesheet"));
        node.set_attr(attr("href", "a.css"));
        node.set_attr(attr("type", "text/css"));

        let names: Vec<_> = node.attributes().map(|a| a.name()).collect();
        assert_eq!(names, vec!["type", "href"]);
    }

    #[test]
    fn test_flag_has_no_value() {
        let disabled = flag("disabled");
        assert_eq!(disabled.value(), None);
        assert_eq!(attr("tabindex", 3).value(), Some("3"));
    }

    #[test]
    fn test_text_from_any_display() {
        assert_eq!(text(42).as_str(), "42");
        assert_eq!(text(1.5).as_str(), "1.5");
        assert_eq!(text("hi").to_string(), "hi");
    }
}
