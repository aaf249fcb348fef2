//! Double-dispatch visitation
//!
//! A `Visitor` gets one callback per node kind. The core never recurses on
//! the visitor's behalf: an element callback decides whether, and how, to
//! walk `ElementRef::children`. That lets a renderer truncate or transform
//! subtrees freely.

use crate::arena::DomArena;
use crate::error::Result;
use crate::node_set::NodeSet;
use crate::types::{Attribute, Child, ElementNode, Node, NodeId, Text};

pub trait Visitor {
    fn visit_text(&mut self, text: &Text) -> Result<()>;

    fn visit_attr(&mut self, attr: &Attribute) -> Result<()>;

    fn visit_element(&mut self, element: ElementRef<'_>) -> Result<()>;

    /// A set contributes nothing of its own; members are visited in order
    fn visit_set(&mut self, dom: &DomArena, set: &NodeSet) -> Result<()> {
        for id in set.iter() {
            self.visit_element(ElementRef::new(dom, id)?)?;
        }
        Ok(())
    }
}

/// Borrowed view of one element in an arena
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a DomArena,
    id: NodeId,
    node: &'a ElementNode,
}

impl<'a> ElementRef<'a> {
    pub fn new(dom: &'a DomArena, id: NodeId) -> Result<Self> {
        Ok(Self {
            dom,
            id,
            node: dom.get(id)?,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> &'a str {
        self.node.tag()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.node.attributes()
    }

    pub fn attr(&self, name: &str) -> Option<&'a Attribute> {
        self.node.attr(name)
    }

    /// True if attribute `name` exists and its value is exactly `value`
    pub fn attr_equals(&self, name: &str, value: &str) -> bool {
        self.attr(name).and_then(Attribute::value) == Some(value)
    }

    /// View of the parent, `None` for roots and detached elements
    pub fn parent(&self) -> Result<Option<ElementRef<'a>>> {
        self.node
            .parent()
            .map(|parent| ElementRef::new(self.dom, parent))
            .transpose()
    }

    pub fn has_children(&self) -> bool {
        !self.node.children().is_empty()
    }

    /// Children in document order. A child id missing from the arena
    /// yields `NodeNotFound` in its slot.
    pub fn children(&self) -> impl Iterator<Item = Result<ChildRef<'a>>> + 'a {
        let dom = self.dom;
        self.node.children().iter().map(move |child| match child {
            Child::Text(t) => Ok(ChildRef::Text(t)),
            Child::Element(id) => ElementRef::new(dom, *id).map(ChildRef::Element),
        })
    }

    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        visitor.visit_element(*self)
    }
}

/// Borrowed view of one child
#[derive(Debug, Clone, Copy)]
pub enum ChildRef<'a> {
    Text(&'a Text),
    Element(ElementRef<'a>),
}

impl ChildRef<'_> {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        match self {
            ChildRef::Text(t) => visitor.visit_text(t),
            ChildRef::Element(e) => visitor.visit_element(*e),
        }
    }
}

impl Node {
    /// Dispatch to the visitor callback for this node's kind
    pub fn accept<V: Visitor + ?Sized>(&self, dom: &DomArena, visitor: &mut V) -> Result<()> {
        match self {
            Node::Text(t) => visitor.visit_text(t),
            Node::Attr(a) => visitor.visit_attr(a),
            Node::Element(id) => visitor.visit_element(ElementRef::new(dom, *id)?),
            Node::Set(set) => visitor.visit_set(dom, set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{attr, text};

    /// Records callbacks without recursing
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Visitor for Recorder {
        fn visit_text(&mut self, text: &Text) -> Result<()> {
            self.calls.push(format!("text:{text}"));
            Ok(())
        }

        fn visit_attr(&mut self, attr: &Attribute) -> Result<()> {
            self.calls.push(format!("attr:{}", attr.name()));
            Ok(())
        }

        fn visit_element(&mut self, element: ElementRef<'_>) -> Result<()> {
            self.calls.push(format!("element:{}", element.tag()));
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_per_kind() {
        let mut dom = DomArena::new();
        let p = dom.element("p", [text("x")]).unwrap();
        let mut recorder = Recorder::default();

        Node::from(text("t")).accept(&dom, &mut recorder).unwrap();
        Node::from(attr("a", 1)).accept(&dom, &mut recorder).unwrap();
        Node::from(p).accept(&dom, &mut recorder).unwrap();

        // no automatic descent into p's children
        assert_eq!(recorder.calls, vec!["text:t", "attr:a", "element:p"]);
    }

    #[test]
    fn test_set_visits_members_in_order() {
        let mut dom = DomArena::new();
        let a = dom.create("a");
        let b = dom.create("b");
        let set: NodeSet = [b, a].into_iter().collect();
        let mut recorder = Recorder::default();

        Node::from(set).accept(&dom, &mut recorder).unwrap();
        assert_eq!(recorder.calls, vec!["element:b", "element:a"]);
    }

    #[test]
    fn test_element_ref_accessors() {
        let mut dom = DomArena::new();
        let child = dom.element("span", [attr("class", "x")]).unwrap();
        let parent = dom.element("div", [child]).unwrap();

        let view = ElementRef::new(&dom, child).unwrap();
        assert!(view.attr_equals("CLASS", "x"));
        assert!(!view.attr_equals("class", "y"));
        assert_eq!(view.parent().unwrap().map(|p| p.id()), Some(parent));
        assert!(!view.has_children());

        let top = ElementRef::new(&dom, parent).unwrap();
        assert!(top.parent().unwrap().is_none());
        assert_eq!(top.children().count(), 1);
    }

    #[test]
    fn test_dangling_child_is_reported() {
        let mut dom = DomArena::new();
        let p = dom.create("p");
        dom.get_mut(p)
            .unwrap()
            .children
            .push(Child::Element(NodeId(42)));

        let view = ElementRef::new(&dom, p).unwrap();
        let children: Vec<_> = view.children().collect();
        assert_eq!(children.len(), 1);
        assert!(matches!(children[0], Err(crate::DomError::NodeNotFound(42))));

        // rendering stops instead of dropping the child
        let err = crate::DomSerializer::new().serialize(&dom, p).unwrap_err();
        assert!(matches!(err, crate::DomError::NodeNotFound(42)));
    }
}
