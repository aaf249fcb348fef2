//! Structural mutation
//!
//! `TreeOps` is the one mutation contract, implemented by a single element
//! (`NodeId`) and by a `NodeSet`. A set broadcasts: its first member gets
//! the argument as given, every later member gets an independent
//! `duplicate()` of it. The same element can never end up under two
//! parents that way.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::node_set::NodeSet;
use crate::selector::Selector;
use crate::types::{Child, Node, NodeId, Position};

/// What to do when a selector-driven operation matches nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Zero matches is a silent no-op
    #[default]
    Optional,
    /// Zero matches is a `NoMatch` error
    Required,
}

/// Operation applied to every element a selector matched
#[derive(Debug, Clone)]
pub enum SelectorOp {
    Append(Node),
    Prepend(Node),
    Before(Node),
    After(Node),
    Remove,
}

impl DomArena {
    /// Insert `thing` into `parent` at `at`.
    ///
    /// Attributes go to the attribute map, sets are unrolled in order, texts
    /// and elements are spliced into the child list. Every check happens
    /// before the tree is touched.
    pub(crate) fn insert_node(&mut self, parent: NodeId, at: Position, thing: Node) -> Result<()> {
        match thing {
            Node::Attr(attr) => {
                self.get_mut(parent)?.set_attr(attr);
                Ok(())
            }
            Node::Set(set) => {
                let mut at = at;
                for id in set.iter() {
                    self.insert_node(parent, at, Node::Element(id))?;
                    if let Position::Index(i) = at {
                        at = Position::Index(i + 1);
                    }
                }
                Ok(())
            }
            Node::Text(text) => self.splice(parent, at, Child::Text(text)),
            Node::Element(child) => {
                let child_node = self.get(child)?;
                if child_node.parent.is_some() {
                    return Err(DomError::Reparent {
                        tag: child_node.tag.clone(),
                    });
                }
                if self.is_ancestor_or_self(child, parent)? {
                    return Err(DomError::CyclicInsert {
                        tag: child_node.tag.clone(),
                    });
                }

                self.splice(parent, at, Child::Element(child))?;
                self.get_mut(child)?.parent = Some(parent);
                tracing::debug!("Inserted {} into {} at {:?}", child, parent, at);
                Ok(())
            }
        }
    }

    fn splice(&mut self, parent: NodeId, at: Position, child: Child) -> Result<()> {
        let node = self.get_mut(parent)?;
        let len = node.children.len();
        match at {
            Position::End => node.children.push(child),
            Position::Index(index) if index <= len => node.children.insert(index, child),
            Position::Index(index) => return Err(DomError::OutOfRange { index, len }),
        }
        Ok(())
    }

    /// Remove `thing` from `parent`. Absent things are ignored.
    pub(crate) fn remove_node(&mut self, parent: NodeId, thing: &Node) -> Result<()> {
        match thing {
            Node::Attr(attr) => {
                self.get_mut(parent)?.remove_attr(attr.name());
            }
            Node::Set(set) => {
                for id in set.iter() {
                    self.remove_element_child(parent, id)?;
                }
            }
            Node::Element(id) => self.remove_element_child(parent, *id)?,
            Node::Text(text) => {
                let node = self.get_mut(parent)?;
                if let Some(pos) = node.children.iter().position(|c| c.as_text() == Some(text)) {
                    node.children.remove(pos);
                }
            }
        }
        Ok(())
    }

    fn remove_element_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let node = self.get_mut(parent)?;
        if let Some(pos) = node.position_of(child) {
            node.children.remove(pos);
            self.get_mut(child)?.parent = None;
            tracing::debug!("Removed {} from {}", child, parent);
        }
        Ok(())
    }

    /// Parent of `node` and the index of `node` among its children
    fn sibling_position(&self, node: NodeId) -> Result<(NodeId, usize)> {
        let current = self.get(node)?;
        let parent = current.parent.ok_or_else(|| DomError::NoParent {
            tag: current.tag.clone(),
        })?;

        let index = self.get(parent)?.position_of(node).ok_or_else(|| {
            DomError::Corrupted(format!("{parent} does not contain its child {node}"))
        })?;
        Ok((parent, index))
    }

    fn insert_before(&mut self, node: NodeId, thing: Node) -> Result<()> {
        let (parent, index) = self.sibling_position(node)?;
        self.insert_node(parent, Position::Index(index), thing)
    }

    fn insert_after(&mut self, node: NodeId, thing: Node) -> Result<()> {
        let (parent, index) = self.sibling_position(node)?;
        let at = if index + 1 == self.get(parent)?.children.len() {
            Position::End
        } else {
            Position::Index(index + 1)
        };
        self.insert_node(parent, at, thing)
    }

    fn detach_node(&mut self, node: NodeId) -> Result<()> {
        match self.get(node)?.parent {
            Some(parent) => self.remove_element_child(parent, node),
            None => Ok(()),
        }
    }
}

/// Mutation contract shared by single elements and node sets
pub trait TreeOps {
    /// Insert at a child position. See `Position`.
    fn insert_at(&self, dom: &mut DomArena, at: Position, thing: impl Into<Node>) -> Result<()>;

    /// Insert as a sibling immediately before this element
    fn before(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()>;

    /// Insert as a sibling immediately after this element
    fn after(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()>;

    /// Remove a child, an attribute (by name), or every member of a set
    fn remove_child(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()>;

    /// Detach from the parent. No-op when already unparented.
    fn detach(&self, dom: &mut DomArena) -> Result<()>;

    fn select(&self, dom: &DomArena, selector: &str) -> Result<NodeSet>;

    /// How this target is named in `NoMatch` errors
    fn scope(&self, dom: &DomArena) -> String;

    fn append(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        self.insert_at(dom, Position::End, thing)
    }

    fn prepend(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        self.insert_at(dom, Position::START, thing)
    }

    /// Select, then apply `op` to the whole result. Returns the matched set.
    fn apply_matching(
        &self,
        dom: &mut DomArena,
        selector: &str,
        policy: MatchPolicy,
        op: SelectorOp,
    ) -> Result<NodeSet> {
        let targets = self.select(dom, selector)?;
        if targets.is_empty() && policy == MatchPolicy::Required {
            return Err(DomError::NoMatch {
                selector: selector.to_string(),
                scope: self.scope(dom),
            });
        }

        match op {
            SelectorOp::Append(thing) => targets.append(dom, thing)?,
            SelectorOp::Prepend(thing) => targets.prepend(dom, thing)?,
            SelectorOp::Before(thing) => targets.before(dom, thing)?,
            SelectorOp::After(thing) => targets.after(dom, thing)?,
            SelectorOp::Remove => targets.detach(dom)?,
        }
        Ok(targets)
    }

    fn append_matching(
        &self,
        dom: &mut DomArena,
        selector: &str,
        thing: impl Into<Node>,
    ) -> Result<NodeSet> {
        let op = SelectorOp::Append(thing.into());
        self.apply_matching(dom, selector, MatchPolicy::Optional, op)
    }

    fn prepend_matching(
        &self,
        dom: &mut DomArena,
        selector: &str,
        thing: impl Into<Node>,
    ) -> Result<NodeSet> {
        let op = SelectorOp::Prepend(thing.into());
        self.apply_matching(dom, selector, MatchPolicy::Optional, op)
    }

    fn before_matching(
        &self,
        dom: &mut DomArena,
        selector: &str,
        thing: impl Into<Node>,
    ) -> Result<NodeSet> {
        let op = SelectorOp::Before(thing.into());
        self.apply_matching(dom, selector, MatchPolicy::Optional, op)
    }

    fn after_matching(
        &self,
        dom: &mut DomArena,
        selector: &str,
        thing: impl Into<Node>,
    ) -> Result<NodeSet> {
        let op = SelectorOp::After(thing.into());
        self.apply_matching(dom, selector, MatchPolicy::Optional, op)
    }

    fn remove_matching(&self, dom: &mut DomArena, selector: &str) -> Result<NodeSet> {
        self.apply_matching(dom, selector, MatchPolicy::Optional, SelectorOp::Remove)
    }
}

impl TreeOps for NodeId {
    fn insert_at(&self, dom: &mut DomArena, at: Position, thing: impl Into<Node>) -> Result<()> {
        dom.insert_node(*self, at, thing.into())
    }

    fn before(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        dom.insert_before(*self, thing.into())
    }

    fn after(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        dom.insert_after(*self, thing.into())
    }

    fn remove_child(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        dom.remove_node(*self, &thing.into())
    }

    fn detach(&self, dom: &mut DomArena) -> Result<()> {
        dom.detach_node(*self)
    }

    fn select(&self, dom: &DomArena, selector: &str) -> Result<NodeSet> {
        dom.select(*self, selector)
    }

    fn scope(&self, dom: &DomArena) -> String {
        match dom.tag(*self) {
            Ok(tag) => format!("<{tag}>"),
            Err(_) => self.to_string(),
        }
    }
}

impl NodeSet {
    /// Run `op` on every member: the first gets `thing`, the rest get
    /// fresh duplicates of it
    fn broadcast<F>(&self, dom: &mut DomArena, thing: Node, mut op: F) -> Result<()>
    where
        F: FnMut(&mut DomArena, NodeId, Node) -> Result<()>,
    {
        for (i, id) in self.iter().enumerate() {
            let arg = if i == 0 {
                thing.clone()
            } else {
                thing.duplicate(dom)?
            };
            op(dom, id, arg)?;
        }
        Ok(())
    }
}

impl TreeOps for NodeSet {
    fn insert_at(&self, dom: &mut DomArena, at: Position, thing: impl Into<Node>) -> Result<()> {
        self.broadcast(dom, thing.into(), |dom, id, arg| dom.insert_node(id, at, arg))
    }

    fn before(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        self.broadcast(dom, thing.into(), |dom, id, arg| dom.insert_before(id, arg))
    }

    fn after(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        self.broadcast(dom, thing.into(), |dom, id, arg| dom.insert_after(id, arg))
    }

    /// Later members receive duplicates, which never match an element child
    /// by identity; attributes and texts compare by value and are removed
    /// from every member.
    fn remove_child(&self, dom: &mut DomArena, thing: impl Into<Node>) -> Result<()> {
        self.broadcast(dom, thing.into(), |dom, id, arg| dom.remove_node(id, &arg))
    }

    fn detach(&self, dom: &mut DomArena) -> Result<()> {
        for id in self.iter() {
            dom.detach_node(id)?;
        }
        Ok(())
    }

    fn select(&self, dom: &DomArena, selector: &str) -> Result<NodeSet> {
        let parsed = Selector::parse(selector)?;
        let mut found = NodeSet::new();
        for id in self.iter() {
            found.union(&parsed.select(dom, id)?);
        }
        Ok(found)
    }

    fn scope(&self, _dom: &DomArena) -> String {
        format!("{} selected nodes", self.len())
    }
}
