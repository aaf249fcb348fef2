//! Arena-based element storage
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! Every element ever created lives in one `Vec<ElementNode>` and is
//! addressed by a `NodeId`. Ownership is expressed by the parent's child
//! list alone; the `parent` field only answers "where am I among my
//! siblings". Detaching an element never frees its slot, so a removed
//! element can be inserted again elsewhere.
//!
//! ```text
//! Arena: Vec<ElementNode>
//!        [html][head][body][div]...
//!          ↑ children: [Element(1), Element(2)]
//! ```

use smallvec::SmallVec;

use crate::error::{DomError, Result};
use crate::node_set::NodeSet;
use crate::types::{Child, ElementNode, Node, NodeId, Position};
use crate::utils;

/// Arena allocator for element nodes
#[derive(Debug, Clone)]
pub struct DomArena {
    nodes: Vec<ElementNode>,
}

impl DomArena {
    /// Create an arena with default capacity
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create an arena sized for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Create an unparented element with no attributes or children
    pub fn create(&mut self, tag: impl Into<String>) -> NodeId {
        self.add_node(ElementNode::new(tag))
    }

    /// Create an element and append each of `extra` to it.
    ///
    /// Attributes land in the attribute map, texts and elements in the
    /// child list. Fails if any extra element already has a parent.
    pub fn element<I, N>(&mut self, tag: impl Into<String>, extra: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        let id = self.create(tag);
        for thing in extra {
            self.insert_node(id, Position::End, thing.into())?;
        }
        Ok(id)
    }

    fn add_node(&mut self, node: ElementNode) -> NodeId {
        let node_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        node_id
    }

    /// Get element by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&ElementNode> {
        self.nodes
            .get(node_id.index())
            .ok_or(DomError::NodeNotFound(node_id.raw()))
    }

    pub(crate) fn get_mut(&mut self, node_id: NodeId) -> Result<&mut ElementNode> {
        self.nodes
            .get_mut(node_id.index())
            .ok_or(DomError::NodeNotFound(node_id.raw()))
    }

    /// Tag name of an element
    pub fn tag(&self, node_id: NodeId) -> Result<&str> {
        Ok(self.get(node_id)?.tag())
    }

    /// Current parent, `None` for roots and detached elements
    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent)
    }

    /// Child sequence in document order
    pub fn children(&self, node_id: NodeId) -> Result<&[Child]> {
        Ok(self.get(node_id)?.children())
    }

    /// Total number of elements ever created
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True before the first element is created
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every element id, attached or not, in creation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Walk the element subtree rooted at `start` in document order
    /// (pre-order, left to right). Text children are skipped.
    pub fn traverse_df<F>(&self, start: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(NodeId, &ElementNode) -> Result<()>,
    {
        let mut stack = vec![start];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node_id, node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for child_id in node.children.iter().rev().filter_map(Child::as_element) {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// True if `node` is `ancestor` or lies somewhere below it
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> Result<bool> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent;
        }
        Ok(false)
    }

    /// Deep copy of an element: fresh identity, no parent, every
    /// descendant element copied. Texts and attributes are immutable and
    /// therefore shared.
    pub fn duplicate(&mut self, node_id: NodeId) -> Result<NodeId> {
        let (copy, pending) = self.copy_shell(node_id, None)?;

        // (source child, parent copy) pairs; children pushed in reverse so
        // each copy receives them left-to-right
        let mut stack: Vec<(Child, NodeId)> =
            pending.into_iter().rev().map(|child| (child, copy)).collect();

        while let Some((child, parent)) = stack.pop() {
            let dup = match child {
                Child::Text(t) => Child::Text(t),
                Child::Element(source_id) => {
                    let (dup_id, grandchildren) = self.copy_shell(source_id, Some(parent))?;
                    stack.extend(grandchildren.into_iter().rev().map(|c| (c, dup_id)));
                    Child::Element(dup_id)
                }
            };
            self.get_mut(parent)?.children.push(dup);
        }

        tracing::debug!("Duplicated {} as {}", node_id, copy);
        Ok(copy)
    }

    /// Childless copy of `source` under `parent`, plus the source's children
    fn copy_shell(
        &mut self,
        source: NodeId,
        parent: Option<NodeId>,
    ) -> Result<(NodeId, Vec<Child>)> {
        let node = self.get(source)?;
        let shell = ElementNode {
            tag: node.tag.clone(),
            attrs: node.attrs.clone(),
            children: SmallVec::new(),
            parent,
        };
        let children = node.children.to_vec();
        Ok((self.add_node(shell), children))
    }

    /// First element in document order below (or at) `root` whose `id`
    /// attribute contains `id` as a token
    pub fn find_by_id(&self, root: NodeId, id: &str) -> Result<Option<NodeId>> {
        let mut found = None;
        self.traverse_df(root, |node_id, node| {
            if found.is_none() && utils::attr_has_token(node, "id", id) {
                found = Some(node_id);
            }
            Ok(())
        })?;
        Ok(found)
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Independent copy of this thing. Elements are deep-copied, sets copy
    /// each member, and immutable values return themselves.
    pub fn duplicate(&self, dom: &mut DomArena) -> Result<Node> {
        Ok(match self {
            Node::Text(t) => Node::Text(t.clone()),
            Node::Attr(a) => Node::Attr(a.clone()),
            Node::Element(id) => Node::Element(dom.duplicate(*id)?),
            Node::Set(set) => {
                let mut copies = NodeSet::new();
                for id in set.iter() {
                    copies.push(dom.duplicate(id)?);
                }
                Node::Set(copies)
            }
        })
    }
}
