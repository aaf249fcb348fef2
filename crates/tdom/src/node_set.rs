//! Ordered, identity-deduplicated collection of elements
//!
//! A `NodeSet` is what selection returns, and it is also a mutation target:
//! see `TreeOps` in `mutation.rs` for the broadcast rules.

use ahash::AHashSet;

use crate::error::{DomError, Result};
use crate::types::NodeId;

#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    /// Members in insertion (document) order
    entries: Vec<NodeId>,

    /// Membership index for O(1) dedup
    seen: AHashSet<NodeId>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: NodeId) -> Self {
        let mut set = Self::new();
        set.push(id);
        set
    }

    /// Add a member. Returns false (and changes nothing) if already present.
    pub fn push(&mut self, id: NodeId) -> bool {
        if self.seen.insert(id) {
            self.entries.push(id);
            true
        } else {
            false
        }
    }

    /// Append every member of `other` not already present, keeping order
    pub fn union(&mut self, other: &NodeSet) {
        for &id in &other.entries {
            self.push(id);
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.seen.contains(&id)
    }

    pub fn nth(&self, index: usize) -> Result<NodeId> {
        self.entries
            .get(index)
            .copied()
            .ok_or(DomError::OutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    pub fn first(&self) -> Result<NodeId> {
        self.entries.first().copied().ok_or(DomError::Empty)
    }

    pub fn last(&self) -> Result<NodeId> {
        self.entries.last().copied().ok_or(DomError::Empty)
    }

    pub fn entries(&self) -> &[NodeId] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for NodeSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for NodeSet {}

impl FromIterator<NodeId> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut set = NodeSet::new();
        for id in iter {
            set.push(id);
        }
        set
    }
}

impl Extend<NodeId> for NodeSet {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        for id in iter {
            self.push(id);
        }
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_deduplicates() {
        let mut set = NodeSet::new();
        assert!(set.push(NodeId(3)));
        assert!(set.push(NodeId(1)));
        assert!(!set.push(NodeId(3)));

        assert_eq!(set.entries(), &[NodeId(3), NodeId(1)]);
    }

    #[test]
    fn test_union_keeps_first_position() {
        let mut a: NodeSet = [NodeId(1), NodeId(2)].into_iter().collect();
        let b: NodeSet = [NodeId(2), NodeId(5), NodeId(1), NodeId(4)]
            .into_iter()
            .collect();
        a.union(&b);

        assert_eq!(a.entries(), &[NodeId(1), NodeId(2), NodeId(5), NodeId(4)]);
    }

    #[test]
    fn test_accessors_on_empty_set() {
        let set = NodeSet::new();
        assert!(matches!(set.first(), Err(DomError::Empty)));
        assert!(matches!(set.last(), Err(DomError::Empty)));
        assert!(matches!(
            set.nth(0),
            Err(DomError::OutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_nth_and_last() {
        let set: NodeSet = [NodeId(7), NodeId(8)].into_iter().collect();
        assert_eq!(set.nth(1).unwrap(), NodeId(8));
        assert_eq!(set.first().unwrap(), NodeId(7));
        assert_eq!(set.last().unwrap(), NodeId(8));
        assert!(set.contains(NodeId(7)));
        assert!(!set.contains(NodeId(9)));
        assert!(matches!(
            set.nth(2),
            Err(DomError::OutOfRange { index: 2, len: 2 })
        ));
    }
}
