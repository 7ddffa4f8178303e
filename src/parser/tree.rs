//! Section tree: the document structure used for ancestor lookups and reports.

use std::collections::HashMap;

use serde::Serialize;

use super::section::SectionId;
use crate::error::{Error, Result};

/// A node of the section tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    /// Section this node stands for
    pub id: SectionId,
    /// Unique tag of that section
    pub tag: String,
    /// Parent node (None for the root)
    pub parent: Option<SectionId>,
    /// Child nodes in insertion order
    pub children: Vec<SectionId>,
}

/// Tree of sections, indexed by [`SectionId`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SectionTree {
    nodes: Vec<TreeNode>,
    #[serde(skip)]
    by_tag: HashMap<String, SectionId>,
}

impl SectionTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Ids must be added in order and tags must be unique;
    /// only the first node may omit a parent.
    pub fn add_node(&mut self, id: SectionId, tag: &str, parent: Option<SectionId>) -> Result<()> {
        if self.by_tag.contains_key(tag) {
            return Err(Error::DuplicateTag(tag.to_string()));
        }
        if id.index() != self.nodes.len() {
            return Err(Error::Other(format!(
                "section '{tag}' added out of order (id {}, expected {})",
                id.index(),
                self.nodes.len()
            )));
        }
        match parent {
            Some(parent) => {
                let node = self.nodes.get_mut(parent.index()).ok_or_else(|| {
                    Error::Other(format!("parent of '{tag}' is not in the tree"))
                })?;
                node.children.push(id);
            }
            None if !self.nodes.is_empty() => {
                return Err(Error::Other(format!("'{tag}' would be a second root")));
            }
            None => {}
        }

        self.by_tag.insert(tag.to_string(), id);
        self.nodes.push(TreeNode {
            id,
            tag: tag.to_string(),
            parent,
            children: Vec::new(),
        });
        Ok(())
    }

    /// Root node, if any.
    pub fn root(&self) -> Option<SectionId> {
        self.nodes.first().map(|n| n.id)
    }

    /// Get a node.
    pub fn get(&self, id: SectionId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    /// Look a node up by tag.
    pub fn find(&self, tag: &str) -> Option<SectionId> {
        self.by_tag.get(tag).copied()
    }

    /// Parent of a node.
    pub fn parent(&self, id: SectionId) -> Option<SectionId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node.
    pub fn children(&self, id: SectionId) -> &[SectionId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: SectionId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Pre-order walk yielding each node with its depth.
    pub fn walk(&self) -> Vec<(SectionId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(SectionId, usize)> = self.root().map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            for child in self.children(id).iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        out
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'t> {
    tree: &'t SectionTree,
    next: Option<SectionId>,
}

impl Iterator for Ancestors<'_> {
    type Item = SectionId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SectionTree {
        let mut tree = SectionTree::new();
        tree.add_node(SectionId(0), "bank", None).unwrap();
        tree.add_node(SectionId(1), "detail", Some(SectionId(0))).unwrap();
        tree.add_node(SectionId(2), "detail/account", Some(SectionId(1))).unwrap();
        tree.add_node(SectionId(3), "detail/header", Some(SectionId(2))).unwrap();
        tree.add_node(SectionId(4), "detail/line", Some(SectionId(3))).unwrap();
        tree.add_node(SectionId(5), "summary", Some(SectionId(0))).unwrap();
        tree
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let tree = sample();
        let ancestors: Vec<_> = tree.ancestors(SectionId(4)).collect();
        assert_eq!(
            ancestors,
            vec![SectionId(3), SectionId(2), SectionId(1), SectionId(0)]
        );
        assert_eq!(tree.ancestors(SectionId(0)).count(), 0);
    }

    #[test]
    fn test_walk_preorder() {
        let tree = sample();
        let order: Vec<_> = tree.walk().into_iter().map(|(id, depth)| (id.0, depth)).collect();
        assert_eq!(order, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (5, 1)]);
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut tree = sample();
        let err = tree.add_node(SectionId(6), "detail/header", Some(SectionId(5))).unwrap_err();
        assert!(matches!(err, Error::DuplicateTag(tag) if tag == "detail/header"));
    }

    #[test]
    fn test_second_root_rejected() {
        let mut tree = sample();
        assert!(tree.add_node(SectionId(6), "other", None).is_err());
    }

    #[test]
    fn test_find() {
        let tree = sample();
        assert_eq!(tree.find("summary"), Some(SectionId(5)));
        assert_eq!(tree.find("missing"), None);
        assert_eq!(tree.children(SectionId(0)), &[SectionId(1), SectionId(5)]);
    }
}
