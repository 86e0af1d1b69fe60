//! Domain entities: core data structures

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A record that participates in a parent-linked hierarchy.
///
/// Everything besides the id and the parent reference is payload and is
/// carried through both conversions untouched.
pub trait Entity {
    type Id: Eq + Hash + Clone + Debug;

    /// Unique identifier within one conversion.
    fn id(&self) -> Self::Id;

    /// Parent reference; `None` when the parent field is absent or null.
    fn parent_id(&self) -> Option<Self::Id>;
}

impl<T: Entity + ?Sized> Entity for &T {
    type Id = T::Id;

    fn id(&self) -> Self::Id {
        (**self).id()
    }

    fn parent_id(&self) -> Option<Self::Id> {
        (**self).parent_id()
    }
}

/// What to do with an entity whose parent reference resolves to nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Fail with an integrity error.
    #[default]
    Reject,
    /// Omit the entity and its whole subtree from the result.
    Drop,
}

impl FromStr for DanglingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DanglingPolicy::Reject),
            "drop" => Ok(DanglingPolicy::Drop),
            other => Err(format!(
                "unknown dangling policy '{other}' (expected 'reject' or 'drop')"
            )),
        }
    }
}

impl std::fmt::Display for DanglingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DanglingPolicy::Reject => write!(f, "reject"),
            DanglingPolicy::Drop => write!(f, "drop"),
        }
    }
}

/// Options for building a tree from a flat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions<Id> {
    /// Sentinel parent id marking a root (e.g. `0`). Entities without a
    /// parent reference are always roots.
    pub root: Option<Id>,
    pub on_dangling: DanglingPolicy,
}

impl<Id> Default for BuildOptions<Id> {
    fn default() -> Self {
        Self {
            root: None,
            on_dangling: DanglingPolicy::Reject,
        }
    }
}

impl<Id> BuildOptions<Id> {
    pub fn with_root(root: Id) -> Self {
        Self {
            root: Some(root),
            on_dangling: DanglingPolicy::Reject,
        }
    }

    pub fn on_dangling(mut self, policy: DanglingPolicy) -> Self {
        self.on_dangling = policy;
        self
    }
}

/// An entity together with its ordered children.
///
/// `children` lives next to the entity, never inside it, so the payload
/// stays exactly what the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    pub entity: T,
    pub children: Children<T>,
}

/// Ordered child list of a [`TreeNode`].
///
/// Derefs to `Vec<TreeNode<T>>`. Dropping it tears the subtree down with an
/// explicit stack, so a deep chain never drops recursively.
#[derive(Clone, PartialEq, Eq)]
pub struct Children<T>(Vec<TreeNode<T>>);

impl<T> Children<T> {
    /// Move the child list out, leaving this one empty.
    pub fn take(&mut self) -> Vec<TreeNode<T>> {
        std::mem::take(&mut self.0)
    }
}

impl<T> Default for Children<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> From<Vec<TreeNode<T>>> for Children<T> {
    fn from(nodes: Vec<TreeNode<T>>) -> Self {
        Self(nodes)
    }
}

impl<T> Deref for Children<T> {
    type Target = Vec<TreeNode<T>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Children<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a, T> IntoIterator for &'a Children<T> {
    type Item = &'a TreeNode<T>;
    type IntoIter = std::slice::Iter<'a, TreeNode<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Debug> Debug for Children<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<T> Drop for Children<T> {
    fn drop(&mut self) {
        let mut pending = self.take();
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children.0);
        }
    }
}

impl<T> TreeNode<T> {
    pub fn leaf(entity: T) -> Self {
        Self {
            entity,
            children: Children::default(),
        }
    }

    pub fn with_children(entity: T, children: Vec<TreeNode<T>>) -> Self {
        Self {
            entity,
            children: Children(children),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> PreOrder<'_, T> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Height of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1)];

        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in &node.children {
                stack.push((child, depth + 1));
            }
        }

        max_depth
    }
}

/// Pre-order traversal of a borrowed tree.
pub struct PreOrder<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> PreOrder<'a, T> {
    pub(crate) fn over_forest(forest: &'a [TreeNode<T>]) -> Self {
        Self {
            stack: forest.iter().rev().collect(),
        }
    }
}

impl<'a, T> Iterator for PreOrder<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse push keeps siblings left-to-right
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Total node count of a forest.
pub fn count_nodes<T>(forest: &[TreeNode<T>]) -> usize {
    PreOrder::over_forest(forest).count()
}

/// Height of the tallest tree in a forest; 0 for an empty forest.
pub fn forest_depth<T>(forest: &[TreeNode<T>]) -> usize {
    forest.iter().map(TreeNode::depth).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode<&'static str> {
        TreeNode::with_children(
            "a",
            vec![
                TreeNode::with_children("b", vec![TreeNode::leaf("d")]),
                TreeNode::leaf("c"),
            ],
        )
    }

    #[test]
    fn given_nested_tree_when_iterating_then_visits_in_pre_order() {
        let tree = sample();
        let order: Vec<_> = tree.iter().map(|n| n.entity).collect();
        assert_eq!(order, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn given_nested_tree_when_measuring_then_reports_len_and_depth() {
        let tree = sample();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(), 3);
        assert!(!tree.is_leaf());
        assert!(tree.children[1].is_leaf());
    }

    #[test]
    fn given_deep_chain_when_dropping_then_no_stack_overflow() {
        // Arrange
        let mut tree = TreeNode::leaf(0u32);
        for i in 1..100_000 {
            tree = TreeNode::with_children(i, vec![tree]);
        }
        assert_eq!(tree.depth(), 100_000);

        // Act
        drop(tree);
    }

    #[test]
    fn given_children_when_taking_then_node_left_as_leaf() {
        let mut tree = sample();

        let children = tree.children.take();

        assert_eq!(children.len(), 2);
        assert!(tree.is_leaf());
    }

    #[test]
    fn given_empty_forest_when_measuring_then_zero() {
        let forest: Vec<TreeNode<u8>> = Vec::new();
        assert_eq!(count_nodes(&forest), 0);
        assert_eq!(forest_depth(&forest), 0);
    }

    #[test]
    fn given_policy_strings_when_parsing_then_accepts_known_values() {
        assert_eq!("reject".parse::<DanglingPolicy>(), Ok(DanglingPolicy::Reject));
        assert_eq!(" DROP ".parse::<DanglingPolicy>(), Ok(DanglingPolicy::Drop));
        assert!("ignore".parse::<DanglingPolicy>().is_err());
        assert_eq!(DanglingPolicy::default(), DanglingPolicy::Reject);
    }
}
