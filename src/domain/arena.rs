use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::codec::assemble;
use crate::domain::entities::TreeNode;

/// Node stored in the arena.
#[derive(Debug)]
pub struct ArenaNode<T> {
    /// Entity payload for this node
    pub data: T,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

/// Arena-based forest used while linking a flat list.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Roots and children keep insertion order.
#[derive(Debug)]
pub struct TreeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<ArenaNode<T>>,
    /// Root indices in insertion order
    roots: Vec<Index>,
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            roots: Vec::new(),
        }
    }

    /// Insert a node; with `parent == None` it becomes a new root.
    ///
    /// A parent index that is no longer live leaves the node detached; the
    /// builder only passes indices it has just inserted.
    pub fn insert_node(&mut self, data: T, parent: Option<Index>) -> Index {
        let node = ArenaNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode<T>> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Height of the tallest tree; 0 when empty.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&r| (r, 1)).collect();

        while let Some((idx, depth)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                max_depth = max_depth.max(depth);
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }

        max_depth
    }

    /// Collects all leaf nodes (nodes with no children) in pre-order.
    #[instrument(level = "trace", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<&T> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| &node.data)
            .collect()
    }

    /// Materialize the forest into owned nested nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn into_forest(mut self) -> Vec<TreeNode<T>> {
        let order: Vec<(Index, usize)> = self
            .iter()
            .map(|(idx, node)| (idx, node.children.len()))
            .collect();
        let preorder = order
            .into_iter()
            .filter_map(|(idx, child_count)| {
                self.arena.remove(idx).map(|node| (node.data, child_count))
            })
            .collect();
        assemble(preorder)
    }
}

/// Pre-order iterator over every tree of the forest.
pub struct TreeIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> TreeIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = (Index, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

/// Post-order iterator (children before parent) over the forest.
pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let stack = arena.roots.iter().rev().map(|&r| (r, false)).collect();
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
