//! Flat list <-> tree conversion.
//!
//! Both directions are pure and iterative, so a deep chain never grows the
//! call stack.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, instrument};

use crate::domain::builder::TreeBuilder;
use crate::domain::entities::{BuildOptions, Entity, PreOrder, TreeNode};
use crate::domain::error::TreeResult;

/// Build a forest from a flat list.
///
/// Entities whose parent is absent or equals `options.root` become roots.
/// Children keep the relative order they had in `items`.
///
/// # Errors
/// * `DanglingParent` / `DuplicateId` for unresolvable or ambiguous references
/// * `CycleDetected` when a parent chain never reaches a root
pub fn make_tree<T, Id>(items: Vec<T>, options: &BuildOptions<Id>) -> TreeResult<Vec<TreeNode<T>>>
where
    T: Entity<Id = Id>,
    Id: Eq + Hash + Clone + Debug,
{
    TreeBuilder::new(options.clone()).build(items)
}

/// Like [`make_tree`], leaving the input slice untouched.
pub fn make_tree_cloned<T, Id>(
    items: &[T],
    options: &BuildOptions<Id>,
) -> TreeResult<Vec<TreeNode<T>>>
where
    T: Entity<Id = Id> + Clone,
    Id: Eq + Hash + Clone + Debug,
{
    make_tree(items.to_vec(), options)
}

/// Flatten a forest into a pre-order list, stripping `children`.
///
/// A parent always precedes its descendants and each subtree is contiguous.
#[instrument(level = "debug", skip_all, fields(roots = forest.len()))]
pub fn from_tree<T>(forest: Vec<TreeNode<T>>) -> Vec<T> {
    let flat: Vec<T> = disassemble(forest)
        .into_iter()
        .map(|(entity, _)| entity)
        .collect();
    debug!("flattened {} entities", flat.len());
    flat
}

/// Consume a forest into pre-order `(entity, child_count)` pairs.
pub(crate) fn disassemble<T>(forest: Vec<TreeNode<T>>) -> Vec<(T, usize)> {
    let mut preorder = Vec::new();
    let mut stack = vec![forest.into_iter()];

    while let Some(siblings) = stack.last_mut() {
        match siblings.next() {
            Some(TreeNode {
                entity,
                mut children,
            }) => {
                let children = children.take();
                preorder.push((entity, children.len()));
                if !children.is_empty() {
                    stack.push(children.into_iter());
                }
            }
            None => {
                stack.pop();
            }
        }
    }

    preorder
}

/// Rebuild a forest from pre-order `(entity, child_count)` pairs.
///
/// Walking backwards, every node finds its children finished on top of the
/// work stack, first child uppermost.
pub(crate) fn assemble<T>(preorder: Vec<(T, usize)>) -> Vec<TreeNode<T>> {
    let mut built: Vec<TreeNode<T>> = Vec::with_capacity(preorder.len());

    for (entity, child_count) in preorder.into_iter().rev() {
        let mut children = Vec::with_capacity(child_count);
        for _ in 0..child_count {
            if let Some(child) = built.pop() {
                children.push(child);
            }
        }
        built.push(TreeNode::with_children(entity, children));
    }

    built.reverse();
    built
}

/// Pre-order view of a borrowed forest.
pub fn flatten_ref<T>(forest: &[TreeNode<T>]) -> Vec<&T> {
    PreOrder::over_forest(forest).map(|node| &node.entity).collect()
}
