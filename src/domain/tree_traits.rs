//! Conversion of forests into `termtree` renderings for terminal display.

use termtree::Tree;

use crate::domain::arena::TreeArena;
use crate::domain::entities::{PreOrder, TreeNode};

pub trait TreeNodeConvert<T> {
    /// One rendered tree per root, each node labelled by `label`.
    fn to_tree_strings<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&T) -> String;
}

impl<T> TreeNodeConvert<T> for [TreeNode<T>] {
    fn to_tree_strings<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&T) -> String,
    {
        let preorder = PreOrder::over_forest(self)
            .map(|node| (label(&node.entity), node.children.len()))
            .collect();
        into_termtrees(preorder)
    }
}

impl<T> TreeNodeConvert<T> for TreeArena<T> {
    fn to_tree_strings<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&T) -> String,
    {
        let preorder = self
            .iter()
            .map(|(_, node)| (label(&node.data), node.children.len()))
            .collect();
        into_termtrees(preorder)
    }
}

// termtree nodes own their leaves, so rebuild bottom-up without recursion
fn into_termtrees(preorder: Vec<(String, usize)>) -> Vec<Tree<String>> {
    let mut built: Vec<Tree<String>> = Vec::with_capacity(preorder.len());

    for (text, child_count) in preorder.into_iter().rev() {
        let mut tree = Tree::new(text);
        for _ in 0..child_count {
            if let Some(child) = built.pop() {
                tree.push(child);
            }
        }
        built.push(tree);
    }

    built.reverse();
    built
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_forest_when_rendering_then_lines_follow_pre_order() {
        let forest = vec![TreeNode::with_children(
            "A",
            vec![
                TreeNode::with_children("B", vec![TreeNode::leaf("D")]),
                TreeNode::leaf("C"),
            ],
        )];

        let trees = forest.to_tree_strings(|s| s.to_string());
        assert_eq!(trees.len(), 1);
        let rendered = trees[0].to_string();
        let labels: Vec<&str> = rendered
            .lines()
            .map(|l| l.trim_start_matches(|c: char| !c.is_ascii_alphabetic()))
            .collect();
        assert_eq!(labels, vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn given_arena_when_rendering_then_one_tree_per_root() {
        let mut arena = TreeArena::new();
        let a = arena.insert_node(1, None);
        arena.insert_node(2, Some(a));
        arena.insert_node(3, None);

        let trees = arena.to_tree_strings(|n| format!("node-{n}"));
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].leaves.len(), 1);
        assert_eq!(trees[1].root, "node-3");
    }
}
