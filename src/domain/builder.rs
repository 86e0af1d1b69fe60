//! Tree builder: links a flat, parent-referencing list into a forest.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::entities::{BuildOptions, DanglingPolicy, Entity, TreeNode};
use crate::domain::error::{DomainError, TreeResult};

/// Where an entity's parent reference points, by input position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Root,
    Parent(usize),
    Dangling,
}

/// Outcome of following parent links from one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Unknown,
    InProgress,
    Rooted,
    Detached,
}

/// Constructs forests from flat lists of entities.
///
/// The builder only holds options; every call works on its own input, so a
/// single builder can be shared across threads.
#[derive(Debug, Clone)]
pub struct TreeBuilder<Id> {
    options: BuildOptions<Id>,
}

impl<Id> Default for TreeBuilder<Id> {
    fn default() -> Self {
        Self {
            options: BuildOptions::default(),
        }
    }
}

impl<Id: Eq + Hash + Clone + Debug> TreeBuilder<Id> {
    pub fn new(options: BuildOptions<Id>) -> Self {
        Self { options }
    }

    /// Build nested trees; roots and siblings keep their input order.
    pub fn build<T>(&self, items: Vec<T>) -> TreeResult<Vec<TreeNode<T>>>
    where
        T: Entity<Id = Id>,
    {
        Ok(self.build_arena(items)?.into_forest())
    }

    /// Link entities into an arena-backed forest.
    ///
    /// Fails on duplicate ids, on dangling parents (unless the policy drops
    /// them), and on any entity whose parent chain never reaches a root.
    #[instrument(level = "debug", skip_all, fields(count = items.len()))]
    pub fn build_arena<T>(&self, items: Vec<T>) -> TreeResult<TreeArena<T>>
    where
        T: Entity<Id = Id>,
    {
        let ids: Vec<Id> = items.iter().map(Entity::id).collect();
        let position = self.index_ids(&ids)?;
        let links = self.resolve_links(&items, &ids, &position)?;
        let reach = self.follow_links(&links, &ids)?;

        // Group by parent, preserving input order
        let mut relationship_cache: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
        let mut root_nodes = Vec::new();
        for (i, link) in links.iter().enumerate() {
            if reach[i] != Reach::Rooted {
                continue;
            }
            match link {
                Link::Root => root_nodes.push(i),
                Link::Parent(p) => relationship_cache[*p].push(i),
                Link::Dangling => {}
            }
        }

        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let mut tree = TreeArena::with_capacity(slots.len());
        let mut stack: Vec<(usize, Option<Index>)> =
            root_nodes.iter().rev().map(|&r| (r, None)).collect();

        while let Some((current, parent_idx)) = stack.pop() {
            let Some(entity) = slots[current].take() else {
                continue;
            };
            let current_idx = tree.insert_node(entity, parent_idx);
            for &child in relationship_cache[current].iter().rev() {
                stack.push((child, Some(current_idx)));
            }
        }

        debug!(
            "linked {} entities into {} roots",
            tree.len(),
            tree.roots().len()
        );
        Ok(tree)
    }

    fn index_ids(&self, ids: &[Id]) -> TreeResult<HashMap<Id, usize>> {
        let mut position = HashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if position.insert(id.clone(), i).is_some() {
                return Err(DomainError::DuplicateId(format!("{id:?}")));
            }
        }
        Ok(position)
    }

    fn resolve_links<T>(
        &self,
        items: &[T],
        ids: &[Id],
        position: &HashMap<Id, usize>,
    ) -> TreeResult<Vec<Link>>
    where
        T: Entity<Id = Id>,
    {
        let mut links = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let link = match item.parent_id() {
                None => Link::Root,
                Some(parent) if self.options.root.as_ref() == Some(&parent) => Link::Root,
                Some(parent) => match position.get(&parent) {
                    Some(&p) => Link::Parent(p),
                    None if self.options.on_dangling == DanglingPolicy::Reject => {
                        return Err(DomainError::DanglingParent {
                            id: format!("{:?}", ids[i]),
                            parent: format!("{parent:?}"),
                        });
                    }
                    None => {
                        debug!("dropping {:?}: parent {:?} not found", ids[i], parent);
                        Link::Dangling
                    }
                },
            };
            links.push(link);
        }
        Ok(links)
    }

    /// Classify every entity by where its parent chain ends.
    ///
    /// Each entity is walked at most once; results are memoized for the
    /// whole path, keeping this linear in the input size.
    fn follow_links(&self, links: &[Link], ids: &[Id]) -> TreeResult<Vec<Reach>> {
        let mut reach = vec![Reach::Unknown; links.len()];
        let mut path = Vec::new();

        for start in 0..links.len() {
            if reach[start] != Reach::Unknown {
                continue;
            }
            path.clear();
            let mut current = start;
            let outcome = loop {
                match reach[current] {
                    Reach::Unknown => {
                        reach[current] = Reach::InProgress;
                        path.push(current);
                        match links[current] {
                            Link::Root => break Reach::Rooted,
                            Link::Dangling => break Reach::Detached,
                            Link::Parent(p) => current = p,
                        }
                    }
                    Reach::InProgress => {
                        return Err(DomainError::CycleDetected(format!("{:?}", ids[current])));
                    }
                    // Only InProgress nodes may still be inside a running walk
                    settled => break settled,
                }
            };
            for &i in &path {
                reach[i] = outcome;
            }
        }

        Ok(reach)
    }
}
