//! Tests for TreeBuilder and the arena it links into

use rstest::{fixture, rstest};

use rowtree::domain::{TreeBuilder, TreeNodeConvert};
use rowtree::{BuildOptions, DanglingPolicy, DomainError, Entity};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: i64,
    parent: Option<i64>,
}

impl Entity for Row {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent
    }
}

fn row(id: i64, parent: i64) -> Row {
    Row {
        id,
        parent: Some(parent),
    }
}

/// Two trees: 1[2[4], 3] and 5[6]
#[fixture]
fn two_trees() -> Vec<Row> {
    vec![row(1, -1), row(2, 1), row(3, 1), row(4, 2), row(5, -1), row(6, 5)]
}

#[fixture]
fn builder() -> TreeBuilder<i64> {
    TreeBuilder::new(BuildOptions::with_root(-1))
}

#[rstest]
fn given_rows_when_building_arena_then_roots_in_order(builder: TreeBuilder<i64>, two_trees: Vec<Row>) {
    // Act
    let arena = builder.build_arena(two_trees).unwrap();

    // Assert
    assert_eq!(arena.len(), 6);
    let roots: Vec<i64> = arena
        .roots()
        .iter()
        .filter_map(|idx| arena.get_node(*idx))
        .map(|node| node.data.id)
        .collect();
    assert_eq!(roots, vec![1, 5]);
}

#[rstest]
fn given_arena_when_iterating_then_pre_and_post_order(
    builder: TreeBuilder<i64>,
    two_trees: Vec<Row>,
) {
    let arena = builder.build_arena(two_trees).unwrap();

    let pre: Vec<i64> = arena.iter().map(|(_, node)| node.data.id).collect();
    let post: Vec<i64> = arena.iter_postorder().map(|(_, node)| node.data.id).collect();

    assert_eq!(pre, vec![1, 2, 4, 3, 5, 6]);
    assert_eq!(post, vec![4, 2, 3, 1, 6, 5]);
}

#[rstest]
fn given_arena_when_measuring_then_depth_and_leaves(builder: TreeBuilder<i64>, two_trees: Vec<Row>) {
    let arena = builder.build_arena(two_trees).unwrap();

    let leaves: Vec<i64> = arena.leaf_nodes().iter().map(|r| r.id).collect();

    assert_eq!(arena.depth(), 3);
    assert_eq!(leaves, vec![4, 3, 6]);
}

#[rstest]
fn given_arena_when_materializing_then_same_as_build(builder: TreeBuilder<i64>, two_trees: Vec<Row>) {
    let from_arena = builder.build_arena(two_trees.clone()).unwrap().into_forest();
    let direct = builder.build(two_trees).unwrap();

    assert_eq!(from_arena, direct);
}

#[rstest]
fn given_arena_when_rendering_then_tree_strings(builder: TreeBuilder<i64>, two_trees: Vec<Row>) {
    let arena = builder.build_arena(two_trees).unwrap();

    let rendered: Vec<String> = arena
        .to_tree_strings(|r| format!("#{}", r.id))
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(rendered.len(), 2);
    assert!(rendered[0].starts_with("#1\n"));
    assert!(rendered[0].contains("#4"));
    assert!(rendered[1].starts_with("#5\n"));
}

#[test]
fn given_none_parent_when_building_without_sentinel_then_root() {
    let builder = TreeBuilder::new(BuildOptions::default());
    let rows = vec![
        Row { id: 1, parent: None },
        row(2, 1),
    ];

    let forest = builder.build(rows).unwrap();

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].children[0].entity.id, 2);
}

#[test]
fn given_dangling_under_reject_when_building_arena_then_error_names_both_ids() {
    let builder = TreeBuilder::new(BuildOptions::with_root(-1));

    let err = builder.build_arena(vec![row(1, -1), row(2, 99)]).unwrap_err();

    assert_eq!(err.to_string(), "integrity error: entity 2 references missing parent 99");
}

#[test]
fn given_dangling_chain_under_drop_when_building_arena_then_only_rooted_nodes() {
    let builder =
        TreeBuilder::new(BuildOptions::with_root(-1).on_dangling(DanglingPolicy::Drop));

    let arena = builder
        .build_arena(vec![row(1, -1), row(2, 99), row(3, 2), row(4, 3), row(5, 1)])
        .unwrap();

    let ids: Vec<i64> = arena.iter().map(|(_, node)| node.data.id).collect();
    assert_eq!(ids, vec![1, 5]);
}

#[test]
fn given_cycle_hanging_off_tree_when_building_then_cycle_error() {
    // 3 and 4 point at each other; 5 hangs under the cycle
    let builder = TreeBuilder::new(BuildOptions::with_root(-1));

    let err = builder
        .build(vec![row(1, -1), row(3, 4), row(4, 3), row(5, 4)])
        .unwrap_err();

    assert!(matches!(err, DomainError::CycleDetected(_)));
}
