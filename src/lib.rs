//! rowtree: lossless conversion between flat parent-linked rows and nested trees
//!
//! Layers, innermost first:
//! - `domain`: the codec itself (`make_tree`, `from_tree`), no I/O
//! - `application`: JSON document services
//! - `infrastructure`: filesystem access and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    flatten_ref, from_tree, make_tree, make_tree_cloned, BuildOptions, DanglingPolicy,
    DomainError, Entity, TreeNode, TreeResult,
};
