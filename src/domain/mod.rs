//! Domain layer: the tree codec and its data types
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod codec;
pub mod entities;
pub mod error;
pub mod record;
pub mod tree_traits;

pub use arena::TreeArena;
pub use builder::TreeBuilder;
pub use codec::{flatten_ref, from_tree, make_tree, make_tree_cloned};
pub use entities::*;
pub use error::{DomainError, ErrorKind, TreeResult};
pub use record::{Record, RecordKey, RecordSchema};
pub use tree_traits::TreeNodeConvert;
