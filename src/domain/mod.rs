//! Domain layer: the tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Children come from [`ChildrenProvider`] implementations plugged into
//! [`TreeManager`]s; the [`Tree`] drives them and keeps updates atomic.

pub mod arena;
pub mod attributes;
pub mod dump;
pub mod error;
pub mod event;
pub mod manager;
pub mod node;
pub mod path;
pub mod providers;
pub mod tree;
pub mod value;

pub use arena::NodeArena;
pub use attributes::AttributeStore;
pub use dump::{dump, DumpOptions};
pub use error::{TreeError, TreeResult};
pub use event::TreeEvent;
pub use manager::{
    compose, ChildrenProvider, ManagerBuilder, ManagerId, NodeFactory, Recursion, TreeManager,
    UpdateContext,
};
pub use node::{ChildSlot, NodeId, TreeNode, ATTRIBUTE_NAME};
pub use path::{format_index_path, format_name_path, parse_path, Segment};
pub use providers::{FnProvider, LabelProvider, NamesProvider};
pub use tree::{Tree, TreeState};
pub use value::Value;
