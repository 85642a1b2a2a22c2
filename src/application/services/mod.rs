//! Application services
//!
//! Services orchestrate the tree engine with I/O boundary traits.

pub mod directory;
pub mod layout;

pub use directory::{
    directory_managers, directory_tree, DirectoryOptions, DirectoryProvider, ATTRIBUTE_KIND,
    ATTRIBUTE_PATH,
};
pub use layout::{layout_file, Layout, LayoutService, ManagerKind, ManagerLayout};
