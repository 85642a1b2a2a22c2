//! treemgr: hierarchical tree materialization.
//!
//! A [`Tree`](domain::Tree) holds nodes whose children are produced by
//! composable [`TreeManager`](domain::TreeManager)s. Managers are re-run to
//! refresh a level or a subtree; nodes that survive an update keep their
//! identity, attributes and children.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
