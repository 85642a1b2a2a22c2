//! Diagnostic rendering of a node hierarchy. Not a stable format.

use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::NodeArena;
use crate::domain::node::NodeId;

/// What each dumped line shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Append every attribute as `name=value` after the node's name
    pub all_attributes: bool,
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, from: NodeId, options: DumpOptions) -> Tree<String>;
}

impl TreeNodeConvert for NodeArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, from: NodeId, options: DumpOptions) -> Tree<String> {
        fn build_tree(arena: &NodeArena, id: NodeId, options: DumpOptions, parent: &mut Tree<String>) {
            for child in arena.children(id) {
                let mut child_tree = Tree::new(header(arena, child, options));
                build_tree(arena, child, options, &mut child_tree);
                parent.push(child_tree);
            }
        }

        let mut tree = Tree::new(".".to_string());
        build_tree(self, from, options, &mut tree);
        tree
    }
}

fn header(arena: &NodeArena, id: NodeId, options: DumpOptions) -> String {
    let mut line = arena.name(id).unwrap_or("Unnamed node").to_string();
    if options.all_attributes {
        line.push(':');
        for (name, value) in arena.attributes(id) {
            line.push_str(&format!(" {}={}", name, value));
        }
    }
    line
}

/// Box-drawing dump of everything below `from`.
pub fn dump(arena: &NodeArena, from: NodeId, options: DumpOptions) -> String {
    arena.to_tree_string(from, options).to_string()
}
