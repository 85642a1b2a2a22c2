use std::fmt;
use std::sync::Arc;

use generational_arena::Index;

use crate::domain::manager::{ManagerId, TreeManager};

/// Conventional attribute holding a node's display name.
pub const ATTRIBUTE_NAME: &str = "name";

/// Stable handle of a node inside a [`NodeArena`](crate::domain::NodeArena).
///
/// Handles are generational: once a node is freed its handle never resolves
/// again, even if the slot in the arena is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (idx, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", idx, generation)
    }
}

/// Children contributed to one node by one manager.
#[derive(Debug, Clone)]
pub struct ChildSlot {
    pub manager: Arc<TreeManager>,
    pub nodes: Vec<NodeId>,
    /// False while the slot is only registered (sub-manager not run yet)
    pub populated: bool,
    /// Children of the last run while unpopulated: invisible, but offered
    /// to the manager as `existing` on its next run
    pub seed: Vec<NodeId>,
}

impl ChildSlot {
    pub fn manager_id(&self) -> ManagerId {
        self.manager.id()
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }
}

/// Tree node in the arena-based hierarchy.
///
/// Attributes live in the arena's attribute store, keyed by the node's id.
#[derive(Debug, Clone, Default)]
pub struct TreeNode {
    /// Index of the parent node, None for roots and freshly created nodes
    pub parent: Option<NodeId>,
    /// Per-manager child groups in registration order
    pub slots: Vec<ChildSlot>,
}

impl TreeNode {
    pub fn slot(&self, manager: ManagerId) -> Option<&ChildSlot> {
        self.slots.iter().find(|s| s.manager_id() == manager)
    }

    pub fn child_count(&self) -> usize {
        self.slots.iter().map(ChildSlot::count).sum()
    }

    /// Flattened children: slots in registration order, then slot order.
    pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().flat_map(|s| s.nodes.iter().copied())
    }

    pub fn has_child(&self, child: NodeId) -> bool {
        self.slots.iter().any(|s| s.nodes.contains(&child))
    }

    /// Visible children plus the seeds of unpopulated slots.
    pub fn owned_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .flat_map(|s| s.nodes.iter().chain(s.seed.iter()).copied())
    }

    pub fn owns(&self, child: NodeId) -> bool {
        self.owned_ids().any(|c| c == child)
    }
}
