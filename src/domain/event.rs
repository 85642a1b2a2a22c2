use crate::domain::node::NodeId;

/// Change notification emitted by a [`Tree`](crate::domain::Tree).
///
/// Events are buffered while an update runs and delivered once it commits;
/// a failed update delivers nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// A node appeared in a slot
    NodeInserted(NodeId),
    /// A node was kept across an update, or one of its attributes changed
    NodeChanged(NodeId),
    /// A node was dropped; `path` is its index path at deletion time
    NodeDeleted { path: String },
    /// A node gained its first child or lost its last one
    NodeHasChildToggled(NodeId),
}
