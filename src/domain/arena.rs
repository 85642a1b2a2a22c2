use std::sync::Arc;

use generational_arena::Arena;
use tracing::{instrument, trace};

use crate::domain::attributes::{AttributeStore, Change};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::event::TreeEvent;
use crate::domain::manager::{ManagerId, TreeManager};
use crate::domain::node::{ChildSlot, NodeId, TreeNode, ATTRIBUTE_NAME};
use crate::domain::value::Value;

/// Arena-based node storage for one tree.
///
/// Owns every node, the attribute table and the root handle. Ownership flows
/// strictly from a parent's slots to the listed children; the `parent` field
/// of a node is a relation only.
///
/// Mutations made between [`begin`](Self::begin) and
/// [`commit`](Self::commit)/[`rollback`](Self::rollback) are journaled so a
/// failed update can restore the arena exactly.
#[derive(Debug)]
pub struct NodeArena {
    arena: Arena<TreeNode>,
    attributes: AttributeStore,
    root: NodeId,
    journal: Option<Journal>,
    events: Vec<TreeEvent>,
}

#[derive(Debug, Default)]
struct Journal {
    undo: Vec<Undo>,
    /// Nodes dropped from a slot, freed at commit unless re-owned
    released: Vec<NodeId>,
    /// Nodes created during the transaction, freed at commit if never attached
    created: Vec<NodeId>,
    /// Events queued before the transaction started
    events_mark: usize,
}

#[derive(Debug)]
enum Undo {
    Inserted(NodeId),
    Slots { node: NodeId, previous: Vec<ChildSlot> },
    Parent { node: NodeId, previous: Option<NodeId> },
    Attribute { node: NodeId, name: String, previous: Option<Value> },
    Root(NodeId),
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    /// Creates an arena holding a single unnamed root node.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(TreeNode::default()));
        Self {
            arena,
            attributes: AttributeStore::new(),
            root,
            journal: None,
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id.0)
    }

    fn node(&self, id: NodeId) -> TreeResult<&TreeNode> {
        self.arena.get(id.0).ok_or(TreeError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut TreeNode> {
        self.arena.get_mut(id.0).ok_or(TreeError::StaleNode(id))
    }

    /// Default node factory: a bare node, optionally named.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, name: Option<&str>) -> NodeId {
        let id = NodeId(self.arena.insert(TreeNode::default()));
        if let Some(name) = name {
            self.attributes
                .set(id, ATTRIBUTE_NAME, Some(Value::from(name)));
        }
        if let Some(journal) = self.journal.as_mut() {
            journal.undo.push(Undo::Inserted(id));
            journal.created.push(id);
        }
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    /// True for the root and for nodes listed in some slot.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.parent(id).is_some()
    }

    // ------------------------------------------------------------------
    // attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.attributes.get(id, name)
    }

    /// Attribute of `id` or of its nearest ancestor carrying it.
    pub fn fetch_attribute(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.attributes.fetch(id, name, |n| self.parent(n))
    }

    /// Sets or (with `None`) removes an attribute; returns whether it changed.
    #[instrument(level = "trace", skip(self, value))]
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: Option<Value>,
    ) -> TreeResult<bool> {
        if !self.contains(id) {
            return Err(TreeError::StaleNode(id));
        }
        let change = self.attributes.set(id, name, value);
        let Change::Changed { previous } = change else {
            return Ok(false);
        };
        if let Some(journal) = self.journal.as_mut() {
            journal.undo.push(Undo::Attribute {
                node: id,
                name: name.to_string(),
                previous,
            });
        }
        if id != self.root && self.parent(id).is_some() {
            self.events.push(TreeEvent::NodeChanged(id));
        }
        Ok(true)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get_attribute(id, ATTRIBUTE_NAME).and_then(Value::as_str)
    }

    /// Attributes set directly on `id`, sorted by name.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.attributes_of(id)
    }

    /// Copies `from`'s own attributes onto `to` (children are not touched).
    pub(crate) fn copy_attributes(&mut self, from: NodeId, to: NodeId) {
        let attrs: Vec<(String, Value)> = self
            .attributes(from)
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        for (name, value) in attrs {
            if let Change::Changed { previous } = self.attributes.set(to, &name, Some(value)) {
                if let Some(journal) = self.journal.as_mut() {
                    journal.undo.push(Undo::Attribute {
                        node: to,
                        name,
                        previous,
                    });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // children
    // ------------------------------------------------------------------

    /// All children of `id` in manager-registration order, then slot order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get_node(id)
            .map(|n| n.child_ids().collect())
            .unwrap_or_default()
    }

    /// Child at flattened position `index`, walking slots without
    /// materializing the concatenation.
    pub fn child_at_index(&self, id: NodeId, index: usize) -> Option<NodeId> {
        let node = self.get_node(id)?;
        let mut i = index;
        for slot in &node.slots {
            if i < slot.count() {
                return Some(slot.nodes[i]);
            }
            i -= slot.count();
        }
        None
    }

    /// First child whose name attribute equals `name`.
    pub fn child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.get_node(id)?
            .child_ids()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Managers holding a slot on `id`, in registration order.
    pub fn managers_of_children(&self, id: NodeId) -> Vec<Arc<TreeManager>> {
        self.get_node(id)
            .map(|n| n.slots.iter().map(|s| Arc::clone(&s.manager)).collect())
            .unwrap_or_default()
    }

    /// Previous output of `manager` for `id`: the visible slot, or its seed
    /// while unpopulated; empty when it has no slot.
    pub fn children_for_manager(&self, id: NodeId, manager: ManagerId) -> &[NodeId] {
        self.get_node(id)
            .and_then(|n| n.slot(manager))
            .map(|s| if s.populated { s.nodes.as_slice() } else { s.seed.as_slice() })
            .unwrap_or(&[])
    }

    pub fn slot(&self, id: NodeId, manager: ManagerId) -> Option<&ChildSlot> {
        self.get_node(id).and_then(|n| n.slot(manager))
    }

    /// Manager whose slot on `parent` lists `child`.
    pub fn manager_for_child(&self, parent: NodeId, child: NodeId) -> Option<Arc<TreeManager>> {
        self.get_node(parent)?
            .slots
            .iter()
            .find(|s| s.nodes.contains(&child))
            .map(|s| Arc::clone(&s.manager))
    }

    /// Flattened position of `id` among its parent's children.
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.get_node(parent)?.child_ids().position(|c| c == id)
    }

    /// Positions from the top of `id`'s ancestry down to `id`.
    ///
    /// The walk ends at the first node without a parent; None when some
    /// ancestor no longer lists the node on the way.
    pub fn index_path(&self, id: NodeId) -> Option<Vec<usize>> {
        self.get_node(id)?;
        let mut positions = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            positions.push(self.position_of(current)?);
            current = parent;
        }
        positions.reverse();
        Some(positions)
    }

    /// Replaces `manager`'s slot on `id` with `children`.
    ///
    /// `previous` is the list the manager was seeded with; it is the base for
    /// change events and for releasing nodes that were not kept. Released
    /// nodes are freed at commit (or immediately outside a transaction)
    /// unless another slot owns them by then.
    #[instrument(level = "trace", skip(self, manager, children, previous), fields(manager = manager.label()))]
    pub(crate) fn attach_children(
        &mut self,
        id: NodeId,
        manager: &Arc<TreeManager>,
        children: &[NodeId],
        previous: &[NodeId],
    ) -> TreeResult<()> {
        let mgr_id = manager.id();
        let node = self.node(id)?;
        let slot_pos = node.slots.iter().position(|s| s.manager_id() == mgr_id);
        let offset: usize = node
            .slots
            .iter()
            .take(slot_pos.unwrap_or(node.slots.len()))
            .map(ChildSlot::count)
            .sum();
        let current: Vec<NodeId> = slot_pos
            .map(|p| node.slots[p].nodes.clone())
            .unwrap_or_default();
        let seed: Vec<NodeId> = slot_pos
            .map(|p| node.slots[p].seed.clone())
            .unwrap_or_default();
        let others = node.child_count() - current.len();
        let previous_slots = node.slots.clone();

        for &child in children {
            let old_parent = self.node(child)?.parent;
            if old_parent != Some(id) {
                self.node_mut(child)?.parent = Some(id);
                if let Some(journal) = self.journal.as_mut() {
                    journal.undo.push(Undo::Parent {
                        node: child,
                        previous: old_parent,
                    });
                }
            }
        }

        let slot = ChildSlot {
            manager: Arc::clone(manager),
            nodes: children.to_vec(),
            populated: true,
            seed: Vec::new(),
        };
        let node = self.node_mut(id)?;
        match slot_pos {
            Some(p) => node.slots[p] = slot,
            None => node.slots.push(slot),
        }
        if let Some(journal) = self.journal.as_mut() {
            journal.undo.push(Undo::Slots {
                node: id,
                previous: previous_slots,
            });
        }

        // events, relative to the visible part of the previous list
        let shown: Vec<NodeId> = previous
            .iter()
            .copied()
            .filter(|n| !seed.contains(n))
            .collect();
        let base = self.index_path(id).unwrap_or_default();
        let mut removed = 0;
        for (i, old) in shown.iter().enumerate() {
            if !children.contains(old) {
                let mut path = base.clone();
                path.push(offset + i - removed);
                removed += 1;
                self.events.push(TreeEvent::NodeDeleted {
                    path: crate::domain::path::format_index_path(&path),
                });
            }
        }
        for &child in children {
            if shown.contains(&child) {
                self.events.push(TreeEvent::NodeChanged(child));
            } else {
                self.events.push(TreeEvent::NodeInserted(child));
            }
        }
        let before = others + shown.len();
        let after = others + children.len();
        if (before == 0) != (after == 0) {
            self.events.push(TreeEvent::NodeHasChildToggled(id));
        }

        let dropped: Vec<NodeId> = previous
            .iter()
            .chain(current.iter())
            .chain(seed.iter())
            .copied()
            .filter(|n| !children.contains(n))
            .collect();
        self.release(dropped);
        Ok(())
    }

    /// Hides `manager`'s slot on `id` until the manager runs again.
    ///
    /// The visible children become the slot's seed; a missing slot is
    /// registered empty. Nothing is freed, the seed stays owned by `id`.
    pub(crate) fn invalidate_slot(&mut self, id: NodeId, manager: &Arc<TreeManager>) -> TreeResult<()> {
        let mgr_id = manager.id();
        let node = self.node(id)?;
        let previous = node.slots.clone();
        let slot_pos = node.slots.iter().position(|s| s.manager_id() == mgr_id);
        let offset: usize = node
            .slots
            .iter()
            .take(slot_pos.unwrap_or(node.slots.len()))
            .map(ChildSlot::count)
            .sum();
        let total = node.child_count();

        let hidden = match slot_pos {
            Some(p) => {
                let slot = &mut self.node_mut(id)?.slots[p];
                if !slot.populated {
                    return Ok(());
                }
                let hidden = std::mem::take(&mut slot.nodes);
                slot.seed = hidden.clone();
                slot.populated = false;
                hidden
            }
            None => {
                self.node_mut(id)?.slots.push(ChildSlot {
                    manager: Arc::clone(manager),
                    nodes: Vec::new(),
                    populated: false,
                    seed: Vec::new(),
                });
                Vec::new()
            }
        };
        if let Some(journal) = self.journal.as_mut() {
            journal.undo.push(Undo::Slots { node: id, previous });
        }

        if !hidden.is_empty() {
            let mut path = self.index_path(id).unwrap_or_default();
            path.push(offset);
            let path = crate::domain::path::format_index_path(&path);
            for _ in &hidden {
                self.events.push(TreeEvent::NodeDeleted { path: path.clone() });
            }
            if total == hidden.len() {
                self.events.push(TreeEvent::NodeHasChildToggled(id));
            }
        }
        Ok(())
    }

    /// Makes `id` the root; the old root is released.
    pub(crate) fn set_root(&mut self, id: NodeId) {
        debug_assert!(self.contains(id), "root must be live");
        let old = self.root;
        if old == id {
            return;
        }
        self.root = id;
        if let Some(journal) = self.journal.as_mut() {
            journal.undo.push(Undo::Root(old));
        }
        self.release(vec![old]);
    }

    fn release(&mut self, nodes: Vec<NodeId>) {
        match self.journal.as_mut() {
            Some(journal) => journal.released.extend(nodes),
            None => {
                for id in nodes {
                    if self.is_orphan(id) {
                        self.free_subtree(id);
                    }
                }
            }
        }
    }

    /// Live, not the root, and neither listed nor seeded by its parent.
    fn is_orphan(&self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        match self.parent(id) {
            Some(parent) => self.get_node(parent).map_or(true, |p| !p.owns(id)),
            None => true,
        }
    }

    /// Frees `id` and every descendant it still owns.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current.0) {
                trace!(node = %current, "freeing node");
                self.attributes.remove_node(current);
                for child in node.owned_ids() {
                    if self.parent(child) == Some(current) {
                        stack.push(child);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // transactions
    // ------------------------------------------------------------------

    pub(crate) fn begin(&mut self) {
        debug_assert!(self.journal.is_none(), "nested transaction");
        self.journal = Some(Journal {
            events_mark: self.events.len(),
            ..Journal::default()
        });
    }

    /// Keeps every journaled change and frees nodes nothing owns anymore.
    pub(crate) fn commit(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        let mut freed = 0;
        for id in journal.released.into_iter().chain(journal.created) {
            if self.is_orphan(id) {
                self.free_subtree(id);
                freed += 1;
            }
        }
        trace!(freed, live = self.len(), "transaction committed");
    }

    /// Undoes every journaled change, newest first, and drops pending events.
    pub(crate) fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for undo in journal.undo.into_iter().rev() {
            match undo {
                Undo::Inserted(id) => {
                    self.arena.remove(id.0);
                    self.attributes.remove_node(id);
                }
                Undo::Slots { node, previous } => {
                    if let Some(n) = self.arena.get_mut(node.0) {
                        n.slots = previous;
                    }
                }
                Undo::Parent { node, previous } => {
                    if let Some(n) = self.arena.get_mut(node.0) {
                        n.parent = previous;
                    }
                }
                Undo::Attribute {
                    node,
                    name,
                    previous,
                } => {
                    self.attributes.set(node, &name, previous);
                }
                Undo::Root(previous) => self.root = previous,
            }
        }
        self.events.truncate(journal.events_mark);
        trace!(live = self.len(), "transaction rolled back");
    }

    /// Drains events raised since the last call.
    pub(crate) fn take_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // traversal
    // ------------------------------------------------------------------

    /// Preorder traversal below `from` (inclusive).
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self, from: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, from)
    }

    /// Levels below the root, root included.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get_node(id) {
            1 + node
                .child_ids()
                .map(|child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }
}

pub struct TreeIterator<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a NodeArena, from: NodeId) -> Self {
        Self {
            arena,
            stack: vec![from],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                let children: Vec<NodeId> = node.child_ids().collect();
                self.stack.extend(children.into_iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::manager::TreeManager;

    fn manager() -> Arc<TreeManager> {
        TreeManager::with_func(|_, _, _| Ok(Vec::new()))
    }

    fn attach(arena: &mut NodeArena, parent: NodeId, mgr: &Arc<TreeManager>, names: &[&str]) -> Vec<NodeId> {
        let ids: Vec<NodeId> = names.iter().map(|n| arena.insert_node(Some(n))).collect();
        let previous = arena.children_for_manager(parent, mgr.id()).to_vec();
        arena.attach_children(parent, mgr, &ids, &previous).unwrap();
        ids
    }

    #[test]
    fn given_two_slots_when_indexing_then_walks_slots_in_registration_order() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let (m1, m2) = (manager(), manager());
        let a = attach(&mut arena, root, &m1, &["a", "b"]);
        let b = attach(&mut arena, root, &m2, &["c"]);

        assert_eq!(arena.children(root), vec![a[0], a[1], b[0]]);
        assert_eq!(arena.child_at_index(root, 2), Some(b[0]));
        assert_eq!(arena.child_at_index(root, 3), None);
        assert_eq!(arena.child_named(root, "b"), Some(a[1]));
        assert_eq!(arena.position_of(b[0]), Some(2));
        assert_eq!(arena.index_path(b[0]), Some(vec![2]));
        assert_eq!(arena.manager_for_child(root, b[0]).map(|m| m.id()), Some(m2.id()));
        let mgr_ids: Vec<_> = arena.managers_of_children(root).iter().map(|m| m.id()).collect();
        assert_eq!(mgr_ids, vec![m1.id(), m2.id()]);
    }

    #[test]
    fn given_slot_replaced_outside_transaction_when_node_dropped_then_freed_with_subtree() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let m = manager();
        let first = attach(&mut arena, root, &m, &["a", "b"]);
        let grandchild = attach(&mut arena, first[0], &m, &["a1"]);

        arena.attach_children(root, &m, &[first[1]], &first).unwrap();

        assert!(!arena.contains(first[0]));
        assert!(!arena.contains(grandchild[0]));
        assert!(arena.contains(first[1]));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn given_transaction_when_rolled_back_then_arena_restored() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let m = manager();
        let kept = attach(&mut arena, root, &m, &["a"]);
        arena.set_attribute(kept[0], "x", Some(Value::from(1_i64))).unwrap();
        arena.take_events();

        arena.begin();
        let fresh = attach(&mut arena, root, &m, &["z"]);
        arena.set_attribute(kept[0], "x", Some(Value::from(2_i64))).unwrap();
        arena.rollback();

        assert_eq!(arena.children(root), kept);
        assert!(!arena.contains(fresh[0]));
        assert_eq!(arena.get_attribute(kept[0], "x"), Some(&Value::Int(1)));
        assert_eq!(arena.parent(kept[0]), Some(root));
        assert!(arena.take_events().is_empty());
    }

    #[test]
    fn given_transaction_when_committed_then_dropped_and_unused_nodes_freed() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let m = manager();
        let first = attach(&mut arena, root, &m, &["a"]);

        arena.begin();
        let stray = arena.insert_node(Some("never attached"));
        let second = attach(&mut arena, root, &m, &["b"]);
        // still alive until commit
        assert!(arena.contains(first[0]));
        arena.commit();

        assert!(!arena.contains(first[0]));
        assert!(!arena.contains(stray));
        assert_eq!(arena.children(root), second);
    }

    #[test]
    fn given_replacement_when_attaching_then_emits_deleted_inserted_changed() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let m = manager();
        let first = attach(&mut arena, root, &m, &["a", "b"]);
        arena.take_events();

        let c = arena.insert_node(Some("c"));
        arena
            .attach_children(root, &m, &[first[1], c], &first)
            .unwrap();

        assert_eq!(
            arena.take_events(),
            vec![
                TreeEvent::NodeDeleted { path: "0".into() },
                TreeEvent::NodeChanged(first[1]),
                TreeEvent::NodeInserted(c),
            ]
        );
    }

    #[test]
    fn given_tree_when_traversing_then_preorder_and_depth_match_structure() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let m = manager();
        let top = attach(&mut arena, root, &m, &["a", "b"]);
        let below = attach(&mut arena, top[0], &m, &["a1"]);

        let pre: Vec<NodeId> = arena.iter(root).map(|(id, _)| id).collect();
        assert_eq!(pre, vec![root, top[0], below[0], top[1]]);
        assert_eq!(arena.depth(), 3);
    }

    #[test]
    fn given_populated_slot_when_invalidating_then_children_hidden_but_kept_through_commit() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let m = manager();
        let top = attach(&mut arena, root, &m, &["a", "b"]);
        arena.take_events();

        arena.begin();
        arena.invalidate_slot(root, &m).unwrap();
        arena.commit();

        assert!(arena.children(root).is_empty());
        assert!(top.iter().all(|&id| arena.contains(id)));
        assert_eq!(arena.children_for_manager(root, m.id()), top.as_slice());
        assert_eq!(
            arena.take_events(),
            vec![
                TreeEvent::NodeDeleted { path: "0".into() },
                TreeEvent::NodeDeleted { path: "0".into() },
                TreeEvent::NodeHasChildToggled(root),
            ]
        );
    }

    #[test]
    fn given_seeded_slot_when_attaching_then_unreturned_seed_freed_and_reused_inserted() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let m = manager();
        let top = attach(&mut arena, root, &m, &["a", "b"]);
        arena.invalidate_slot(root, &m).unwrap();
        arena.take_events();

        let seed = arena.children_for_manager(root, m.id()).to_vec();
        arena.begin();
        arena.attach_children(root, &m, &[top[1]], &seed).unwrap();
        arena.commit();

        assert_eq!(arena.children(root), vec![top[1]]);
        assert!(!arena.contains(top[0]));
        assert_eq!(
            arena.take_events(),
            vec![
                TreeEvent::NodeInserted(top[1]),
                TreeEvent::NodeHasChildToggled(root),
            ]
        );
    }
}
