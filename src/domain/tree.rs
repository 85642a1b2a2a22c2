use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::domain::arena::NodeArena;
use crate::domain::dump::{dump, DumpOptions};
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::event::TreeEvent;
use crate::domain::manager::{compose, Recursion, TreeManager};
use crate::domain::node::NodeId;
use crate::domain::path::{format_index_path, format_name_path, parse_path, Segment};
use crate::domain::value::Value;

type Listener = Box<dyn FnMut(&TreeEvent) + Send>;

/// Lifecycle of a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// Freshly created or cleaned: the root has no children
    Empty,
    /// At least one update succeeded since creation or the last clean
    Populated,
}

/// A root node plus the top-level managers that populate it.
///
/// Every update runs inside an arena transaction: either it succeeds as a
/// whole, or the tree is left exactly as it was before the call.
pub struct Tree {
    nodes: NodeArena,
    managers: Vec<Arc<TreeManager>>,
    update_on_searching: bool,
    state: TreeState,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.nodes.root())
            .field("nodes", &self.nodes.len())
            .field(
                "managers",
                &self.managers.iter().map(|m| m.label()).collect::<Vec<_>>(),
            )
            .field("update_on_searching", &self.update_on_searching)
            .field("state", &self.state)
            .finish()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            managers: Vec::new(),
            update_on_searching: false,
            state: TreeState::Empty,
            listeners: Vec::new(),
        }
    }

    pub fn with_update_on_searching(mut self, enabled: bool) -> Self {
        self.update_on_searching = enabled;
        self
    }

    /// Appends a top-level manager, responsible for the root's children.
    pub fn add_manager(&mut self, manager: Arc<TreeManager>) {
        self.managers.push(manager);
    }

    pub fn managers(&self) -> &[Arc<TreeManager>] {
        &self.managers
    }

    pub fn root(&self) -> NodeId {
        self.nodes.root()
    }

    /// Read access to the node graph and its attributes.
    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    pub fn update_on_searching(&self) -> bool {
        self.update_on_searching
    }

    pub fn set_update_on_searching(&mut self, enabled: bool) {
        self.update_on_searching = enabled;
    }

    /// True when no top-level node has children.
    pub fn is_list(&self) -> bool {
        self.nodes
            .children(self.root())
            .into_iter()
            .all(|n| self.nodes.children(n).is_empty())
    }

    /// Registers a listener for events of committed updates.
    pub fn connect<F>(&mut self, listener: F)
    where
        F: FnMut(&TreeEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn flush_events(&mut self) {
        let events = self.nodes.take_events();
        for event in &events {
            for listener in self.listeners.iter_mut() {
                listener(event);
            }
        }
    }

    fn transaction<T>(&mut self, op: impl FnOnce(&mut Self) -> TreeResult<T>) -> TreeResult<T> {
        self.flush_events();
        self.nodes.begin();
        match op(self) {
            Ok(value) => {
                self.nodes.commit();
                self.flush_events();
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "tree update failed, rolling back");
                self.nodes.rollback();
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // updates
    // ------------------------------------------------------------------

    /// Rebuilds the whole tree under a new root.
    ///
    /// Each top-level manager is seeded with its slot on the old root, so
    /// nodes it keeps retain their identity across the swap.
    #[instrument(level = "debug", skip(self))]
    pub fn update_all(&mut self) -> TreeResult<()> {
        self.transaction(|tree| {
            let old_root = tree.nodes.root();
            let new_root = tree.nodes.insert_node(None);
            tree.nodes.copy_attributes(old_root, new_root);
            for manager in tree.managers.clone() {
                let previous = tree.nodes.children_for_manager(old_root, manager.id()).to_vec();
                compose(&manager, &mut tree.nodes, new_root, &previous, Recursion::Honor)?;
            }
            tree.nodes.set_root(new_root);
            Ok(())
        })?;
        self.state = TreeState::Populated;
        info!(nodes = self.nodes.len(), "tree updated");
        Ok(())
    }

    /// Re-runs the managers of `node`'s children, one level deep only.
    #[instrument(level = "debug", skip(self))]
    pub fn update_part(&mut self, node: NodeId) -> TreeResult<()> {
        self.refresh(node, Recursion::Disabled)
    }

    /// Like [`update_part`](Self::update_part); `None` designates the root.
    pub fn update_children(&mut self, node: Option<NodeId>) -> TreeResult<()> {
        let node = node.unwrap_or_else(|| self.root());
        self.refresh(node, Recursion::Disabled)
    }

    /// Refreshes `node`'s children and, following each manager's
    /// `recursive` flag, everything below them.
    #[instrument(level = "debug", skip(self))]
    pub fn update_subtree(&mut self, node: NodeId) -> TreeResult<()> {
        self.refresh(node, Recursion::Honor)
    }

    fn refresh(&mut self, node: NodeId, recursion: Recursion) -> TreeResult<()> {
        if !self.contains(node) {
            return Err(TreeError::StaleNode(node));
        }
        self.transaction(|tree| tree.run_level(node, recursion))?;
        self.state = TreeState::Populated;
        Ok(())
    }

    fn run_level(&mut self, node: NodeId, recursion: Recursion) -> TreeResult<()> {
        for manager in self.level_managers(node) {
            let previous = self.nodes.children_for_manager(node, manager.id()).to_vec();
            compose(&manager, &mut self.nodes, node, &previous, recursion)?;
        }
        Ok(())
    }

    /// Managers responsible for `node`'s children.
    ///
    /// The ones holding a slot on `node`; for a node without slots, the
    /// top-level managers (root) or the sub-managers of the manager that
    /// created it.
    fn level_managers(&self, node: NodeId) -> Vec<Arc<TreeManager>> {
        let managers = self.nodes.managers_of_children(node);
        if !managers.is_empty() {
            return managers;
        }
        if node == self.root() {
            return self.managers.clone();
        }
        self.get_node_manager(node)
            .map(|m| m.managers().to_vec())
            .unwrap_or_default()
    }

    /// Replaces the root by an empty node keeping the root's own attributes.
    #[instrument(level = "debug", skip(self))]
    pub fn clean(&mut self) {
        self.flush_events();
        let old_root = self.nodes.root();
        let new_root = self.nodes.insert_node(None);
        self.nodes.copy_attributes(old_root, new_root);
        self.nodes.set_root(new_root);
        self.nodes.take_events();
        self.state = TreeState::Empty;
        debug!(nodes = self.nodes.len(), "tree cleaned");
    }

    // ------------------------------------------------------------------
    // attributes
    // ------------------------------------------------------------------

    /// Sets an attribute on the root, visible to every node through fetch.
    ///
    /// Returns whether the root changed. Root changes raise no event.
    pub fn set_attribute(&mut self, name: &str, value: Option<Value>) -> TreeResult<bool> {
        let root = self.root();
        self.set_node_attribute(root, name, value)
    }

    pub fn set_node_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<Value>,
    ) -> TreeResult<bool> {
        let changed = self.nodes.set_attribute(node, name, value)?;
        self.flush_events();
        Ok(changed)
    }

    // ------------------------------------------------------------------
    // lookup
    // ------------------------------------------------------------------

    /// True when `node` hangs below the current root (or is the root).
    pub fn contains(&self, node: NodeId) -> bool {
        if !self.nodes.contains(node) {
            return false;
        }
        let mut current = node;
        while let Some(parent) = self.nodes.parent(current) {
            match self.nodes.get_node(parent) {
                Some(p) if p.has_child(current) => current = parent,
                _ => return false,
            }
        }
        current == self.root()
    }

    /// Children of the node at `path`; the root's children for `None` or an
    /// empty path, nothing when the path leads nowhere.
    #[instrument(level = "debug", skip(self))]
    pub fn get_nodes_in_path(&mut self, path: Option<&str>, use_names: bool) -> TreeResult<Vec<NodeId>> {
        let segments = match path {
            Some(p) => parse_path(p, use_names)?,
            None => Vec::new(),
        };
        let target = match self.resolve(&segments)? {
            Some(node) => node,
            None => return Ok(Vec::new()),
        };
        if self.update_on_searching {
            self.ensure_populated(target)?;
        }
        Ok(self.nodes.children(target))
    }

    /// The node at `path`, populating levels on the way when
    /// `update_on_searching` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn get_node(&mut self, path: &str, use_names: bool) -> TreeResult<Option<NodeId>> {
        let segments = parse_path(path, use_names)?;
        if segments.is_empty() {
            return Ok(None);
        }
        self.resolve(&segments)
    }

    /// Read-only lookup: never runs a manager.
    pub fn find_node(&self, path: &str, use_names: bool) -> TreeResult<Option<NodeId>> {
        let segments = parse_path(path, use_names)?;
        if segments.is_empty() {
            return Ok(None);
        }
        let mut current = self.root();
        for segment in &segments {
            match self.match_segment(current, segment) {
                Some(node) => current = node,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn resolve(&mut self, segments: &[Segment]) -> TreeResult<Option<NodeId>> {
        let mut current = self.root();
        for segment in segments {
            if !self.update_on_searching {
                match self.match_segment(current, segment) {
                    Some(node) => current = node,
                    None => return Ok(None),
                }
                continue;
            }

            let refreshed = self.ensure_populated(current)?;
            let found = match self.match_segment(current, segment) {
                Some(node) => Some(node),
                // single retry; a level refreshed just above already had its run
                None if !refreshed => {
                    self.update_part(current)?;
                    self.match_segment(current, segment)
                }
                None => None,
            };
            match found {
                Some(node) => current = node,
                None => {
                    debug!(?segment, "path segment not found");
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }

    /// Runs `node`'s level once if it was never populated.
    fn ensure_populated(&mut self, node: NodeId) -> TreeResult<bool> {
        if self.level_managers(node).is_empty() {
            return Ok(false);
        }
        let populated = self
            .nodes
            .get_node(node)
            .map(|n| !n.slots.is_empty() && n.slots.iter().all(|s| s.populated))
            .unwrap_or(false);
        if populated {
            return Ok(false);
        }
        self.update_part(node)?;
        Ok(true)
    }

    fn match_segment(&self, node: NodeId, segment: &Segment) -> Option<NodeId> {
        match segment {
            Segment::Name(name) => self.nodes.child_named(node, name),
            Segment::Index(i) => self.nodes.child_at_index(node, *i),
        }
    }

    /// Index path (`"0:2"`) of `node`; None for the root or a node outside
    /// the tree.
    pub fn get_node_path(&self, node: NodeId) -> Option<String> {
        if node == self.root() || !self.contains(node) {
            return None;
        }
        self.nodes
            .index_path(node)
            .map(|positions| format_index_path(&positions))
    }

    /// Name path (`"/a/b"`) of `node`; None for the root, a node outside the
    /// tree, or when some node on the way is unnamed.
    pub fn get_node_name_path(&self, node: NodeId) -> Option<String> {
        if node == self.root() || !self.contains(node) {
            return None;
        }
        let mut names = Vec::new();
        let mut current = node;
        while current != self.root() {
            names.push(self.nodes.name(current)?.to_string());
            current = self.nodes.parent(current)?;
        }
        names.reverse();
        Some(format_name_path(&names))
    }

    /// The manager whose slot holds `node`.
    pub fn get_node_manager(&self, node: NodeId) -> Option<Arc<TreeManager>> {
        let parent = self.nodes.parent(node)?;
        self.nodes.manager_for_child(parent, node)
    }

    /// Diagnostic dump below `node` (the root when `None`).
    pub fn dump(&self, node: Option<NodeId>, options: DumpOptions) -> String {
        dump(&self.nodes, node.unwrap_or_else(|| self.root()), options)
    }
}
