//! Tree managers: strategies producing the children of a node, and the
//! composition step that attaches their output and drives sub-managers.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::arena::NodeArena;
use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::NodeId;
use crate::domain::providers::FnProvider;
use crate::domain::value::Value;

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`TreeManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManagerId(u64);

impl ManagerId {
    fn next() -> Self {
        Self(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Produces or refreshes one manager's slice of a node's children.
///
/// `existing` is this manager's own previous output for `node`. An entity
/// that is still present must be returned as the *same* [`NodeId`] found in
/// `existing`, so attributes and sub-results attached to it survive the
/// update. New entities are created through [`UpdateContext::create_node`].
/// The order of the returned list becomes the slot order.
///
/// `node` is `None` only for a standalone listing
/// ([`TreeManager::list_standalone`]).
pub trait ChildrenProvider: Send + Sync {
    fn update_children(
        &self,
        ctx: &mut UpdateContext<'_>,
        node: Option<NodeId>,
        existing: &[NodeId],
    ) -> TreeResult<Vec<NodeId>>;
}

/// Custom node construction hook, see [`ManagerBuilder::node_create_func`].
pub type NodeFactory =
    Arc<dyn Fn(&mut NodeArena, Option<NodeId>, Option<&str>) -> NodeId + Send + Sync>;

/// Whether [`compose`] descends into sub-managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    /// Follow each manager's own `recursive` flag
    Honor,
    /// Run only the given manager; sub-managers are registered, not run
    Disabled,
}

/// Shared, immutable description of one kind of children.
///
/// Managers are built once through [`ManagerBuilder`] and shared with `Arc`
/// across parents and trees.
pub struct TreeManager {
    id: ManagerId,
    label: String,
    provider: Box<dyn ChildrenProvider>,
    sub_managers: Vec<Arc<TreeManager>>,
    recursive: bool,
    node_factory: Option<NodeFactory>,
    new_node_attributes: Vec<(String, Option<Value>)>,
}

impl fmt::Debug for TreeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeManager")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("recursive", &self.recursive)
            .field(
                "sub_managers",
                &self.sub_managers.iter().map(|m| m.id).collect::<Vec<_>>(),
            )
            .field("custom_factory", &self.node_factory.is_some())
            .finish()
    }
}

impl TreeManager {
    pub fn builder(provider: impl ChildrenProvider + 'static) -> ManagerBuilder {
        ManagerBuilder::new(Box::new(provider))
    }

    /// Manager backed by a closure with the `update_children` signature.
    pub fn with_func<F>(func: F) -> Arc<TreeManager>
    where
        F: Fn(&mut UpdateContext<'_>, Option<NodeId>, &[NodeId]) -> TreeResult<Vec<NodeId>>
            + Send
            + Sync
            + 'static,
    {
        Self::builder(FnProvider::new(func)).build()
    }

    pub fn id(&self) -> ManagerId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Sub-managers in registration order.
    pub fn managers(&self) -> &[Arc<TreeManager>] {
        &self.sub_managers
    }

    /// The custom node factory, None when the default one is used.
    pub fn node_create_func(&self) -> Option<&NodeFactory> {
        self.node_factory.as_ref()
    }

    pub fn new_node_attributes(&self) -> &[(String, Option<Value>)] {
        &self.new_node_attributes
    }

    /// Creates a node through the configured factory and applies the
    /// manager's new-node attributes. The node is not attached anywhere.
    pub fn create_node(
        &self,
        arena: &mut NodeArena,
        parent: Option<NodeId>,
        name: Option<&str>,
    ) -> TreeResult<NodeId> {
        let id = match &self.node_factory {
            Some(factory) => factory(arena, parent, name),
            None => arena.insert_node(name),
        };
        for (attribute, value) in &self.new_node_attributes {
            arena.set_attribute(id, attribute, value.clone())?;
        }
        Ok(id)
    }

    /// Runs the provider without a parent node; nothing is attached.
    #[instrument(level = "debug", skip(self, arena), fields(manager = %self.label))]
    pub fn list_standalone(&self, arena: &mut NodeArena) -> TreeResult<Vec<NodeId>> {
        let mut ctx = UpdateContext::new(arena, self);
        self.provider.update_children(&mut ctx, None, &[])
    }
}

/// Builder for [`TreeManager`]; the manager is frozen by [`build`](Self::build).
pub struct ManagerBuilder {
    label: Option<String>,
    provider: Box<dyn ChildrenProvider>,
    sub_managers: Vec<Arc<TreeManager>>,
    recursive: bool,
    node_factory: Option<NodeFactory>,
    new_node_attributes: Vec<(String, Option<Value>)>,
}

impl ManagerBuilder {
    fn new(provider: Box<dyn ChildrenProvider>) -> Self {
        Self {
            label: None,
            provider,
            sub_managers: Vec::new(),
            recursive: true,
            node_factory: None,
            new_node_attributes: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Appends a sub-manager, run against every node this manager produces.
    ///
    /// The same manager may be added under several parents or trees.
    pub fn add_manager(mut self, sub: Arc<TreeManager>) -> Self {
        self.sub_managers.push(sub);
        self
    }

    pub fn node_create_func<F>(mut self, factory: F) -> Self
    where
        F: Fn(&mut NodeArena, Option<NodeId>, Option<&str>) -> NodeId + Send + Sync + 'static,
    {
        self.node_factory = Some(Arc::new(factory));
        self
    }

    /// Attribute set on every node created by the manager; `None` unsets it.
    pub fn new_node_attribute(mut self, name: impl Into<String>, value: Option<Value>) -> Self {
        let name = name.into();
        match self.new_node_attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.new_node_attributes.push((name, value)),
        }
        self
    }

    pub fn build(self) -> Arc<TreeManager> {
        let id = ManagerId::next();
        Arc::new(TreeManager {
            id,
            label: self.label.unwrap_or_else(|| format!("manager-{}", id.0)),
            provider: self.provider,
            sub_managers: self.sub_managers,
            recursive: self.recursive,
            node_factory: self.node_factory,
            new_node_attributes: self.new_node_attributes,
        })
    }
}

/// The view of the tree handed to a [`ChildrenProvider`].
pub struct UpdateContext<'a> {
    arena: &'a mut NodeArena,
    manager: &'a TreeManager,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(arena: &'a mut NodeArena, manager: &'a TreeManager) -> Self {
        Self { arena, manager }
    }

    pub fn manager(&self) -> &TreeManager {
        self.manager
    }

    pub fn nodes(&self) -> &NodeArena {
        self.arena
    }

    pub fn create_node(&mut self, parent: Option<NodeId>, name: Option<&str>) -> TreeResult<NodeId> {
        self.manager.create_node(self.arena, parent, name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<Value>) -> TreeResult<bool> {
        self.arena.set_attribute(id, name, value)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.arena.get_attribute(id, name)
    }

    pub fn fetch_attribute(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.arena.fetch_attribute(id, name)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.arena.name(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.parent(id)
    }

    /// Reconciliation helper: the node of `existing` named `name`.
    pub fn find_named(&self, existing: &[NodeId], name: &str) -> Option<NodeId> {
        existing
            .iter()
            .copied()
            .find(|&id| self.arena.name(id) == Some(name))
    }

    /// Reconciliation helper: the node of `existing` whose `attribute` equals `value`.
    pub fn find_by_attribute(&self, existing: &[NodeId], attribute: &str, value: &Value) -> Option<NodeId> {
        existing
            .iter()
            .copied()
            .find(|&id| self.arena.get_attribute(id, attribute) == Some(value))
    }
}

/// Runs `manager` for `node`, attaches its output as the manager's slot and
/// drives the sub-managers against every returned child.
///
/// The first error aborts the call; nothing of the failing level is
/// attached. Rolling back shallower levels is the caller's transaction.
#[instrument(level = "debug", skip(manager, arena, existing), fields(manager = %manager.label))]
pub fn compose(
    manager: &Arc<TreeManager>,
    arena: &mut NodeArena,
    node: NodeId,
    existing: &[NodeId],
    recursion: Recursion,
) -> TreeResult<Vec<NodeId>> {
    if !arena.contains(node) {
        return Err(TreeError::StaleNode(node));
    }
    let children = {
        let mut ctx = UpdateContext::new(arena, manager);
        manager.provider.update_children(&mut ctx, Some(node), existing)?
    };
    validate_children(manager, arena, &children, existing)?;
    arena.attach_children(node, manager, &children, existing)?;
    debug!(node = %node, count = children.len(), "attached children");

    let descend = recursion == Recursion::Honor && manager.recursive;
    for &child in &children {
        for sub in &manager.sub_managers {
            if descend {
                let previous = arena.children_for_manager(child, sub.id).to_vec();
                compose(sub, arena, child, &previous, Recursion::Honor)?;
            } else {
                trace!(child = %child, sub = %sub.label, "invalidating sub-manager slot");
                arena.invalidate_slot(child, sub)?;
            }
        }
    }
    Ok(children)
}

/// Every returned node must be live, unique, and either fresh or reused
/// from `existing`.
fn validate_children(
    manager: &TreeManager,
    arena: &NodeArena,
    children: &[NodeId],
    existing: &[NodeId],
) -> TreeResult<()> {
    let mut seen = HashSet::with_capacity(children.len());
    for &child in children {
        if !arena.contains(child) {
            return Err(TreeError::Manager(format!(
                "{} returned node {} which does not exist",
                manager.label, child
            )));
        }
        if !seen.insert(child) {
            return Err(TreeError::Manager(format!(
                "{} returned node {} twice",
                manager.label, child
            )));
        }
        if !existing.contains(&child) && arena.is_attached(child) {
            return Err(TreeError::Manager(format!(
                "{} returned node {} owned elsewhere in the tree",
                manager.label, child
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::providers::{LabelProvider, NamesProvider};

    #[test]
    fn given_recursive_manager_when_composing_then_sub_managers_run_for_each_child() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let columns = TreeManager::builder(NamesProvider::new(["id", "name"])).build();
        let tables = TreeManager::builder(NamesProvider::new(["orders", "users"]))
            .add_manager(Arc::clone(&columns))
            .build();

        let out = compose(&tables, &mut arena, root, &[], Recursion::Honor).unwrap();

        assert_eq!(out.len(), 2);
        for table in out {
            let cols: Vec<_> = arena
                .children(table)
                .into_iter()
                .map(|c| arena.name(c).unwrap().to_string())
                .collect();
            assert_eq!(cols, vec!["id", "name"]);
        }
    }

    #[test]
    fn given_non_recursive_manager_when_composing_then_sub_slot_registered_but_empty() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let sub = TreeManager::builder(NamesProvider::new(["x"])).build();
        let top = TreeManager::builder(LabelProvider::new("top"))
            .recursive(false)
            .add_manager(Arc::clone(&sub))
            .build();

        let out = compose(&top, &mut arena, root, &[], Recursion::Honor).unwrap();

        let slot = arena.slot(out[0], sub.id()).unwrap();
        assert!(slot.nodes.is_empty());
        assert!(!slot.populated);
        assert_eq!(arena.managers_of_children(out[0])[0].id(), sub.id());
    }

    #[test]
    fn given_disabled_recursion_when_composing_then_sub_slot_hidden_and_reused_on_next_run() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let sub = TreeManager::builder(NamesProvider::new(["x"])).build();
        let top = TreeManager::builder(LabelProvider::new("top"))
            .add_manager(Arc::clone(&sub))
            .build();
        let first = compose(&top, &mut arena, root, &[], Recursion::Honor).unwrap();
        let grandchild = arena.children(first[0]);

        let previous = arena.children_for_manager(root, top.id()).to_vec();
        let second = compose(&top, &mut arena, root, &previous, Recursion::Disabled).unwrap();

        assert_eq!(first, second);
        assert!(arena.children(second[0]).is_empty());
        let slot = arena.slot(second[0], sub.id()).unwrap();
        assert!(!slot.populated);
        assert_eq!(slot.seed, grandchild);
        assert!(arena.contains(grandchild[0]));

        let seed = arena.children_for_manager(second[0], sub.id()).to_vec();
        compose(&sub, &mut arena, second[0], &seed, Recursion::Honor).unwrap();
        assert_eq!(arena.children(second[0]), grandchild);
    }

    #[test]
    fn given_failing_sub_manager_when_composing_then_error_propagates() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let failing = TreeManager::with_func(|_, _, _| Err(TreeError::manager("boom")));
        let top = TreeManager::builder(NamesProvider::new(["a", "b"]))
            .add_manager(failing)
            .build();

        let err = compose(&top, &mut arena, root, &[], Recursion::Honor).unwrap_err();
        assert_eq!(err, TreeError::Manager("boom".into()));
    }

    #[test]
    fn given_manager_returning_foreign_node_when_composing_then_contract_error() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let owner = TreeManager::builder(LabelProvider::new("owned")).build();
        let owned = compose(&owner, &mut arena, root, &[], Recursion::Honor).unwrap()[0];

        let thief = TreeManager::with_func(move |_, _, _| Ok(vec![owned]));
        let err = compose(&thief, &mut arena, root, &[], Recursion::Honor).unwrap_err();
        assert!(matches!(err, TreeError::Manager(msg) if msg.contains("owned elsewhere")));
    }

    #[test]
    fn given_new_node_attributes_and_factory_when_creating_then_both_applied() {
        let mut arena = NodeArena::new();
        let mgr = TreeManager::builder(LabelProvider::new("tables"))
            .node_create_func(|arena, _parent, name| {
                let id = arena.insert_node(name);
                arena
                    .set_attribute(id, "kind", Some(Value::from("custom")))
                    .ok();
                id
            })
            .new_node_attribute("icon", Some(Value::from("table")))
            .new_node_attribute("icon", Some(Value::from("folder")))
            .build();

        assert!(mgr.node_create_func().is_some());
        let id = mgr.create_node(&mut arena, None, Some("n")).unwrap();
        assert_eq!(arena.name(id), Some("n"));
        assert_eq!(arena.get_attribute(id, "kind"), Some(&Value::from("custom")));
        assert_eq!(arena.get_attribute(id, "icon"), Some(&Value::from("folder")));
    }

    #[test]
    fn given_standalone_listing_when_run_then_nodes_unattached() {
        let mut arena = NodeArena::new();
        let mgr = TreeManager::builder(NamesProvider::new(["a", "b"])).build();
        let nodes = mgr.list_standalone(&mut arena).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|&n| arena.parent(n).is_none()));
        assert!(arena.children(arena.root()).is_empty());
    }
}
