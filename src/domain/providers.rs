//! Built-in children providers that need no external data source.

use std::fmt;

use crate::domain::error::TreeResult;
use crate::domain::manager::{ChildrenProvider, UpdateContext};
use crate::domain::node::NodeId;

type UpdateFn = dyn Fn(&mut UpdateContext<'_>, Option<NodeId>, &[NodeId]) -> TreeResult<Vec<NodeId>>
    + Send
    + Sync;

/// Provider delegating to a closure.
pub struct FnProvider {
    func: Box<UpdateFn>,
}

impl FnProvider {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut UpdateContext<'_>, Option<NodeId>, &[NodeId]) -> TreeResult<Vec<NodeId>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnProvider")
    }
}

impl ChildrenProvider for FnProvider {
    fn update_children(
        &self,
        ctx: &mut UpdateContext<'_>,
        node: Option<NodeId>,
        existing: &[NodeId],
    ) -> TreeResult<Vec<NodeId>> {
        (self.func)(ctx, node, existing)
    }
}

/// A single node carrying a fixed label.
///
/// The label node is reused across updates.
#[derive(Debug, Clone)]
pub struct LabelProvider {
    label: String,
}

impl LabelProvider {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ChildrenProvider for LabelProvider {
    fn update_children(
        &self,
        ctx: &mut UpdateContext<'_>,
        node: Option<NodeId>,
        existing: &[NodeId],
    ) -> TreeResult<Vec<NodeId>> {
        let id = match ctx.find_named(existing, &self.label) {
            Some(id) => id,
            None => ctx.create_node(node, Some(&self.label))?,
        };
        Ok(vec![id])
    }
}

/// One node per configured name, reconciled by name.
#[derive(Debug, Clone)]
pub struct NamesProvider {
    names: Vec<String>,
}

impl NamesProvider {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ChildrenProvider for NamesProvider {
    fn update_children(
        &self,
        ctx: &mut UpdateContext<'_>,
        node: Option<NodeId>,
        existing: &[NodeId],
    ) -> TreeResult<Vec<NodeId>> {
        // each existing node is matched at most once, so repeated names map
        // onto distinct nodes in order
        let mut unclaimed = existing.to_vec();
        let mut out = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let id = match ctx.find_named(&unclaimed, name) {
                Some(id) => {
                    unclaimed.retain(|&n| n != id);
                    id
                }
                None => ctx.create_node(node, Some(name))?,
            };
            out.push(id);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::NodeArena;
    use crate::domain::manager::{compose, Recursion, TreeManager};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn given_label_when_updated_twice_then_same_node_returned() {
        let mut arena = NodeArena::new();
        let root = arena.root();
        let mgr = TreeManager::builder(LabelProvider::new("Tables")).build();

        let first = compose(&mgr, &mut arena, root, &[], Recursion::Honor).unwrap();
        let previous = arena.children_for_manager(root, mgr.id()).to_vec();
        let second = compose(&mgr, &mut arena, root, &previous, Recursion::Honor).unwrap();

        assert_eq!(first, second);
        assert_eq!(arena.name(first[0]), Some("Tables"));
    }

    #[test]
    fn given_names_when_list_changes_then_survivors_keep_identity() {
        let calls = AtomicUsize::new(0);
        let mgr = TreeManager::with_func(move |ctx, node, existing| {
            let names = match calls.fetch_add(1, Ordering::SeqCst) {
                0 => vec!["a", "b"],
                _ => vec!["b", "c"],
            };
            NamesProvider::new(names).update_children(ctx, node, existing)
        });
        let mut arena = NodeArena::new();
        let root = arena.root();

        let first = compose(&mgr, &mut arena, root, &[], Recursion::Honor).unwrap();
        let second = compose(&mgr, &mut arena, root, &first, Recursion::Honor).unwrap();

        assert_eq!(second[0], first[1]);
        assert_eq!(arena.name(second[1]), Some("c"));
        assert!(!arena.contains(first[0]));
        assert_eq!(arena.children(root), second);
    }

    #[test]
    fn given_duplicate_names_when_refreshing_twice_then_each_node_kept() {
        let mgr = TreeManager::builder(NamesProvider::new(["a", "a", "b"])).build();
        let mut arena = NodeArena::new();
        let root = arena.root();

        let first = compose(&mgr, &mut arena, root, &[], Recursion::Honor).unwrap();
        let previous = arena.children_for_manager(root, mgr.id()).to_vec();
        let second = compose(&mgr, &mut arena, root, &previous, Recursion::Honor).unwrap();
        let previous = arena.children_for_manager(root, mgr.id()).to_vec();
        let third = compose(&mgr, &mut arena, root, &previous, Recursion::Honor).unwrap();

        assert_eq!(first.len(), 3);
        assert_ne!(first[0], first[1]);
        assert_eq!(second, first);
        assert_eq!(third, first);
    }
}
