//! Per-tree attribute table keyed by node identity.

use std::collections::{BTreeMap, HashMap};

use tracing::instrument;

use crate::domain::node::NodeId;
use crate::domain::value::Value;

/// Maps `(node, attribute name)` to a value.
///
/// An absent value is equivalent to the attribute not being set.
#[derive(Debug, Default, Clone)]
pub struct AttributeStore {
    entries: HashMap<NodeId, BTreeMap<String, Value>>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or removes, when `value` is `None`) an attribute.
    ///
    /// Setting a value equal to the current one, or removing an attribute
    /// that is not set, leaves the store untouched.
    #[instrument(level = "trace", skip(self, value))]
    pub fn set(&mut self, node: NodeId, name: &str, value: Option<Value>) -> Change {
        let current = self.get(node, name);
        match (&value, current) {
            (None, None) => return Change::Unchanged,
            (Some(new), Some(old)) if new == old => return Change::Unchanged,
            _ => {}
        }

        let previous = match value {
            Some(v) => self
                .entries
                .entry(node)
                .or_default()
                .insert(name.to_string(), v),
            None => {
                let attrs = self.entries.get_mut(&node);
                let previous = attrs.and_then(|a| a.remove(name));
                if self.entries.get(&node).is_some_and(|a| a.is_empty()) {
                    self.entries.remove(&node);
                }
                previous
            }
        };
        Change::Changed { previous }
    }

    pub fn get(&self, node: NodeId, name: &str) -> Option<&Value> {
        self.entries.get(&node).and_then(|attrs| attrs.get(name))
    }

    /// Looks `name` up on `node`, then on its ancestors.
    ///
    /// `parent_of` supplies the parent relation; the walk stops after the
    /// first node without a parent.
    pub fn fetch<F>(&self, node: NodeId, name: &str, parent_of: F) -> Option<&Value>
    where
        F: Fn(NodeId) -> Option<NodeId>,
    {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(value) = self.get(id, name) {
                return Some(value);
            }
            current = parent_of(id);
        }
        None
    }

    /// All attributes set directly on `node`, sorted by name.
    pub fn attributes_of(&self, node: NodeId) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .get(&node)
            .into_iter()
            .flat_map(|attrs| attrs.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Drops every attribute of a freed node.
    pub fn remove_node(&mut self, node: NodeId) {
        self.entries.remove(&node);
    }

    pub fn has_attributes(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }
}

/// Outcome of [`AttributeStore::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Unchanged,
    Changed { previous: Option<Value> },
}

impl Change {
    pub fn is_changed(&self) -> bool {
        matches!(self, Change::Changed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Index;

    fn id(n: usize) -> NodeId {
        NodeId(Index::from_raw_parts(n, 0))
    }

    #[test]
    fn given_absent_value_and_no_attribute_when_set_then_noop() {
        let mut store = AttributeStore::new();
        assert_eq!(store.set(id(1), "x", None), Change::Unchanged);
        assert!(!store.has_attributes(id(1)));
    }

    #[test]
    fn given_equal_value_when_set_twice_then_second_is_noop() {
        let mut store = AttributeStore::new();
        assert!(store.set(id(1), "x", Some(Value::from("a"))).is_changed());
        assert_eq!(store.set(id(1), "x", Some(Value::from("a"))), Change::Unchanged);
        assert_eq!(store.get(id(1), "x"), Some(&Value::from("a")));
    }

    #[test]
    fn given_attribute_when_set_to_none_then_removed_and_previous_returned() {
        let mut store = AttributeStore::new();
        store.set(id(1), "x", Some(Value::from(3_i64)));
        let change = store.set(id(1), "x", None);
        assert_eq!(
            change,
            Change::Changed {
                previous: Some(Value::Int(3))
            }
        );
        assert_eq!(store.get(id(1), "x"), None);
        assert!(!store.has_attributes(id(1)));
    }

    #[test]
    fn given_chain_when_fetch_then_nearest_ancestor_wins() {
        // 3 -> 2 -> 1 (root)
        let parent_of = |n: NodeId| match n.0.into_raw_parts().0 {
            3 => Some(id(2)),
            2 => Some(id(1)),
            _ => None,
        };
        let mut store = AttributeStore::new();
        store.set(id(1), "schema", Some(Value::from("public")));
        store.set(id(2), "schema", Some(Value::from("sales")));

        assert_eq!(
            store.fetch(id(3), "schema", parent_of),
            Some(&Value::from("sales"))
        );
        assert_eq!(
            store.fetch(id(1), "schema", parent_of),
            Some(&Value::from("public"))
        );
        assert_eq!(store.fetch(id(3), "table", parent_of), None);
        // get never climbs
        assert_eq!(store.get(id(3), "schema"), None);
    }
}
