//! Subtree mutation observers.
//!
//! Watch childList changes under a root. Records queue up until the
//! owner drains them, matching the deferred delivery of browser
//! observers: the mutation is recorded synchronously, the reaction
//! happens later.

use std::collections::HashMap;

use tracing::debug;

use crate::NodeId;
use crate::events::MutationRecord;
use crate::tree::DomTree;

/// Observer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

#[derive(Debug)]
struct Observer {
    root: NodeId,
    subtree: bool,
    queue: Vec<MutationRecord>,
}

/// Registry of active observers
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    observers: HashMap<ObserverId, Observer>,
    next_id: u32,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing childList changes under `root`
    pub fn observe(&mut self, root: NodeId, subtree: bool) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.insert(
            id,
            Observer {
                root,
                subtree,
                queue: Vec::new(),
            },
        );
        debug!("observer {:?} watching {:?} (subtree: {})", id, root, subtree);
        id
    }

    /// Stop observing and drop any queued records
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    /// Route a mutation into every observer whose scope covers it.
    ///
    /// Must be called while `record.parent` is still linked where the
    /// mutation happened, so subtree scoping can see removal sites.
    pub fn record(&mut self, tree: &DomTree, record: MutationRecord) {
        for observer in self.observers.values_mut() {
            let in_scope = if observer.subtree {
                tree.in_subtree(observer.root, record.parent)
            } else {
                record.parent == observer.root
            };
            if in_scope {
                observer.queue.push(record);
            }
        }
    }

    /// Drain queued records for one observer
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(&id)
            .map(|o| std::mem::take(&mut o.queue))
            .unwrap_or_default()
    }

    pub fn has_pending(&self, id: ObserverId) -> bool {
        self.observers.get(&id).is_some_and(|o| !o.queue.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MutationKind;
    use crate::node::Node;

    fn tree_with_branch() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let form = tree.insert(Node::element("form"));
        let fieldset = tree.insert(Node::element("fieldset"));
        tree.append_child(NodeId::ROOT, form).unwrap();
        tree.append_child(form, fieldset).unwrap();
        (tree, form, fieldset)
    }

    #[test]
    fn test_subtree_scope_catches_nested_mutations() {
        let (mut tree, form, fieldset) = tree_with_branch();
        let mut observers = ObserverRegistry::new();
        let id = observers.observe(form, true);

        let input = tree.insert(Node::element("input"));
        tree.append_child(fieldset, input).unwrap();
        observers.record(&tree, MutationRecord::node_added(input, fieldset));

        let records = observers.take_records(id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MutationKind::Added);
        assert_eq!(records[0].node, input);
    }

    #[test]
    fn test_shallow_scope_ignores_nested_mutations() {
        let (mut tree, form, fieldset) = tree_with_branch();
        let mut observers = ObserverRegistry::new();
        let id = observers.observe(form, false);

        let input = tree.insert(Node::element("input"));
        tree.append_child(fieldset, input).unwrap();
        observers.record(&tree, MutationRecord::node_added(input, fieldset));

        assert!(observers.take_records(id).is_empty());
    }

    #[test]
    fn test_mutations_outside_scope_ignored() {
        let (mut tree, form, _) = tree_with_branch();
        let mut observers = ObserverRegistry::new();
        let id = observers.observe(form, true);

        let aside = tree.insert(Node::element("div"));
        tree.append_child(NodeId::ROOT, aside).unwrap();
        observers.record(&tree, MutationRecord::node_added(aside, NodeId::ROOT));

        assert!(observers.take_records(id).is_empty());
    }

    #[test]
    fn test_take_records_drains() {
        let (mut tree, form, fieldset) = tree_with_branch();
        let mut observers = ObserverRegistry::new();
        let id = observers.observe(form, true);

        let input = tree.insert(Node::element("input"));
        tree.append_child(fieldset, input).unwrap();
        observers.record(&tree, MutationRecord::node_added(input, fieldset));

        assert!(observers.has_pending(id));
        assert_eq!(observers.take_records(id).len(), 1);
        assert!(!observers.has_pending(id));
        assert!(observers.take_records(id).is_empty());
    }

    #[test]
    fn test_disconnect_stops_recording() {
        let (mut tree, form, fieldset) = tree_with_branch();
        let mut observers = ObserverRegistry::new();
        let id = observers.observe(form, true);
        assert!(observers.disconnect(id));

        let input = tree.insert(Node::element("input"));
        tree.append_child(fieldset, input).unwrap();
        observers.record(&tree, MutationRecord::node_added(input, fieldset));

        assert!(observers.take_records(id).is_empty());
        assert!(!observers.disconnect(id));
    }
}
