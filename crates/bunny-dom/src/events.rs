//! Change and mutation events.
//!
//! Plain data records. The document queues them; embedders and the
//! form layer route them onward.

use crate::NodeId;

/// A change on a form control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub target: NodeId,
    /// True when the change came from user interaction, false when a
    /// script synthesized it
    pub trusted: bool,
}

impl ChangeEvent {
    /// Create a user-originated change
    pub fn user(target: NodeId) -> Self {
        Self {
            target,
            trusted: true,
        }
    }

    /// Create a script-originated change
    pub fn synthetic(target: NodeId) -> Self {
        Self {
            target,
            trusted: false,
        }
    }
}

/// Kind of childList mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Added,
    Removed,
}

/// One childList mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// The node that was attached or detached
    pub node: NodeId,
    /// Parent it was attached to or detached from
    pub parent: NodeId,
}

impl MutationRecord {
    /// Create a node added record
    pub fn node_added(node: NodeId, parent: NodeId) -> Self {
        Self {
            kind: MutationKind::Added,
            node,
            parent,
        }
    }

    /// Create a node removed record
    pub fn node_removed(node: NodeId, parent: NodeId) -> Self {
        Self {
            kind: MutationKind::Removed,
            node,
            parent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_event_trust() {
        assert!(ChangeEvent::user(NodeId(3)).trusted);
        assert!(!ChangeEvent::synthetic(NodeId(3)).trusted);
    }

    #[test]
    fn test_mutation_records() {
        let added = MutationRecord::node_added(NodeId(5), NodeId(1));
        assert_eq!(added.kind, MutationKind::Added);
        assert_eq!(added.node, NodeId(5));
        assert_eq!(added.parent, NodeId(1));

        let removed = MutationRecord::node_removed(NodeId(5), NodeId(1));
        assert_eq!(removed.kind, MutationKind::Removed);
    }
}
