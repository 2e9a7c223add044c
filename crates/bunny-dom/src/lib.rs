//! Bunny DOM - Document Object Model
//!
//! Memory-efficient DOM tree implementation, scoped to what form
//! binding needs: elements with live control state, childList
//! mutation observers and change events.

mod control;
mod document;
mod events;
mod node;
mod observer;
mod tree;

pub use control::{ControlState, is_control_tag};
pub use document::Document;
pub use events::{ChangeEvent, MutationKind, MutationRecord};
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use observer::{ObserverId, ObserverRegistry};
pub use tree::DomTree;

use thiserror::Error;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for absent links
    pub(crate) const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub(crate) fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// DOM manipulation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node not found")]
    NotFound,

    #[error("node cannot be a child of this parent")]
    HierarchyRequest,

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("node is not a control of the required kind")]
    InvalidNodeType,
}
