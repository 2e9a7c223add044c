//! DOM Tree (arena-based allocation)

use crate::node::{Node, NodeData};
use crate::{DomError, NodeId};

/// Arena-based DOM tree for memory efficiency.
///
/// Nodes are never freed; removal only unlinks, so a detached subtree
/// stays readable until the whole tree is dropped.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding just the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a detached node to the arena
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A child that is already linked somewhere is detached from its
    /// old position first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.get(parent).ok_or(DomError::NotFound)?;
        let child_node = self.get(child).ok_or(DomError::NotFound)?;
        if matches!(child_node.data, NodeData::Document) {
            return Err(DomError::HierarchyRequest);
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }

        self.detach(child);

        let last = self.nodes[parent.0 as usize].last_child;
        if last.is_some() {
            self.nodes[last.0 as usize].next_sibling = child;
            self.nodes[child.0 as usize].prev_sibling = last;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
        self.nodes[child.0 as usize].parent = parent;
        Ok(())
    }

    /// Unlink `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.get(parent).ok_or(DomError::NotFound)?;
        if self.get(child).ok_or(DomError::NotFound)?.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    /// Unlink a node from wherever it sits. Detached nodes keep their
    /// own subtree.
    pub(crate) fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.0 as usize];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if parent.is_none() {
            return;
        }

        if prev.is_some() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_some() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }

        let node = &mut self.nodes[id.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// True when `ancestor` sits somewhere above `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = match self.get(node) {
            Some(n) => n.parent,
            None => return false,
        };
        while current.is_some() {
            if current == ancestor {
                return true;
            }
            current = self.nodes[current.0 as usize].parent;
        }
        false
    }

    /// True when `node` is `root` or sits inside its subtree
    pub fn in_subtree(&self, root: NodeId, node: NodeId) -> bool {
        node == root || self.is_ancestor(root, node)
    }

    /// Iterate the direct children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Preorder walk of a subtree, including `root` itself
    pub fn subtree(&self, root: NodeId) -> SubtreeIter<'_> {
        SubtreeIter {
            tree: self,
            stack: if self.get(root).is_some() {
                vec![root]
            } else {
                Vec::new()
            },
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChildIter<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

pub struct SubtreeIter<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for SubtreeIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Push children in reverse so the walk stays in document order
        let mut child = self.tree.get(id)?.last_child;
        while child.is_some() {
            self.stack.push(child);
            child = self.tree.nodes[child.0 as usize].prev_sibling;
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_document_root() {
        let tree = DomTree::new();
        assert_eq!(tree.len(), 1);
        assert!(matches!(
            tree.get(NodeId::ROOT).unwrap().data,
            NodeData::Document
        ));
    }

    #[test]
    fn test_append_links_siblings() {
        let mut tree = DomTree::new();
        let a = tree.insert(Node::element("div"));
        let b = tree.insert(Node::element("span"));
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(NodeId::ROOT, b).unwrap();

        let children: Vec<NodeId> = tree.children(NodeId::ROOT).map(|(id, _)| id).collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(tree.get(a).unwrap().next_sibling, b);
        assert_eq!(tree.get(b).unwrap().prev_sibling, a);
    }

    #[test]
    fn test_remove_child_unlinks() {
        let mut tree = DomTree::new();
        let a = tree.insert(Node::element("div"));
        let b = tree.insert(Node::element("span"));
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(NodeId::ROOT, b).unwrap();

        tree.remove_child(NodeId::ROOT, a).unwrap();

        let children: Vec<NodeId> = tree.children(NodeId::ROOT).map(|(id, _)| id).collect();
        assert_eq!(children, vec![b]);
        assert!(tree.get(a).unwrap().parent.is_none());
    }

    #[test]
    fn test_remove_requires_parenthood() {
        let mut tree = DomTree::new();
        let a = tree.insert(Node::element("div"));
        let b = tree.insert(Node::element("span"));
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(a, b).unwrap();

        assert_eq!(
            tree.remove_child(NodeId::ROOT, b),
            Err(DomError::NotAChild)
        );
    }

    #[test]
    fn test_append_rejects_cycles() {
        let mut tree = DomTree::new();
        let a = tree.insert(Node::element("div"));
        let b = tree.insert(Node::element("div"));
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(a, b).unwrap();

        assert_eq!(tree.append_child(b, a), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(a, a), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_append_moves_existing_node() {
        let mut tree = DomTree::new();
        let a = tree.insert(Node::element("div"));
        let b = tree.insert(Node::element("div"));
        let x = tree.insert(Node::element("input"));
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(NodeId::ROOT, b).unwrap();
        tree.append_child(a, x).unwrap();

        tree.append_child(b, x).unwrap();

        assert!(tree.children(a).next().is_none());
        assert_eq!(tree.get(x).unwrap().parent, b);
    }

    #[test]
    fn test_subtree_preorder() {
        let mut tree = DomTree::new();
        let a = tree.insert(Node::element("div"));
        let b = tree.insert(Node::element("span"));
        let c = tree.insert(Node::text("hi".into()));
        let d = tree.insert(Node::element("p"));
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(a, b).unwrap();
        tree.append_child(b, c).unwrap();
        tree.append_child(a, d).unwrap();

        let order: Vec<NodeId> = tree.subtree(a).collect();
        assert_eq!(order, vec![a, b, c, d]);
    }

    #[test]
    fn test_detached_subtree_stays_readable() {
        let mut tree = DomTree::new();
        let a = tree.insert(Node::element("div"));
        let b = tree.insert(Node::element("input"));
        tree.append_child(NodeId::ROOT, a).unwrap();
        tree.append_child(a, b).unwrap();

        tree.remove_child(NodeId::ROOT, a).unwrap();

        let order: Vec<NodeId> = tree.subtree(a).collect();
        assert_eq!(order, vec![a, b]);
    }
}
