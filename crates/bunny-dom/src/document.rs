//! Document - the tree plus the services hanging off it.
//!
//! Owns the node arena, the mutation observers, the object-URL
//! registry and the queue of dispatched change events.

use bunny_file::{File, ObjectUrls};
use tracing::debug;

use crate::control::ControlState;
use crate::events::{ChangeEvent, MutationRecord};
use crate::node::Node;
use crate::observer::{ObserverId, ObserverRegistry};
use crate::tree::DomTree;
use crate::{DomError, NodeId};

#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    observers: ObserverRegistry,
    object_urls: ObjectUrls,
    change_events: Vec<ChangeEvent>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            tree: DomTree::new(),
            observers: ObserverRegistry::new(),
            object_urls: ObjectUrls::new(),
            change_events: Vec::new(),
        }
    }

    /// Document root node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    // --- building ----------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.insert(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.insert(Node::text(content.to_string()))
    }

    /// Set an attribute, updating cached lookups and control defaults
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self
            .tree
            .get_mut(node)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)?;
        element.set_attr(name, value);
        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.tree.get(node)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.tree
            .get(node)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.has_attr(name))
    }

    /// Tag name for element nodes
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.tree.get(node)?.as_element().map(|e| e.tag.as_str())
    }

    /// Append a child, recording the mutation
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.append_child(parent, child)?;
        self.seed_control_from_children(parent, child);
        self.observers
            .record(&self.tree, MutationRecord::node_added(child, parent));
        Ok(())
    }

    /// Remove a child, recording the mutation
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let actual = self.tree.get(child).ok_or(DomError::NotFound)?.parent;
        if actual != parent {
            return Err(DomError::NotAChild);
        }
        // Record first: subtree scoping needs the removal site linked
        self.observers
            .record(&self.tree, MutationRecord::node_removed(child, parent));
        self.tree.remove_child(parent, child)
    }

    /// Detach a node from its current parent
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(node).ok_or(DomError::NotAChild)?;
        self.remove_child(parent, node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.tree.get(node)?.parent;
        parent.is_some().then_some(parent)
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        let child = self.tree.get(node)?.first_child;
        child.is_some().then_some(child)
    }

    // Select elements take their value from the first or the selected
    // option; textareas take theirs from their text
    fn seed_control_from_children(&mut self, parent: NodeId, child: NodeId) {
        match self.tag(parent) {
            Some("select") => {
                if self.tag(child) != Some("option") {
                    return;
                }
                let selected = self.has_attribute(child, "selected");
                let empty = self.value(parent).is_some_and(str::is_empty);
                if selected || empty {
                    let value = self.option_value(child);
                    if let Some(control) = self.control_state_mut(parent) {
                        control.value = value;
                    }
                }
            }
            Some("textarea") => {
                let text = self.text_content(parent);
                if let Some(control) = self.control_state_mut(parent) {
                    control.value = text;
                }
            }
            _ => {}
        }
    }

    /// Value of an option: its value attribute, else its text
    fn option_value(&self, option: NodeId) -> String {
        match self.attribute(option, "value") {
            Some(v) => v.to_string(),
            None => self.text_content(option),
        }
    }

    // --- text content ------------------------------------------------

    /// Concatenated text of the subtree
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in self.tree.subtree(node) {
            if let Some(text) = self.tree.get(id).and_then(|n| n.as_text()) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        while let Some(child) = self.first_child(node) {
            self.remove_child(node, child)?;
        }
        let text_node = self.create_text(text);
        self.append_child(node, text_node)
    }

    // --- queries -----------------------------------------------------

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.subtree(NodeId::ROOT).find(|&n| {
            self.tree
                .get(n)
                .and_then(|node| node.as_element())
                .and_then(|e| e.id.as_deref())
                == Some(id)
        })
    }

    /// The form element with this id attribute
    pub fn form_by_id(&self, id: &str) -> Option<NodeId> {
        let node = self.element_by_id(id)?;
        (self.tag(node) == Some("form")).then_some(node)
    }

    /// All form elements, in document order
    pub fn forms(&self) -> Vec<NodeId> {
        self.tree
            .subtree(NodeId::ROOT)
            .filter(|&n| self.tag(n) == Some("form"))
            .collect()
    }

    /// Named form controls under `root`, in document order
    pub fn form_controls(&self, root: NodeId) -> Vec<NodeId> {
        self.tree
            .subtree(root)
            .filter(|&n| {
                self.tree
                    .get(n)
                    .and_then(|node| node.as_element())
                    .is_some_and(|e| {
                        e.control.is_some() && e.name.as_deref().is_some_and(|name| !name.is_empty())
                    })
            })
            .collect()
    }

    /// Controls under `root` whose name attribute matches
    pub fn named_controls(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.tree
            .subtree(root)
            .filter(|&n| {
                self.tree
                    .get(n)
                    .and_then(|node| node.as_element())
                    .is_some_and(|e| e.control.is_some() && e.name.as_deref() == Some(name))
            })
            .collect()
    }

    /// Elements with an exact attribute value, anywhere in the document
    pub fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.tree
            .subtree(NodeId::ROOT)
            .filter(|&n| self.attribute(n, name) == Some(value))
            .collect()
    }

    /// Closest form ancestor
    pub fn owning_form(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if self.tag(id) == Some("form") {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// True while the node is linked under the document root
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.in_subtree(NodeId::ROOT, node)
    }

    // --- control state -----------------------------------------------

    pub fn control(&self, node: NodeId) -> Option<&ControlState> {
        self.tree.get(node)?.as_element()?.control.as_ref()
    }

    fn control_state_mut(&mut self, node: NodeId) -> Option<&mut ControlState> {
        self.tree.get_mut(node)?.as_element_mut()?.control.as_mut()
    }

    fn control_mut(&mut self, node: NodeId) -> Result<&mut ControlState, DomError> {
        self.tree
            .get_mut(node)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .and_then(|e| e.control.as_mut())
            .ok_or(DomError::InvalidNodeType)
    }

    /// Name attribute of a control
    pub fn control_name(&self, node: NodeId) -> Option<&str> {
        self.tree.get(node)?.as_element()?.name.as_deref()
    }

    /// Live string value of a control
    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.control(node).map(|c| c.value.as_str())
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.control(node).is_some_and(|c| c.checked)
    }

    /// Selected file of a file input
    pub fn file(&self, node: NodeId) -> Option<&File> {
        self.control(node)?.file.as_ref()
    }

    pub fn is_file_input(&self, node: NodeId) -> bool {
        self.tree
            .get(node)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.is_file_input())
    }

    fn input_has_type(&self, node: NodeId, ty: &str) -> bool {
        self.tree
            .get(node)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.tag == "input" && e.input_type().eq_ignore_ascii_case(ty))
    }

    fn is_radio(&self, node: NodeId) -> bool {
        self.input_has_type(node, "radio")
    }

    fn is_checkbox(&self, node: NodeId) -> bool {
        self.input_has_type(node, "checkbox")
    }

    fn is_checkable(&self, node: NodeId) -> bool {
        self.is_radio(node) || self.is_checkbox(node)
    }

    // --- script-side redraw (no events) ------------------------------

    /// Redraw a control with a new value. No change event is produced;
    /// script paths dispatch their own.
    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.control_mut(node)?.value = value.to_string();
        Ok(())
    }

    /// Redraw the checked flag. Checking a radio unchecks the rest of
    /// its group.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), DomError> {
        if !self.is_checkable(node) {
            return Err(DomError::InvalidNodeType);
        }
        self.control_mut(node)?.checked = checked;
        if checked && self.is_radio(node) {
            self.uncheck_radio_siblings(node)?;
        }
        Ok(())
    }

    /// Redraw the selected file of a file input
    pub fn set_file(&mut self, node: NodeId, file: Option<File>) -> Result<(), DomError> {
        if !self.is_file_input(node) {
            return Err(DomError::InvalidNodeType);
        }
        self.control_mut(node)?.file = file;
        Ok(())
    }

    fn uncheck_radio_siblings(&mut self, node: NodeId) -> Result<(), DomError> {
        let Some(name) = self.control_name(node).map(str::to_string) else {
            return Ok(());
        };
        let Some(form) = self.owning_form(node) else {
            return Ok(());
        };
        let group: Vec<NodeId> = self
            .named_controls(form, &name)
            .into_iter()
            .filter(|&member| member != node && self.is_radio(member))
            .collect();
        for member in group {
            self.control_mut(member)?.checked = false;
        }
        Ok(())
    }

    // --- user interaction --------------------------------------------
    // These simulate the user driving the widget and hand back the
    // trusted change event for the embedder to route onward.

    /// Type a value into a text-like control (text inputs, textarea,
    /// select)
    pub fn user_set_value(&mut self, node: NodeId, value: &str) -> Result<ChangeEvent, DomError> {
        if self.is_checkable(node) || self.is_file_input(node) {
            return Err(DomError::InvalidNodeType);
        }
        self.control_mut(node)?.value = value.to_string();
        Ok(ChangeEvent::user(node))
    }

    /// Click a checkbox or radio. Checkboxes flip; radios check and
    /// uncheck the rest of their group.
    pub fn user_toggle(&mut self, node: NodeId) -> Result<ChangeEvent, DomError> {
        if self.is_radio(node) {
            self.set_checked(node, true)?;
        } else if self.is_checkbox(node) {
            let flipped = !self.is_checked(node);
            self.control_mut(node)?.checked = flipped;
        } else {
            return Err(DomError::InvalidNodeType);
        }
        Ok(ChangeEvent::user(node))
    }

    /// Pick a file in a file input
    pub fn user_choose_file(&mut self, node: NodeId, file: File) -> Result<ChangeEvent, DomError> {
        if !self.is_file_input(node) {
            return Err(DomError::InvalidNodeType);
        }
        self.control_mut(node)?.file = Some(file);
        Ok(ChangeEvent::user(node))
    }

    // --- dispatched change events ------------------------------------

    /// Queue a change notification for embedder consumption
    pub fn dispatch_change(&mut self, event: ChangeEvent) {
        debug!(
            "change event on {:?} (trusted: {})",
            event.target, event.trusted
        );
        self.change_events.push(event);
    }

    /// Drain queued change notifications
    pub fn take_change_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.change_events)
    }

    // --- observers ---------------------------------------------------

    /// Observe childList mutations under `root` and its whole subtree
    pub fn observe_subtree(&mut self, root: NodeId) -> ObserverId {
        self.observers.observe(root, true)
    }

    pub fn disconnect_observer(&mut self, id: ObserverId) -> bool {
        self.observers.disconnect(id)
    }

    /// Drain mutation records queued for one observer
    pub fn take_mutations(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(id)
    }

    pub fn has_pending_mutations(&self, id: ObserverId) -> bool {
        self.observers.has_pending(id)
    }

    // --- object URLs -------------------------------------------------

    pub fn object_urls(&self) -> &ObjectUrls {
        &self.object_urls
    }

    pub fn object_urls_mut(&mut self) -> &mut ObjectUrls {
        &mut self.object_urls
    }

    // --- markup conveniences -----------------------------------------

    /// Create a form with an id under the document root
    pub fn append_form(&mut self, id: &str) -> Result<NodeId, DomError> {
        let form = self.create_element("form");
        self.set_attribute(form, "id", id)?;
        self.append_child(NodeId::ROOT, form)?;
        Ok(form)
    }

    /// Create an input and append it to `parent`
    pub fn append_input(
        &mut self,
        parent: NodeId,
        ty: &str,
        name: &str,
        value: &str,
    ) -> Result<NodeId, DomError> {
        let input = self.create_element("input");
        self.set_attribute(input, "type", ty)?;
        self.set_attribute(input, "name", name)?;
        if !value.is_empty() {
            self.set_attribute(input, "value", value)?;
        }
        self.append_child(parent, input)?;
        Ok(input)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
