//! DOM Node - compact representation
//!
//! Uses NodeId (4 bytes) instead of pointers, with sibling links kept
//! inline for cheap traversal.

use crate::NodeId;
use crate::control::ControlState;

/// DOM Node - core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn detached(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::detached(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::detached(NodeData::Text(TextData { content }))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::detached(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag name, lowercase
    pub tag: String,
    /// Attributes
    pub attrs: Vec<Attribute>,
    /// Cached id attribute (very common lookup)
    pub id: Option<String>,
    /// Cached name attribute (form control lookup)
    pub name: Option<String>,
    /// Live widget state, present when the tag is a form control
    pub control: Option<ControlState>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let control = ControlState::for_tag(&tag);
        Self {
            tag,
            attrs: Vec::new(),
            id: None,
            name: None,
            control,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    /// Set an attribute, updating cached lookups and control defaults
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "id" => self.id = Some(value.to_string()),
            "name" => self.name = Some(value.to_string()),
            _ => {}
        }

        let mut found = false;
        for attr in self.attrs.iter_mut() {
            if attr.name == name {
                attr.value = value.to_string();
                found = true;
                break;
            }
        }
        if !found {
            self.attrs.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            });
        }

        self.sync_control_attr(name, value);
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, name: &str) {
        match name {
            "id" => self.id = None,
            "name" => self.name = None,
            _ => {}
        }
        self.attrs.retain(|a| a.name != name);
    }

    /// Input type attribute, defaulting to "text"
    pub fn input_type(&self) -> &str {
        self.get_attr("type").unwrap_or("text")
    }

    pub fn is_file_input(&self) -> bool {
        self.tag == "input" && self.input_type().eq_ignore_ascii_case("file")
    }

    // Markup defaults seed the live widget. File inputs keep their
    // value attribute as a plain attribute (it carries a default URL,
    // not the selection).
    fn sync_control_attr(&mut self, name: &str, value: &str) {
        let file_input = self.is_file_input();
        let Some(control) = &mut self.control else {
            return;
        };
        match name {
            "value" if !file_input => control.value = value.to_string(),
            "checked" => control.checked = true,
            "type" if value.eq_ignore_ascii_case("file") => control.value.clear(),
            _ => {}
        }
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub content: String,
}

/// Attribute
#[derive(Debug)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_lowercases_tag() {
        let node = Node::element("DIV");
        assert_eq!(node.as_element().unwrap().tag, "div");
    }

    #[test]
    fn test_attr_caches() {
        let mut element = ElementData::new("input");
        element.set_attr("id", "email");
        element.set_attr("name", "email");

        assert_eq!(element.id.as_deref(), Some("email"));
        assert_eq!(element.name.as_deref(), Some("email"));

        element.remove_attr("id");
        assert_eq!(element.id, None);
        assert_eq!(element.get_attr("id"), None);
    }

    #[test]
    fn test_control_state_only_for_controls() {
        assert!(ElementData::new("input").control.is_some());
        assert!(ElementData::new("textarea").control.is_some());
        assert!(ElementData::new("select").control.is_some());
        assert!(ElementData::new("div").control.is_none());
    }

    #[test]
    fn test_value_attr_seeds_live_value() {
        let mut element = ElementData::new("input");
        element.set_attr("value", "hello");
        assert_eq!(element.control.as_ref().unwrap().value, "hello");
    }

    #[test]
    fn test_file_input_value_attr_stays_an_attr() {
        let mut element = ElementData::new("input");
        element.set_attr("type", "file");
        element.set_attr("value", "http://example.com/pic.png");

        assert_eq!(element.control.as_ref().unwrap().value, "");
        assert_eq!(
            element.get_attr("value"),
            Some("http://example.com/pic.png")
        );
    }

    #[test]
    fn test_checked_attr_seeds_flag() {
        let mut element = ElementData::new("input");
        element.set_attr("type", "checkbox");
        element.set_attr("checked", "checked");
        assert!(element.control.as_ref().unwrap().checked);
    }
}
