//! Control classification.
//!
//! The browser's stringly `type` attribute collapses into a closed set
//! of kinds the binder dispatches on. Unrecognized input types behave
//! as plain text.

use bunny_dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Radio,
    Checkbox,
    File,
    Textarea,
    Select,
}

impl ControlKind {
    /// Classify an element, `None` for non-controls.
    pub fn classify(dom: &Document, node: NodeId) -> Option<ControlKind> {
        match dom.tag(node)? {
            "textarea" => Some(ControlKind::Textarea),
            "select" => Some(ControlKind::Select),
            "input" => {
                let ty = dom.attribute(node, "type").unwrap_or("text");
                Some(Self::of_input_type(ty))
            }
            _ => None,
        }
    }

    /// Map an input `type` attribute to its kind.
    pub fn of_input_type(ty: &str) -> ControlKind {
        if ty.eq_ignore_ascii_case("radio") {
            ControlKind::Radio
        } else if ty.eq_ignore_ascii_case("checkbox") {
            ControlKind::Checkbox
        } else if ty.eq_ignore_ascii_case("file") {
            ControlKind::File
        } else {
            ControlKind::Text
        }
    }

    /// Checkbox or radio.
    pub fn is_checkable(self) -> bool {
        matches!(self, ControlKind::Checkbox | ControlKind::Radio)
    }

    /// Kinds a mirror can follow: plain input widgets, including file
    /// pickers, but never checkables or multi-line controls.
    pub fn is_mirrorable(self) -> bool {
        matches!(self, ControlKind::Text | ControlKind::File)
    }
}
