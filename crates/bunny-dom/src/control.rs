//! Live form-widget state.
//!
//! The attribute map keeps the markup defaults; this struct keeps what
//! the user currently sees in the widget.

use bunny_file::File;

/// Tags whose elements carry live control state
pub fn is_control_tag(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

#[derive(Debug, Clone, Default)]
pub struct ControlState {
    /// Current string value
    pub value: String,
    /// Checked flag for checkbox and radio inputs
    pub checked: bool,
    /// Selected file for file inputs
    pub file: Option<File>,
}

impl ControlState {
    pub fn for_tag(tag: &str) -> Option<ControlState> {
        is_control_tag(tag).then(ControlState::default)
    }
}
