//! The value model.
//!
//! Each bound form owns one [`FormValues`]: a map from control name to
//! the parsed value of that name's controls. The model is the source
//! of truth for reads; widgets are a rendering of it. Parsing folds
//! widget state in kind by kind, and runtime changes arrive through
//! the same folding rules, so a parse of the current document and a
//! replay of the changes that produced it agree.

use std::collections::BTreeMap;

use bunny_dom::{Document, NodeId};
use bunny_file::File;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::FormError;
use crate::kind::ControlKind;

/// One model entry.
///
/// Scalar text, a picked file, or the ordered values of several
/// same-named controls. `Many` always holds at least two items; every
/// collapse to one or zero rewrites the entry as `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    File(File),
    Many(Vec<String>),
}

impl FieldValue {
    pub fn text(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            FieldValue::File(f) => Some(f),
            _ => None,
        }
    }

    /// Blank scalars and empty sequences hold nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::File(_) => false,
            FieldValue::Many(items) => items.is_empty(),
        }
    }
}

/// Parsed values of one form, keyed by control name.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    entries: BTreeMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every named control under a form element.
    pub fn from_form(dom: &Document, form: NodeId) -> Result<Self, FormError> {
        if dom.tag(form) != Some("form") {
            return Err(FormError::InvalidArgument("expected a form element".into()));
        }
        let mut values = Self::new();
        for control in dom.form_controls(form) {
            values.seed_control(dom, control);
        }
        Ok(values)
    }

    /// Fold one control's widget state into the model, by kind.
    pub fn seed_control(&mut self, dom: &Document, control: NodeId) {
        let Some(kind) = ControlKind::classify(dom, control) else {
            return;
        };
        let Some(name) = dom.control_name(control) else {
            return;
        };
        if name.is_empty() {
            return;
        }
        let name = name.to_string();
        let value = dom.value(control).unwrap_or("").to_string();

        match kind {
            ControlKind::Checkbox => self.set_checkbox(&name, &value, dom.is_checked(control)),
            ControlKind::Radio => {
                // Only the checked member contributes; an all-unchecked
                // group stays absent from the model
                if dom.is_checked(control) {
                    self.entries.insert(name, FieldValue::text(&value));
                }
            }
            ControlKind::File => {
                let entry = match dom.file(control) {
                    Some(file) => FieldValue::File(file.clone()),
                    None => FieldValue::Text(String::new()),
                };
                self.entries.insert(name, entry);
            }
            ControlKind::Text | ControlKind::Textarea | ControlKind::Select => {
                self.accumulate(&name, &value);
            }
        }
    }

    // Same-named scalar controls accumulate into a sequence in
    // document order
    fn accumulate(&mut self, name: &str, value: &str) {
        match self.entries.get_mut(name) {
            Some(FieldValue::Many(items)) => items.push(value.to_string()),
            Some(FieldValue::Text(existing)) => {
                let first = existing.clone();
                self.entries.insert(
                    name.to_string(),
                    FieldValue::Many(vec![first, value.to_string()]),
                );
            }
            _ => {
                self.entries.insert(name.to_string(), FieldValue::text(value));
            }
        }
    }

    /// Fold a checkbox state change into the model.
    ///
    /// Checked merges the box's value in; unchecked removes it,
    /// collapsing single-element sequences back to scalars and the
    /// last value to the blank scalar. An untoggled box still claims
    /// its name with the blank scalar so the entry exists.
    pub fn set_checkbox(&mut self, name: &str, value: &str, checked: bool) {
        if checked {
            self.merge_checked(name, value);
        } else {
            self.remove_checked(name, value);
        }
    }

    // Blank or absent entries become the scalar, scalars promote to a
    // two-element sequence, sequences grow without duplicates
    fn merge_checked(&mut self, name: &str, value: &str) {
        match self.entries.get_mut(name) {
            Some(FieldValue::Many(items)) => {
                if !items.iter().any(|item| item == value) {
                    items.push(value.to_string());
                }
            }
            Some(FieldValue::Text(existing)) if !existing.is_empty() => {
                if existing.as_str() != value {
                    let first = existing.clone();
                    self.entries.insert(
                        name.to_string(),
                        FieldValue::Many(vec![first, value.to_string()]),
                    );
                }
            }
            _ => {
                self.entries.insert(name.to_string(), FieldValue::text(value));
            }
        }
    }

    fn remove_checked(&mut self, name: &str, value: &str) {
        match self.entries.get_mut(name) {
            Some(FieldValue::Many(items)) => {
                items.retain(|item| item != value);
                self.collapse(name);
            }
            Some(FieldValue::Text(existing)) if existing.as_str() == value => {
                self.entries
                    .insert(name.to_string(), FieldValue::Text(String::new()));
            }
            Some(_) => {}
            None => {
                self.entries
                    .insert(name.to_string(), FieldValue::Text(String::new()));
            }
        }
    }

    // Sequences never keep fewer than two items
    fn collapse(&mut self, name: &str) {
        let replacement = match self.entries.get(name) {
            Some(FieldValue::Many(items)) if items.len() == 1 => FieldValue::text(&items[0]),
            Some(FieldValue::Many(items)) if items.is_empty() => FieldValue::Text(String::new()),
            _ => return,
        };
        self.entries.insert(name.to_string(), replacement);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(name)
    }

    /// Every value under a name. Absent names and blank scalars
    /// contribute nothing.
    pub fn get_all(&self, name: &str) -> Vec<FieldValue> {
        match self.entries.get(name) {
            None => Vec::new(),
            Some(FieldValue::Text(s)) if s.is_empty() => Vec::new(),
            Some(FieldValue::Many(items)) => {
                items.iter().map(|item| FieldValue::text(item)).collect()
            }
            Some(value) => vec![value.clone()],
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True when the entry exists but holds nothing.
    pub fn is_blank(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(FieldValue::is_empty)
    }

    /// Overwrite an entry.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.entries.insert(name.to_string(), value);
    }

    pub fn set_text(&mut self, name: &str, value: &str) {
        self.set(name, FieldValue::text(value));
    }

    /// Append a value under a name without touching any widget.
    ///
    /// Absent and blank entries become the scalar, scalars promote to
    /// a sequence, sequences grow. Duplicates are allowed here, unlike
    /// checkbox merging.
    pub fn append(&mut self, name: &str, value: &str) {
        match self.entries.get_mut(name) {
            Some(FieldValue::Many(items)) => items.push(value.to_string()),
            Some(FieldValue::Text(existing)) if !existing.is_empty() => {
                let first = existing.clone();
                self.entries.insert(
                    name.to_string(),
                    FieldValue::Many(vec![first, value.to_string()]),
                );
            }
            Some(FieldValue::File(_)) => {
                warn!("append replaces the file under '{}'", name);
                self.entries.insert(name.to_string(), FieldValue::text(value));
            }
            _ => {
                self.entries.insert(name.to_string(), FieldValue::text(value));
            }
        }
    }

    /// Remove an entry, or one value of it.
    ///
    /// With no value the whole entry goes. With a value, sequences
    /// drop that value and scalars matching it are deleted; file
    /// entries and non-matching scalars stay put.
    pub fn remove(&mut self, name: &str, value: Option<&str>) {
        let Some(value) = value else {
            self.entries.remove(name);
            return;
        };
        match self.entries.get_mut(name) {
            Some(FieldValue::Many(items)) => {
                items.retain(|item| item != value);
                self.collapse(name);
            }
            Some(FieldValue::Text(existing)) if existing.as_str() == value => {
                self.entries.remove(name);
            }
            _ => {}
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Dump as a JSON object. Files appear as their names, sequences
    /// as arrays.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            let json = match value {
                FieldValue::Text(s) => Value::String(s.clone()),
                FieldValue::File(f) => Value::String(f.name().to_string()),
                FieldValue::Many(items) => Value::Array(
                    items.iter().map(|item| Value::String(item.clone())).collect(),
                ),
            };
            map.insert(name.clone(), json);
        }
        Value::Object(map)
    }
}
