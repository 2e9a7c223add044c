//! The form facade.
//!
//! [`Forms`] is an explicit registry of bound forms. Binding parses a
//! form's controls into a value model and starts watching its subtree;
//! every script read and write goes through the facade, which redraws
//! the widget first and dispatches exactly one synthetic change event
//! afterwards. User changes arrive as trusted events through
//! [`Forms::handle_change`] and never produce synthetic ones.

use std::collections::{HashMap, HashSet};

use bunny_dom::{ChangeEvent, Document, MutationKind, NodeId, ObserverId};
use bunny_file::{Blob, File};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FormError;
use crate::kind::ControlKind;
use crate::values::{FieldValue, FormValues};

/// Where a change came from.
///
/// Script changes dispatch a synthetic change event after the model
/// update; user changes already happened as real events and dispatch
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    User,
    Script,
}

/// A value a script can assign to a control.
#[derive(Debug, Clone)]
pub enum FieldInput {
    Text(String),
    File(File),
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        FieldInput::Text(value.to_string())
    }
}

impl From<String> for FieldInput {
    fn from(value: String) -> Self {
        FieldInput::Text(value)
    }
}

impl From<File> for FieldInput {
    fn from(file: File) -> Self {
        FieldInput::File(file)
    }
}

impl From<Blob> for FieldInput {
    fn from(blob: Blob) -> Self {
        FieldInput::File(File::unnamed(blob))
    }
}

/// Everything tracked about one bound form.
#[derive(Debug)]
pub struct FormRegistration {
    pub(crate) node: NodeId,
    pub(crate) values: FormValues,
    pub(crate) mirrored: HashSet<String>,
    pub(crate) observer: ObserverId,
}

impl FormRegistration {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn is_mirrored(&self, name: &str) -> bool {
        self.mirrored.contains(name)
    }
}

/// Registry of bound forms, keyed by form id.
#[derive(Debug, Default)]
pub struct Forms {
    registry: HashMap<String, FormRegistration>,
}

impl Forms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a form: parse its controls into the value model and start
    /// watching its subtree for added and removed controls.
    pub fn init(&mut self, dom: &mut Document, form_id: &str) -> Result<(), FormError> {
        if self.registry.contains_key(form_id) {
            return Err(FormError::AlreadyInitialized {
                id: form_id.to_string(),
            });
        }
        let node = dom.form_by_id(form_id).ok_or_else(|| FormError::NotFound {
            id: form_id.to_string(),
        })?;
        let values = FormValues::from_form(dom, node)?;
        let observer = dom.observe_subtree(node);
        info!("form '{}' bound with {} entries", form_id, values.len());
        self.registry.insert(
            form_id.to_string(),
            FormRegistration {
                node,
                values,
                mirrored: HashSet::new(),
                observer,
            },
        );
        Ok(())
    }

    /// Bind every form in the document that carries an id. Forms
    /// without one, and forms already bound, are skipped.
    pub fn init_all(&mut self, dom: &mut Document) -> Result<(), FormError> {
        for form in dom.forms() {
            let id = match dom.attribute(form, "id") {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => {
                    debug!("skipping form without id");
                    continue;
                }
            };
            if self.registry.contains_key(&id) {
                continue;
            }
            self.init(dom, &id)?;
        }
        Ok(())
    }

    /// Unbind a form and disconnect its observer.
    pub fn dispose(&mut self, dom: &mut Document, form_id: &str) -> Result<(), FormError> {
        let registration = self
            .registry
            .remove(form_id)
            .ok_or_else(|| not_initialized(form_id))?;
        dom.disconnect_observer(registration.observer);
        info!("form '{}' unbound", form_id);
        Ok(())
    }

    pub fn is_initialized(&self, form_id: &str) -> bool {
        self.registry.contains_key(form_id)
    }

    /// Registration handle for a bound form.
    pub fn registration(&self, form_id: &str) -> Result<&FormRegistration, FormError> {
        self.registry
            .get(form_id)
            .ok_or_else(|| not_initialized(form_id))
    }

    pub(crate) fn registration_mut(
        &mut self,
        form_id: &str,
    ) -> Result<&mut FormRegistration, FormError> {
        self.registry
            .get_mut(form_id)
            .ok_or_else(|| not_initialized(form_id))
    }

    /// Model entry for one control name.
    pub fn get(&self, form_id: &str, name: &str) -> Result<Option<FieldValue>, FormError> {
        Ok(self.registration(form_id)?.values.get(name).cloned())
    }

    /// Every value under a name. Absent names and blank entries yield
    /// nothing.
    pub fn get_all(&self, form_id: &str, name: &str) -> Result<Vec<FieldValue>, FormError> {
        Ok(self.registration(form_id)?.values.get_all(name))
    }

    /// The whole value model of a form.
    pub fn values(&self, form_id: &str) -> Result<&FormValues, FormError> {
        Ok(&self.registration(form_id)?.values)
    }

    /// What a script reading a control sees: files come from the
    /// model, radio groups from the checked member, everything else
    /// from the live widget.
    pub fn read_value(
        &self,
        dom: &Document,
        form_id: &str,
        name: &str,
    ) -> Result<FieldValue, FormError> {
        let registration = self.registration(form_id)?;
        let controls = Self::controls_named(dom, registration.node, form_id, name)?;
        let kind = ControlKind::classify(dom, controls[0]).unwrap_or(ControlKind::Text);

        let value = match kind {
            ControlKind::File => registration
                .values
                .get(name)
                .cloned()
                .unwrap_or_else(|| FieldValue::Text(String::new())),
            ControlKind::Radio => {
                let checked = controls.iter().copied().find(|&c| dom.is_checked(c));
                FieldValue::text(checked.and_then(|c| dom.value(c)).unwrap_or(""))
            }
            _ => FieldValue::text(dom.value(controls[0]).unwrap_or("")),
        };
        Ok(value)
    }

    /// Script-assign a value to a control.
    ///
    /// The widget is redrawn first, then the model updated, then one
    /// synthetic change dispatched. Radio groups check the member
    /// whose value matches and reject unknown values untouched; file
    /// inputs take a file or the empty string, never text.
    pub fn set(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        name: &str,
        value: impl Into<FieldInput>,
    ) -> Result<(), FormError> {
        let value = value.into();
        let form_node = self.registration(form_id)?.node;
        let controls = Self::controls_named(dom, form_node, form_id, name)?;
        let kind = ControlKind::classify(dom, controls[0]).unwrap_or(ControlKind::Text);

        match (kind, value) {
            (ControlKind::File, FieldInput::File(file)) => {
                self.assign_file(dom, form_id, name, controls[0], Some(file))
            }
            (ControlKind::File, FieldInput::Text(text)) if text.is_empty() => {
                self.assign_file(dom, form_id, name, controls[0], None)
            }
            (ControlKind::File, FieldInput::Text(_)) => Err(FormError::InvalidFileValue {
                name: name.to_string(),
            }),
            (_, FieldInput::File(_)) => Err(FormError::InvalidArgument(
                "only file inputs accept binary values".into(),
            )),
            (ControlKind::Radio, FieldInput::Text(text)) => {
                let member = controls
                    .iter()
                    .copied()
                    .find(|&m| dom.value(m) == Some(text.as_str()))
                    .ok_or_else(|| FormError::UnknownRadioValue {
                        name: name.to_string(),
                        value: text.clone(),
                    })?;
                dom.set_checked(member, true)?;
                self.apply_change(dom, form_id, member, ChangeOrigin::Script)
            }
            (_, FieldInput::Text(text)) => {
                let target = controls[0];
                dom.set_value(target, &text)?;
                self.apply_change(dom, form_id, target, ChangeOrigin::Script)
            }
        }
    }

    // File widgets take no script redraw; the model carries the value
    fn assign_file(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        name: &str,
        control: NodeId,
        file: Option<File>,
    ) -> Result<(), FormError> {
        let entry = match file {
            Some(f) => FieldValue::File(f),
            None => FieldValue::Text(String::new()),
        };
        self.registration_mut(form_id)?.values.set(name, entry);
        dom.dispatch_change(ChangeEvent::synthetic(control));
        self.sync_mirrors_if_flagged(dom, form_id, name)
    }

    /// Script-toggle a checkbox identified by its value: redraw the
    /// checked flag, fold the value in or out of the model, dispatch
    /// one synthetic change.
    pub fn set_checked(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        name: &str,
        value: &str,
        checked: bool,
    ) -> Result<(), FormError> {
        let form_node = self.registration(form_id)?.node;
        let controls = Self::controls_named(dom, form_node, form_id, name)?;
        let target = controls
            .iter()
            .copied()
            .find(|&c| {
                ControlKind::classify(dom, c) == Some(ControlKind::Checkbox)
                    && dom.value(c) == Some(value)
            })
            .ok_or_else(|| {
                FormError::InvalidArgument(format!(
                    "no checkbox with value '{value}' in group '{name}'"
                ))
            })?;
        dom.set_checked(target, checked)?;
        self.apply_change(dom, form_id, target, ChangeOrigin::Script)
    }

    /// Write a JSON object into the form. Keys naming a control are
    /// assigned through the usual script path; everything else is
    /// skipped.
    pub fn fill(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        data: &Value,
    ) -> Result<(), FormError> {
        let object = data
            .as_object()
            .ok_or_else(|| FormError::InvalidArgument("fill expects a JSON object".into()))?;
        let form_node = self.registration(form_id)?.node;
        for (name, value) in object {
            if dom.named_controls(form_node, name).is_empty() {
                continue;
            }
            let Some(text) = json_scalar(value) else {
                debug!("fill: skipping non-scalar value for '{}'", name);
                continue;
            };
            self.set(dom, form_id, name, text.as_str())?;
        }
        Ok(())
    }

    /// Like [`Forms::fill`], but keys without a control land in the
    /// model as appended values instead of being skipped.
    pub fn fill_or_append(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        data: &Value,
    ) -> Result<(), FormError> {
        let object = data
            .as_object()
            .ok_or_else(|| FormError::InvalidArgument("fill expects a JSON object".into()))?;
        let form_node = self.registration(form_id)?.node;
        for (name, value) in object {
            let Some(text) = json_scalar(value) else {
                debug!("fill: skipping non-scalar value for '{}'", name);
                continue;
            };
            if dom.named_controls(form_node, name).is_empty() {
                self.append(form_id, name, &text)?;
            } else {
                self.set(dom, form_id, name, text.as_str())?;
            }
        }
        Ok(())
    }

    /// Append a value to a model entry without touching any widget.
    pub fn append(&mut self, form_id: &str, name: &str, value: &str) -> Result<(), FormError> {
        self.registration_mut(form_id)?.values.append(name, value);
        Ok(())
    }

    /// Remove a model entry, or one value of a sequence.
    pub fn remove(
        &mut self,
        form_id: &str,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), FormError> {
        self.registration_mut(form_id)?.values.remove(name, value);
        Ok(())
    }

    /// Fold one control's current widget state into the model and run
    /// the post-change steps. Script origins dispatch the synthetic
    /// change; user origins never do.
    pub fn apply_change(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        control: NodeId,
        origin: ChangeOrigin,
    ) -> Result<(), FormError> {
        let Some(name) = dom.control_name(control).map(str::to_string) else {
            return Ok(());
        };
        let Some(kind) = ControlKind::classify(dom, control) else {
            return Ok(());
        };
        let registration = self.registration_mut(form_id)?;

        match kind {
            ControlKind::Checkbox => {
                let value = dom.value(control).unwrap_or("").to_string();
                registration
                    .values
                    .set_checkbox(&name, &value, dom.is_checked(control));
            }
            ControlKind::Radio => {
                if dom.is_checked(control) {
                    let value = dom.value(control).unwrap_or("").to_string();
                    registration.values.set_text(&name, &value);
                }
            }
            ControlKind::File => {
                let entry = match dom.file(control) {
                    Some(file) => FieldValue::File(file.clone()),
                    None => FieldValue::Text(String::new()),
                };
                registration.values.set(&name, entry);
            }
            _ => {
                let value = dom.value(control).unwrap_or("").to_string();
                registration.values.set_text(&name, &value);
            }
        }

        if origin == ChangeOrigin::Script {
            dom.dispatch_change(ChangeEvent::synthetic(control));
        }
        self.sync_mirrors_if_flagged(dom, form_id, &name)
    }

    /// Route a change event into the model of the form owning its
    /// target. Events for untracked controls fall through untouched;
    /// synthetic events were already applied when they were dispatched.
    pub fn handle_change(
        &mut self,
        dom: &mut Document,
        event: &ChangeEvent,
    ) -> Result<(), FormError> {
        if !event.trusted {
            return Ok(());
        }
        let Some(form_id) = self.owning_form_id(dom, event.target) else {
            debug!("change on untracked control");
            return Ok(());
        };
        self.apply_change(dom, &form_id, event.target, ChangeOrigin::User)
    }

    /// Apply queued childList mutations to every bound form.
    ///
    /// Added controls are folded into the model; removed ones give
    /// their contribution back. Container nodes are walked for the
    /// controls inside them.
    pub fn deliver_mutations(&mut self, dom: &mut Document) -> Result<(), FormError> {
        let ids: Vec<String> = self.registry.keys().cloned().collect();
        for form_id in ids {
            self.deliver_form_mutations(dom, &form_id)?;
        }
        Ok(())
    }

    fn deliver_form_mutations(
        &mut self,
        dom: &mut Document,
        form_id: &str,
    ) -> Result<(), FormError> {
        let observer = self.registration(form_id)?.observer;
        let records = dom.take_mutations(observer);
        if records.is_empty() {
            return Ok(());
        }
        debug!("form '{}': {} mutation records", form_id, records.len());

        for record in records {
            let controls = dom.form_controls(record.node);
            match record.kind {
                MutationKind::Added => {
                    for control in controls {
                        self.registration_mut(form_id)?
                            .values
                            .seed_control(dom, control);
                    }
                }
                MutationKind::Removed => {
                    for control in controls {
                        self.evict_control(dom, form_id, control)?;
                    }
                }
            }
        }
        Ok(())
    }

    // Removal gives back only this control's contribution; the name
    // is dropped entirely once no attached control claims it
    fn evict_control(
        &mut self,
        dom: &Document,
        form_id: &str,
        control: NodeId,
    ) -> Result<(), FormError> {
        let Some(name) = dom.control_name(control).map(str::to_string) else {
            return Ok(());
        };
        if name.is_empty() {
            return Ok(());
        }
        let value = dom.value(control).unwrap_or("").to_string();

        let registration = self.registration_mut(form_id)?;
        registration.values.remove(&name, Some(&value));
        if dom.named_controls(registration.node, &name).is_empty() {
            registration.values.remove(&name, None);
            registration.mirrored.remove(&name);
        }
        Ok(())
    }

    fn owning_form_id(&self, dom: &Document, node: NodeId) -> Option<String> {
        let form_node = dom.owning_form(node)?;
        self.registry
            .iter()
            .find(|(_, registration)| registration.node == form_node)
            .map(|(id, _)| id.clone())
    }

    pub(crate) fn controls_named(
        dom: &Document,
        form_node: NodeId,
        form_id: &str,
        name: &str,
    ) -> Result<Vec<NodeId>, FormError> {
        let controls = dom.named_controls(form_node, name);
        if controls.is_empty() {
            return Err(FormError::InputNotFound {
                form: form_id.to_string(),
                name: name.to_string(),
            });
        }
        Ok(controls)
    }
}

fn not_initialized(id: &str) -> FormError {
    FormError::NotInitialized { id: id.to_string() }
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
