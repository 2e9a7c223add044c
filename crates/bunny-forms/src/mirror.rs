//! Mirror propagation.
//!
//! Display elements opt in with a `data-mirror` attribute naming
//! `form_id.input_name`. Once an input is mirrored, every change to it
//! pushes the new value into all matching targets before the change
//! event goes out. Only plain input widgets can be mirrored; checkables
//! and multi-line controls cannot.

use bunny_dom::Document;
use tracing::debug;

use crate::error::FormError;
use crate::facade::Forms;
use crate::kind::ControlKind;
use crate::values::FieldValue;

/// Attribute binding a display element to `form_id.input_name`.
pub const MIRROR_ATTR: &str = "data-mirror";

impl Forms {
    /// Mirror one input: targets follow its value from now on, and get
    /// an initial sync right away.
    pub fn mirror(&mut self, dom: &mut Document, form_id: &str, name: &str) -> Result<(), FormError> {
        let form_node = self.registration(form_id)?.node;
        let controls = Self::controls_named(dom, form_node, form_id, name)?;
        let kind = ControlKind::classify(dom, controls[0]).unwrap_or(ControlKind::Text);
        if !kind.is_mirrorable() {
            return Err(FormError::Unmirrorable);
        }
        self.registration_mut(form_id)?.mirrored.insert(name.to_string());
        self.sync_mirrors(dom, form_id, name)
    }

    /// Mirror every mirrorable input of a form. Checkables and
    /// multi-line controls are skipped, not errors.
    pub fn mirror_all(&mut self, dom: &mut Document, form_id: &str) -> Result<(), FormError> {
        let form_node = self.registration(form_id)?.node;
        let mut names = Vec::new();
        for control in dom.form_controls(form_node) {
            let Some(kind) = ControlKind::classify(dom, control) else {
                continue;
            };
            if !kind.is_mirrorable() {
                continue;
            }
            if let Some(name) = dom.control_name(control) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        for name in names {
            self.registration_mut(form_id)?.mirrored.insert(name.clone());
            self.sync_mirrors(dom, form_id, &name)?;
        }
        Ok(())
    }

    /// Push the current value into every matching mirror target.
    ///
    /// Image targets showing a file get a fresh object URL on every
    /// sync; old URLs stay alive until someone revokes them. Other
    /// targets show the value as text, files as their name.
    pub fn sync_mirrors(&self, dom: &mut Document, form_id: &str, name: &str) -> Result<(), FormError> {
        let value = self.read_value(dom, form_id, name)?;
        let selector = format!("{form_id}.{name}");
        let targets = dom.elements_with_attribute(MIRROR_ATTR, &selector);
        if targets.is_empty() {
            return Ok(());
        }
        debug!("syncing {} mirror(s) for {}", targets.len(), selector);

        for target in targets {
            if dom.tag(target) == Some("img") {
                match &value {
                    FieldValue::File(file) if file.size() > 0 => {
                        let url = dom.object_urls_mut().create(file.as_blob());
                        dom.set_attribute(target, "src", &url)?;
                    }
                    FieldValue::Text(text) if text.is_empty() => {
                        dom.set_attribute(target, "src", "")?;
                    }
                    _ => {}
                }
            } else {
                dom.set_text_content(target, &display_text(&value))?;
            }
        }
        Ok(())
    }

    pub(crate) fn sync_mirrors_if_flagged(
        &self,
        dom: &mut Document,
        form_id: &str,
        name: &str,
    ) -> Result<(), FormError> {
        if self.registration(form_id)?.mirrored.contains(name) {
            self.sync_mirrors(dom, form_id, name)
        } else {
            Ok(())
        }
    }
}

fn display_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::File(f) => f.name().to_string(),
        FieldValue::Many(items) => items.join(", "),
    }
}
