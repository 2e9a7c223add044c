//! Declarative form binding.
//!
//! Each bound form owns a value model parsed from its controls. Script
//! reads and writes go through the [`Forms`] facade, which redraws the
//! widget before dispatching a single synthetic change event; user
//! changes arrive as trusted events and update the model without an
//! echo. Subtree mutations keep the model in step with added and
//! removed controls, `data-mirror` elements follow input values, and
//! submission goes out as multipart/form-data over a pluggable
//! transport.

mod error;
mod facade;
mod kind;
mod mirror;
mod submit;
mod values;

pub use error::FormError;
pub use facade::{ChangeOrigin, FieldInput, FormRegistration, Forms};
pub use kind::ControlKind;
pub use mirror::MIRROR_ATTR;
pub use submit::{SubmitOptions, form_parts};
pub use values::{FieldValue, FormValues};
