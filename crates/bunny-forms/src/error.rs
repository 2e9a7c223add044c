//! Form layer errors.

use bunny_dom::DomError;
use bunny_net::{NetError, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    /// A value or node of the wrong shape was handed in
    #[error("{0}")]
    InvalidArgument(String),

    #[error("form '{id}' not found in document")]
    NotFound { id: String },

    #[error("input '{name}' not found in form '{form}'")]
    InputNotFound { form: String, name: String },

    #[error("form '{id}' is already bound")]
    AlreadyInitialized { id: String },

    #[error("form '{id}' is not bound")]
    NotInitialized { id: String },

    #[error("no radio button with value '{value}' in group '{name}'")]
    UnknownRadioValue { name: String, value: String },

    #[error("file input '{name}' only accepts a file or the empty string")]
    InvalidFileValue { name: String },

    #[error("cannot mirror radio buttons, checkboxes or non-input controls")]
    Unmirrorable,

    #[error("submit failed with status {}", .0.status)]
    SubmitFailed(Response),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Dom(#[from] DomError),
}
