//! Bunny File - binary payloads
//!
//! Blobs and named files as they flow through form values, plus the
//! helpers the form layer needs around them: content signatures,
//! base64 data URLs and a local object-URL registry.

mod blob;
mod object_url;
mod signature;

pub use blob::{Blob, File};
pub use object_url::ObjectUrls;
pub use signature::{SIGNATURE_BYTES, is_jpeg, is_png, signature};

use thiserror::Error;

/// Errors from binary payload handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileError {
    #[error("not a base64 data URL")]
    InvalidDataUrl,

    #[error("invalid base64 payload")]
    InvalidBase64,
}
