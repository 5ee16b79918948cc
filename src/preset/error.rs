//! Preset error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a preset
#[derive(Error, Debug)]
pub enum KppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG decode error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("PNG encode error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("{key:?} is not a supported key within a {context} element")]
    UnsupportedKey { context: &'static str, key: String },

    #[error("cannot change a resource loaded from disk")]
    BoundResource,

    #[error("brush definition is missing required key {0:?}")]
    MissingDefinitionKey(String),

    #[error("malformed brush definition token {0:?}")]
    InvalidDefinition(String),

    #[error("image carries no {0:?} text field")]
    MissingTextField(String),

    #[error("file {0:?} does not exist")]
    FileNotFound(PathBuf),

    #[error("directory {0:?} does not exist")]
    DirectoryNotFound(PathBuf),

    #[error("cannot save a preset without a preview image")]
    MissingPreview,

    #[error("cannot save a preset with an empty filename")]
    EmptyFilename,
}

impl From<KppError> for String {
    fn from(err: KppError) -> Self {
        err.to_string()
    }
}

impl From<quick_xml::Error> for KppError {
    fn from(e: quick_xml::Error) -> Self {
        KppError::Xml(e.to_string())
    }
}
