//! Error types for imgaudit operations.

use thiserror::Error;

/// Errors that abort an audit run.
///
/// Only structural problems end up here. Anything that affects a single
/// document or image is reported as a [`Skip`] instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid value for option '{name}': {value}")]
    InvalidOption { name: String, value: String },

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal failure tied to one archive member.
///
/// The audit keeps going when a document fails to parse or an image cannot
/// be probed; the member is recorded here and left out of that step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {reason}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Skip {
    pub path: String,
    pub reason: SkipReason,
}

impl Skip {
    pub fn new(path: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// Why a member was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "detail", rename_all = "snake_case"))]
pub enum SkipReason {
    #[error("not present in archive")]
    Missing,

    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("no usable structure")]
    NoStructure,

    #[error("unrecognized image format")]
    UnknownImageFormat,
}
