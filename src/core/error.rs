use thiserror::Error;

use crate::core::types::RecordId;

pub type LinkResult<T> = std::result::Result<T, LinkError>;

/// Errors raised by the linker. Every variant is fatal to the call that produced it;
/// missing records and missing fields are never errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("collection \"{name}\" already exists")]
    AlreadyExists { name: String },

    #[error("collection \"{name}\" does not exist")]
    NotFound { name: String },

    #[error("record with id {id} already exists in collection \"{collection}\"")]
    DuplicateIdentifier { collection: String, id: RecordId },

    /// The record has no `id` field, or its value is not an integer or string.
    #[error("record without a usable id added to collection \"{collection}\"")]
    MissingIdentifier { collection: String },

    #[error("id of record {id} in collection \"{collection}\" cannot be changed")]
    ImmutableIdentifier { collection: String, id: RecordId },

    #[error("failed to decode input: {0}")]
    Decode(String),
}

impl LinkError {
    pub fn already_exists(name: impl Into<String>) -> Self {
        LinkError::AlreadyExists { name: name.into() }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        LinkError::NotFound { name: name.into() }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Decode(err.to_string())
    }
}
