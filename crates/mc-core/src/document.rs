//! Persisted document codec.
//!
//! The backend stores a canvas as a record whose `content` field is itself a
//! JSON string of `{nodes, edges}`. Loading parses that string; saving
//! serializes the store and wraps it as `{"content": "<json>"}` for a PUT.

use crate::model::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a stored document could not be decoded.
#[derive(Debug)]
pub enum DocumentError {
    /// The endpoint response itself is not a JSON object we understand.
    Response(serde_json::Error),
    /// The record has no `content` string.
    MissingContent,
    /// `content` is not JSON, or lacks `nodes`/`edges`.
    Content(serde_json::Error),
    /// Serializing the current graph failed.
    Encode(serde_json::Error),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Response(e) => write!(f, "invalid document response: {e}"),
            DocumentError::MissingContent => f.write_str("document has no content field"),
            DocumentError::Content(e) => write!(f, "malformed document content: {e}"),
            DocumentError::Encode(e) => write!(f, "failed to encode document: {e}"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Response(e) | DocumentError::Content(e) | DocumentError::Encode(e) => {
                Some(e)
            }
            DocumentError::MissingContent => None,
        }
    }
}

/// A stored record as returned by the endpoint. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of a save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub content: String,
}

impl SavePayload {
    pub fn from_document(doc: &Document) -> Result<Self, DocumentError> {
        Ok(Self {
            content: to_content(doc)?,
        })
    }

    /// The JSON body to PUT.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(self).map_err(DocumentError::Encode)
    }
}

/// Serialize a document into the `content` string.
pub fn to_content(doc: &Document) -> Result<String, DocumentError> {
    serde_json::to_string(doc).map_err(DocumentError::Encode)
}

/// Parse a `content` string. Blank content is a new, empty document.
pub fn from_content(content: &str) -> Result<Document, DocumentError> {
    if content.trim().is_empty() {
        return Ok(Document::default());
    }
    serde_json::from_str(content).map_err(DocumentError::Content)
}

/// Parse a full endpoint response body into a document.
pub fn parse_record(body: &str) -> Result<Document, DocumentError> {
    let record: StoredRecord = serde_json::from_str(body).map_err(DocumentError::Response)?;
    let content = record.content.ok_or(DocumentError::MissingContent)?;
    from_content(&content)
}
