//! Document parsing
//!
//! A document is either a profile or a catalog, wrapped in an envelope
//! keyed by its kind:
//!
//! ```json
//! {"profile": {"imports": [...], "modify": {...}}}
//! {"catalog": {"title": "...", "groups": [...]}}
//! ```
//!
//! JSON and YAML encodings are both accepted.

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Catalog, Profile};

/// A parsed document. Exactly one kind is present.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Profile(Profile),
    Catalog(Catalog),
}

impl Document {
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Profile(_) => "profile",
            Document::Catalog(_) => "catalog",
        }
    }
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("document must contain exactly one of `profile` or `catalog`")]
    AmbiguousKind,
}

/// Turns raw document bytes into a profile or catalog
pub trait DocumentParser: Send + Sync {
    fn parse(&self, source: &[u8]) -> Result<Document, DocumentError>;
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    catalog: Option<Catalog>,
}

/// Parser for JSON and YAML envelopes
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeDocumentParser;

impl DocumentParser for SerdeDocumentParser {
    fn parse(&self, source: &[u8]) -> Result<Document, DocumentError> {
        let looks_like_json = source
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'{');

        let envelope: Envelope = if looks_like_json {
            serde_json::from_slice(source)?
        } else {
            serde_yaml_ng::from_slice(source)?
        };

        match (envelope.profile, envelope.catalog) {
            (Some(profile), None) => Ok(Document::Profile(profile)),
            (None, Some(catalog)) => Ok(Document::Catalog(catalog)),
            _ => Err(DocumentError::AmbiguousKind),
        }
    }
}
