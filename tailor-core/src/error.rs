//! Error types for profile resolution with messages that name the offending
//! href or control id

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving a profile into catalogs
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Import reference is missing or cannot be parsed as a location
    #[error("Invalid href '{href}': {reason}")]
    InvalidHref { href: String, reason: String },

    /// Transport failure while retrieving a document
    #[error("Failed to fetch '{href}': {message}")]
    Fetch { href: String, message: String },

    /// Document content could not be parsed into a profile or catalog
    #[error("Failed to parse document '{href}': {message}")]
    Parse { href: String, message: String },

    /// A subcontrol selector has no match in the fetched catalog
    #[error("Could not find subcontrol {subcontrol_id} in catalog")]
    UnresolvedSelector { subcontrol_id: String },

    /// The same document was entered twice on one import branch
    #[error("Cyclic import detected: '{href}' is already part of the import chain")]
    CyclicImport { href: String },

    /// A profile branch ended without reaching any catalog
    #[error("No catalog reachable from '{href}'")]
    CatalogNotFound { href: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResolveError {
    pub(crate) fn invalid_href(href: impl Into<String>, reason: impl ToString) -> Self {
        ResolveError::InvalidHref {
            href: href.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn fetch(href: impl Into<String>, message: impl ToString) -> Self {
        ResolveError::Fetch {
            href: href.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(href: impl Into<String>, message: impl ToString) -> Self {
        ResolveError::Parse {
            href: href.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ResolveError::invalid_href("http://[::1]a", "invalid port number");
        assert!(err.to_string().contains("http://[::1]a"));

        let err = ResolveError::UnresolvedSelector {
            subcontrol_id: "ac-2.1".to_string(),
        };
        assert_eq!(err.to_string(), "Could not find subcontrol ac-2.1 in catalog");
    }
}
