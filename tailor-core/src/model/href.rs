//! Document location references

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Reference to a document: a network URL, an absolute filesystem path,
/// or a path relative to the document that contains it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Href(String);

impl Href {
    pub fn new(href: impl Into<String>) -> Self {
        Href(href.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as an absolute URL. Relative references yield `None`.
    pub fn url(&self) -> Option<Url> {
        Url::parse(&self.0).ok()
    }

    /// Whether this href points at an http(s) resource.
    ///
    /// Malformed URLs that still carry an http scheme count as network
    /// resources so that fetching them fails instead of falling back to
    /// a local read.
    pub fn is_network(&self) -> bool {
        match self.url() {
            Some(url) => matches!(url.scheme(), "http" | "https"),
            None => {
                let lower = self.0.to_ascii_lowercase();
                lower.starts_with("http://") || lower.starts_with("https://")
            }
        }
    }

    /// Filesystem path for a local href. `file://` URLs are converted,
    /// everything else is taken verbatim.
    pub fn to_local_path(&self) -> PathBuf {
        if let Some(url) = self.url() {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return path;
                }
            }
        }
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Href {
    fn from(value: &str) -> Self {
        Href::new(value)
    }
}

impl From<String> for Href {
    fn from(value: String) -> Self {
        Href(value)
    }
}

impl From<Url> for Href {
    fn from(value: Url) -> Self {
        Href(value.to_string())
    }
}
