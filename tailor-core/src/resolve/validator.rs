//! Syntactic href validation. No network or filesystem access.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::error::{ResolveError, Result};
use crate::model::Href;

// Single-letter schemes are Windows drive letters, not URLs.
static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").expect("static regex"));

// A `%` not followed by two hex digits
static BAD_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:[0-9A-Fa-f][^0-9A-Fa-f]|[^0-9A-Fa-f]|[0-9A-Fa-f]?$)").expect("static regex")
});

/// Check that an href is present and parses as a URL or path reference.
pub fn validate_href(href: Option<&Href>) -> Result<&Href> {
    let href = href.ok_or_else(|| ResolveError::invalid_href("", "href cannot be empty"))?;
    validate_str(href.as_str())?;
    Ok(href)
}

/// Validation for raw location strings such as a parent document path.
/// An empty parent is allowed and means the working directory.
pub(crate) fn validate_location(location: &str) -> Result<()> {
    if location.is_empty() {
        return Ok(());
    }
    validate_str(location)
}

fn validate_str(raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(ResolveError::invalid_href(raw, "href cannot be empty"));
    }

    if raw.chars().any(|c| c.is_control()) {
        return Err(ResolveError::invalid_href(
            raw,
            "contains control characters",
        ));
    }

    if let Some(escape) = BAD_ESCAPE.find(raw) {
        return Err(ResolveError::invalid_href(
            raw,
            format!("invalid URL escape \"{}\"", escape.as_str()),
        ));
    }

    if raw.starts_with(':') {
        return Err(ResolveError::invalid_href(raw, "missing protocol scheme"));
    }

    if SCHEME.is_match(raw) {
        Url::parse(raw).map_err(|e| ResolveError::invalid_href(raw, e))?;
    }

    Ok(())
}
