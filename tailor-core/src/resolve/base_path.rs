//! Rewrites relative import hrefs against the location of the document
//! that declared them

use reqwest::Url;
use std::path::{Component, Path, PathBuf};

use super::validator::{validate_href, validate_location};
use crate::error::{ResolveError, Result};
use crate::model::{Href, Profile};

/// Rewrite every import of `profile` relative to `parent`.
///
/// - network hrefs are left untouched
/// - under a network parent, a local href becomes a sibling of the parent
///   on the same scheme and host (only its final path segment is kept)
/// - under a local parent, the href's file name is joined onto the
///   parent's directory and made absolute
pub fn set_base_path(mut profile: Profile, parent: &str) -> Result<Profile> {
    validate_location(parent)?;
    let parent_href = Href::new(parent);

    for import in &mut profile.imports {
        let href = validate_href(import.href.as_ref())?;

        if href.is_network() {
            continue;
        }

        let rewritten = if parent_href.is_network() {
            let parent_url =
                Url::parse(parent).map_err(|e| ResolveError::invalid_href(parent, e))?;
            Href::from(make_url(&parent_url, href)?)
        } else {
            let dir = parent_dir(&parent_href.to_local_path());
            let joined = dir.join(file_name(&href.to_local_path()));
            Href::new(absolute_path(&joined)?.to_string_lossy().into_owned())
        };

        import.href = Some(rewritten);
    }

    Ok(profile)
}

/// Sibling join: `<scheme>://<host>[:port]<parent dir>/<last segment of child>`
pub(crate) fn make_url(parent: &Url, child: &Href) -> Result<Url> {
    let mut origin = format!("{}://{}", parent.scheme(), parent.host_str().unwrap_or_default());
    if let Some(port) = parent.port() {
        origin.push_str(&format!(":{port}"));
    }

    let path = parent.path();
    let dir = match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    };

    let child_path = child.as_str().trim_end_matches('/');
    let segment = child_path.rsplit('/').next().unwrap_or(child_path);

    let joined = format!("{origin}{dir}/{segment}");
    Url::parse(&joined).map_err(|e| ResolveError::invalid_href(joined.clone(), e))
}

fn parent_dir(parent: &Path) -> PathBuf {
    match parent.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None if parent.has_root() => parent.to_path_buf(),
        None => PathBuf::from("."),
    }
}

fn file_name(path: &Path) -> PathBuf {
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Absolute, lexically cleaned path. The target does not need to exist.
fn absolute_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        cwd.join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Ok(cleaned)
}
