//! Import-chain resolution
//!
//! Walks profile-to-profile and profile-to-catalog import links, locally
//! or over the network, to collect alterations and to find the catalog at
//! the root of each import.

mod alter;
mod base_path;
mod import;
mod store;
mod validator;

pub use alter::{equate_alter, AlterResolver};
pub use base_path::set_base_path;
pub use import::CatalogImportResolver;
pub use store::DocumentStore;
pub use validator::validate_href;

use crate::error::{ResolveError, Result};
use crate::model::Href;

/// Fail when `href` was already entered on the current branch
pub(crate) fn check_cycle(chain: &[String], href: &Href) -> Result<()> {
    if chain.iter().any(|seen| seen == href.as_str()) {
        return Err(ResolveError::CyclicImport {
            href: href.to_string(),
        });
    }
    Ok(())
}
