//! Document retrieval
//!
//! A [`Fetcher`] turns an href into a local, re-readable path. The
//! [`ResourceCache`] sits in front of it for the lifetime of one resolution
//! run so every network document is downloaded at most once.

mod cache;
mod http;

pub use cache::ResourceCache;
pub use http::HttpFetcher;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::model::Href;

/// Retrieves the document behind an href and returns a local path to it
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the document. Local hrefs may be returned unchanged.
    async fn fetch(&self, href: &Href) -> Result<PathBuf>;

    /// Fetcher identifier for logging
    fn name(&self) -> &'static str;
}
