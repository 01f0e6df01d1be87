//! Concurrent search for the catalog at the root of an import

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::debug;

use super::base_path::set_base_path;
use super::validator::validate_href;
use super::check_cycle;
use super::store::DocumentStore;
use crate::document::Document;
use crate::error::{ResolveError, Result};
use crate::model::{Catalog, Href, Import};

/// Follows an import through any number of intermediate profiles until a
/// catalog is reached.
///
/// When an intermediate profile has several imports they are explored
/// concurrently and the first catalog produced wins. Remaining branches are
/// dropped, which stops their further expansion; a request already on the
/// wire is simply abandoned. A failing branch does not stop its siblings.
/// If every branch fails, the first failure observed is returned.
pub struct CatalogImportResolver {
    documents: Arc<DocumentStore>,
}

impl CatalogImportResolver {
    pub fn new(documents: Arc<DocumentStore>) -> Self {
        Self { documents }
    }

    pub async fn find_catalog(&self, import: &Import) -> Result<Catalog> {
        let href = validate_href(import.href.as_ref())?;
        self.resolve_branch(href.clone(), Vec::new()).await
    }

    fn resolve_branch(&self, href: Href, chain: Vec<String>) -> BoxFuture<'_, Result<Catalog>> {
        async move {
            check_cycle(&chain, &href)?;

            let profile = match self.documents.load(&href).await?.as_ref() {
                Document::Catalog(catalog) => {
                    debug!("Reached catalog '{}' at {}", catalog.title, href);
                    return Ok(catalog.clone());
                }
                Document::Profile(profile) => set_base_path(profile.clone(), href.as_str())?,
            };

            debug!(
                "{} is a profile with {} imports, descending",
                href,
                profile.imports.len()
            );

            let mut chain = chain;
            chain.push(href.to_string());

            let mut branches: FuturesUnordered<_> = profile
                .imports
                .iter()
                .map(|import| {
                    let chain = chain.clone();
                    async move {
                        let child = validate_href(import.href.as_ref())?.clone();
                        self.resolve_branch(child, chain).await
                    }
                })
                .collect();

            let mut first_error = None;
            while let Some(result) = branches.next().await {
                match result {
                    Ok(catalog) => return Ok(catalog),
                    Err(e) => {
                        debug!("Import branch under {} failed: {}", href, e);
                        first_error.get_or_insert(e);
                    }
                }
            }

            Err(first_error.unwrap_or(ResolveError::CatalogNotFound {
                href: href.to_string(),
            }))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SerdeDocumentParser;
    use crate::engine::HttpConfig;
    use crate::fetch::{Fetcher, HttpFetcher, ResourceCache};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn resolver_with(fetcher: Arc<dyn Fetcher>) -> CatalogImportResolver {
        let resources = Arc::new(ResourceCache::new(fetcher));
        CatalogImportResolver::new(Arc::new(DocumentStore::new(
            resources,
            Arc::new(SerdeDocumentParser),
        )))
    }

    fn resolver() -> CatalogImportResolver {
        resolver_with(Arc::new(
            HttpFetcher::new(&HttpConfig::default(), None).unwrap(),
        ))
    }

    /// Serves the routed URLs from disk and never answers for any other
    #[derive(Default)]
    struct StallingFetcher {
        routes: HashMap<String, PathBuf>,
    }

    impl StallingFetcher {
        fn route(mut self, url: &str, path: PathBuf) -> Self {
            self.routes.insert(url.to_string(), path);
            self
        }
    }

    #[async_trait]
    impl Fetcher for StallingFetcher {
        async fn fetch(&self, href: &Href) -> Result<PathBuf> {
            match self.routes.get(href.as_str()) {
                Some(path) => Ok(path.clone()),
                None => std::future::pending().await,
            }
        }

        fn name(&self) -> &'static str {
            "stalling"
        }
    }

    #[tokio::test]
    async fn test_missing_href_fails() {
        let result = resolver().find_catalog(&Import::default()).await;
        assert!(matches!(result, Err(ResolveError::InvalidHref { .. })));
    }

    #[tokio::test]
    async fn test_empty_href_fails() {
        let result = resolver().find_catalog(&Import::new("")).await;
        assert!(matches!(result, Err(ResolveError::InvalidHref { .. })));
    }

    #[tokio::test]
    async fn test_direct_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"catalog": {"title": "Direct", "groups": []}}"#,
        )
        .unwrap();

        let catalog = resolver()
            .find_catalog(&Import::new(path.to_string_lossy().as_ref()))
            .await
            .unwrap();
        assert_eq!(catalog.title, "Direct");
    }

    #[tokio::test]
    async fn test_profile_without_imports_has_no_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"profile": {"imports": []}}"#).unwrap();

        let result = resolver()
            .find_catalog(&Import::new(path.to_string_lossy().as_ref()))
            .await;
        assert!(matches!(result, Err(ResolveError::CatalogNotFound { .. })));
    }

    #[tokio::test]
    async fn test_self_import_is_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.json");
        std::fs::write(&path, r#"{"profile": {"imports": [{"href": "loop.json"}]}}"#).unwrap();

        let result = resolver()
            .find_catalog(&Import::new(path.to_string_lossy().as_ref()))
            .await;
        assert!(matches!(result, Err(ResolveError::CyclicImport { .. })));
    }

    #[tokio::test]
    async fn test_pending_sibling_does_not_delay_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.json");
        std::fs::write(&catalog, r#"{"catalog": {"title": "Baseline", "groups": []}}"#).unwrap();
        let middle = dir.path().join("moderate.json");
        std::fs::write(
            &middle,
            r#"{"profile": {"imports": [
                {"href": "https://controls.test/v1/slow.json"},
                {"href": "catalog.json"}
            ]}}"#,
        )
        .unwrap();

        let resolver = resolver_with(Arc::new(StallingFetcher::default()));

        let found = tokio::time::timeout(
            Duration::from_secs(5),
            resolver.find_catalog(&Import::new(middle.to_string_lossy().as_ref())),
        )
        .await
        .expect("a pending sibling must not hold back the catalog")
        .unwrap();
        assert_eq!(found.title, "Baseline");
    }

    #[tokio::test]
    async fn test_pending_network_sibling_under_network_parent() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.json");
        std::fs::write(&catalog, r#"{"catalog": {"title": "Baseline", "groups": []}}"#).unwrap();
        let middle = dir.path().join("moderate.json");
        std::fs::write(
            &middle,
            r#"{"profile": {"imports": [{"href": "slow.json"}, {"href": "catalog.json"}]}}"#,
        )
        .unwrap();

        // both imports resolve next to the parent URL; slow.json is never answered
        let resolver = resolver_with(Arc::new(
            StallingFetcher::default()
                .route("https://controls.test/v1/moderate.json", middle)
                .route("https://controls.test/v1/catalog.json", catalog),
        ));

        let found = tokio::time::timeout(
            Duration::from_secs(5),
            resolver.find_catalog(&Import::new("https://controls.test/v1/moderate.json")),
        )
        .await
        .expect("a pending sibling must not hold back the catalog")
        .unwrap();
        assert_eq!(found.title, "Baseline");
    }
}
