//! Resolution engine
//!
//! Drives one resolution run per call: collect alterations across the
//! import chain, fetch the root catalog of every top-level import
//! concurrently, then merge alterations and parameter settings into each
//! catalog and keep only the selected controls.
//!
//! Each run gets its own [`ResourceCache`] and [`DocumentStore`], so every
//! document is downloaded and parsed once per run and runs never share
//! state.

pub mod config;

pub use config::{EngineConfig, HttpConfig};

use futures::future::{join_all, try_join_all};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::document::{Document, DocumentParser, SerdeDocumentParser};
use crate::error::{ResolveError, Result};
use crate::fetch::{Fetcher, HttpFetcher, ResourceCache};
use crate::merge::{ControlIdMapper, Processor};
use crate::model::{Alter, Catalog, Import, Profile};
use crate::resolve::{
    set_base_path, validate_href, AlterResolver, CatalogImportResolver, DocumentStore,
};

/// Resolves profiles into tailored catalogs
pub struct Engine {
    config: EngineConfig,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn DocumentParser>,
    mapper: Arc<dyn ControlIdMapper>,
}

/// Resolvers sharing one run-scoped cache
struct Run {
    alters: AlterResolver,
    imports: CatalogImportResolver,
}

impl Engine {
    /// Engine with the HTTP fetcher, the JSON/YAML parser and the id mapper
    /// selected by `config.control_family`
    pub fn new(config: EngineConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http, config.download_dir.clone())?;
        let mapper = config.control_family.mapper();
        Ok(Self::with_components(
            config,
            Arc::new(fetcher),
            Arc::new(SerdeDocumentParser),
            mapper,
        ))
    }

    pub fn with_components(
        config: EngineConfig,
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn DocumentParser>,
        mapper: Arc<dyn ControlIdMapper>,
    ) -> Self {
        Self {
            config,
            fetcher,
            parser,
            mapper,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn start_run(&self) -> Run {
        let resources = Arc::new(ResourceCache::new(Arc::clone(&self.fetcher)));
        let documents = Arc::new(DocumentStore::new(resources, Arc::clone(&self.parser)));
        Run {
            alters: AlterResolver::new(Arc::clone(&documents)),
            imports: CatalogImportResolver::new(documents),
        }
    }

    /// Read a top-level profile from disk. Its imports are rewritten
    /// against the profile's own location.
    pub async fn load_profile(&self, path: impl AsRef<Path>) -> Result<Profile> {
        let path = path.as_ref();
        let location = path.to_string_lossy();
        let bytes = tokio::fs::read(path).await.map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match self.parser.parse(&bytes) {
            Ok(Document::Profile(profile)) => set_base_path(profile, &location),
            Ok(other) => Err(ResolveError::parse(
                location.to_string(),
                format!("expected a profile, found a {}", other.kind()),
            )),
            Err(e) => Err(ResolveError::parse(location.to_string(), e)),
        }
    }

    /// Every alteration reachable from the profile's selectors
    pub async fn alterations(&self, profile: &Profile) -> Result<Vec<Alter>> {
        self.start_run().alters.get_alterations(profile).await
    }

    /// The catalog at the root of one import
    pub async fn find_catalog(&self, import: &Import) -> Result<Catalog> {
        self.start_run().imports.find_catalog(import).await
    }

    /// Apply alterations and the profile's parameter settings to a fetched
    /// catalog and keep the controls the import selects
    pub fn process_import(
        &self,
        catalog: Catalog,
        alterations: &[Alter],
        profile: &Profile,
        import: &Import,
    ) -> Result<Catalog> {
        let mut processor = Processor::new(catalog, Arc::clone(&self.mapper));
        processor.process_alterations(alterations);
        processor.process_set_params(&profile.modify.set_params);
        processor.mapped_catalog_for_import(import)
    }

    /// Resolve according to `config.fail_fast`: either all catalogs or the
    /// first error, or one outcome per import with failures logged
    pub async fn resolve(&self, profile: &Profile) -> Result<Vec<Catalog>> {
        if self.config.fail_fast {
            return self.create_catalogs_from_profile(profile).await;
        }

        let outcomes = self.create_catalogs_isolated(profile).await?;
        Ok(outcomes
            .into_iter()
            .zip(&profile.imports)
            .filter_map(|(outcome, import)| match outcome {
                Ok(catalog) => Some(catalog),
                Err(e) => {
                    warn!("Skipping import {:?}: {}", import.href, e);
                    None
                }
            })
            .collect())
    }

    /// One tailored catalog per top-level import, in import order. The
    /// first failure anywhere aborts the whole operation.
    pub async fn create_catalogs_from_profile(&self, profile: &Profile) -> Result<Vec<Catalog>> {
        let started = Instant::now();
        let run = self.start_run();

        info!("Fetching alterations...");
        let alterations = run.alters.get_alterations(profile).await?;
        info!("Fetching alterations from import chain complete");

        for import in &profile.imports {
            validate_href(import.href.as_ref())?;
        }

        debug!("Processing alterations and parameters, mapping to controls");
        let catalogs = try_join_all(
            profile
                .imports
                .iter()
                .map(|import| self.resolve_import(&run, &alterations, profile, import)),
        )
        .await?;

        info!(
            "Successfully mapped controls in {:.3} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(catalogs)
    }

    /// Like [`Engine::create_catalogs_from_profile`] but each import succeeds
    /// or fails on its own. Only a failed alteration lookup, which every
    /// import depends on, fails the whole call.
    pub async fn create_catalogs_isolated(
        &self,
        profile: &Profile,
    ) -> Result<Vec<Result<Catalog>>> {
        let started = Instant::now();
        let run = self.start_run();
        let alterations = run.alters.get_alterations(profile).await?;

        let outcomes = join_all(
            profile
                .imports
                .iter()
                .map(|import| self.resolve_import(&run, &alterations, profile, import)),
        )
        .await;

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        info!(
            "Resolved {} of {} imports in {:.3} seconds",
            outcomes.len() - failed,
            outcomes.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(outcomes)
    }

    async fn resolve_import(
        &self,
        run: &Run,
        alterations: &[Alter],
        profile: &Profile,
        import: &Import,
    ) -> Result<Catalog> {
        let catalog = run.imports.find_catalog(import).await?;
        debug!(
            "Import {:?} resolved to catalog '{}'",
            import.href.as_ref().map(|h| h.as_str()),
            catalog.title
        );
        self.process_import(catalog, alterations, profile, import)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Call, Modify};
    use std::path::PathBuf;

    const CATALOG: &str = r#"{
        "catalog": {
            "title": "Baseline",
            "groups": [{
                "id": "ac",
                "title": "Access Control",
                "controls": [
                    {
                        "id": "ac-1",
                        "title": "Policy",
                        "parts": [{"id": "ac-1_smt", "class": "statement", "prose": "Review every <param ac-1_prm_1>."}]
                    },
                    {"id": "ac-2", "title": "Accounts"}
                ]
            }]
        }
    }"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_load_profile_rewrites_imports() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "profile.json",
            r#"{"profile": {"imports": [{"href": "catalog.json"}]}}"#,
        );

        let profile = engine().load_profile(&path).await.unwrap();
        let href = profile.imports[0].href.as_ref().unwrap();
        assert_eq!(
            PathBuf::from(href.as_str()),
            dir.path().join("catalog.json")
        );
    }

    #[tokio::test]
    async fn test_load_profile_rejects_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "catalog.json", CATALOG);

        let err = engine().load_profile(&path).await.unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
        assert!(err.to_string().contains("found a catalog"));
    }

    #[tokio::test]
    async fn test_load_profile_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = engine().load_profile(dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(ResolveError::Io { .. })));
    }

    #[tokio::test]
    async fn test_create_catalogs_applies_alterations_and_params() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "catalog.json", CATALOG);
        let path = write(
            dir.path(),
            "profile.json",
            r#"{
                "profile": {
                    "imports": [{
                        "href": "catalog.json",
                        "include": {"id-selectors": [{"control-id": "ac-1"}]}
                    }],
                    "modify": {
                        "alterations": [{
                            "control-id": "ac-1",
                            "additions": [{"parts": [{"id": "ac-1_gdn", "class": "guidance", "prose": "Tailored."}]}]
                        }],
                        "set-params": [{"id": "ac-1_prm_1", "constraints": [{"value": "quarter"}]}]
                    }
                }
            }"#,
        );

        let engine = engine();
        let profile = engine.load_profile(&path).await.unwrap();
        let catalogs = engine.create_catalogs_from_profile(&profile).await.unwrap();

        assert_eq!(catalogs.len(), 1);
        let groups = &catalogs[0].groups;
        assert_eq!(groups.len(), 1);
        let controls = &groups[0].controls;
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].id, "ac-1");
        assert_eq!(
            controls[0].parts[0].prose.as_deref(),
            Some("Review every quarter.")
        );
        assert!(controls[0].parts.iter().any(|p| p.class == "guidance"));
    }

    #[tokio::test]
    async fn test_fail_fast_rejects_invalid_href_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write(dir.path(), "catalog.json", CATALOG);
        let profile = Profile {
            imports: vec![
                Import::with_calls(catalog.to_string_lossy().as_ref(), vec![Call::control("ac-2")]),
                Import::default(),
            ],
            ..Default::default()
        };

        let result = engine().create_catalogs_from_profile(&profile).await;
        assert!(matches!(result, Err(ResolveError::InvalidHref { .. })));
    }

    #[tokio::test]
    async fn test_isolated_keeps_successful_imports() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write(dir.path(), "catalog.json", CATALOG);
        let profile = Profile {
            imports: vec![
                Import::new(dir.path().join("missing.json").to_string_lossy().as_ref()),
                Import::with_calls(catalog.to_string_lossy().as_ref(), vec![Call::control("ac-2")]),
            ],
            modify: Modify {
                alterations: vec![Alter::control("ac-2", Vec::new())],
                ..Default::default()
            },
            ..Default::default()
        };

        let outcomes = engine().create_catalogs_isolated(&profile).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], Err(ResolveError::Fetch { .. })));
        let tailored = outcomes[1].as_ref().unwrap();
        assert_eq!(tailored.groups[0].controls[0].id, "ac-2");
    }

    #[tokio::test]
    async fn test_resolve_follows_fail_fast_setting() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write(dir.path(), "catalog.json", CATALOG);
        let profile = Profile {
            imports: vec![
                Import::new(dir.path().join("missing.json").to_string_lossy().as_ref()),
                Import::with_calls(catalog.to_string_lossy().as_ref(), vec![Call::control("ac-1")]),
            ],
            modify: Modify {
                alterations: vec![Alter::control("ac-1", Vec::new())],
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(engine().resolve(&profile).await.is_err());

        let lenient = Engine::new(EngineConfig {
            fail_fast: false,
            ..Default::default()
        })
        .unwrap();
        let catalogs = lenient.resolve(&profile).await.unwrap();
        assert_eq!(catalogs.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_profile_yields_no_catalogs() {
        let catalogs = engine()
            .create_catalogs_from_profile(&Profile::default())
            .await
            .unwrap();
        assert!(catalogs.is_empty());
    }
}
