//! Test helper functions for integration tests
//!
//! Shared across test files using the tests/common/ pattern.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};

use tailor_core::document::SerdeDocumentParser;
use tailor_core::error::ResolveError;
use tailor_core::fetch::Fetcher;
use tailor_core::merge::ControlFamily;
use tailor_core::model::Href;
use tailor_core::{Engine, EngineConfig};

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Write a document into `dir` and return its path
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// Path as an href string
pub fn href_of(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Serves network hrefs from local files and counts every fetch
#[derive(Default)]
pub struct RoutingFetcher {
    routes: HashMap<String, PathBuf>,
    calls: Mutex<HashMap<String, usize>>,
}

impl RoutingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, path: PathBuf) -> Self {
        self.routes.insert(url.to_string(), path);
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for RoutingFetcher {
    async fn fetch(&self, href: &Href) -> tailor_core::Result<PathBuf> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(href.as_str().to_string())
            .or_insert(0) += 1;

        self.routes
            .get(href.as_str())
            .cloned()
            .ok_or_else(|| ResolveError::Fetch {
                href: href.to_string(),
                message: "404 Not Found".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "routing"
    }
}

/// Engine backed by the default parser and NIST id mapping
pub fn engine_with_fetcher(fetcher: Arc<dyn Fetcher>) -> Engine {
    Engine::with_components(
        EngineConfig::default(),
        fetcher,
        Arc::new(SerdeDocumentParser),
        ControlFamily::Nist.mapper(),
    )
}

/// Engine for local-only fixtures
pub fn local_engine() -> Engine {
    engine_with_fetcher(Arc::new(RoutingFetcher::new()))
}

/// Access-control catalog with a policy control, an account control with
/// one enhancement, and a separate audit group
pub const BASELINE_CATALOG: &str = r#"{
  "catalog": {
    "title": "Baseline Controls",
    "groups": [
      {
        "id": "ac",
        "title": "Access Control",
        "controls": [
          {
            "id": "ac-1",
            "title": "Policy and Procedures",
            "params": [{"id": "ac-1_prm_1", "label": "frequency"}],
            "parts": [
              {"id": "ac-1_smt", "class": "statement", "prose": "Review the policy <insert param-id=\"ac-1_prm_1\"/>."},
              {"id": "ac-1_gdn", "class": "guidance", "prose": "Policies evolve."}
            ]
          },
          {
            "id": "ac-2",
            "title": "Account Management",
            "parts": [{"id": "ac-2_smt", "class": "statement", "prose": "Manage accounts."}],
            "subcontrols": [
              {"id": "ac-2.1", "title": "Automated Management"},
              {"id": "ac-2.2", "title": "Removal of Temporary Accounts"}
            ]
          }
        ]
      },
      {
        "id": "au",
        "title": "Audit",
        "controls": [{"id": "au-1", "title": "Audit Policy"}]
      }
    ]
  }
}"#;
