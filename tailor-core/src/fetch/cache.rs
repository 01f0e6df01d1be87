//! Run-scoped memo of network hrefs to downloaded paths

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, trace};

use super::Fetcher;
use crate::error::Result;
use crate::model::Href;

/// Maps network hrefs to local paths for one resolution run.
///
/// The map itself is guarded by a single mutex. Each href owns a cell that
/// is populated once; concurrent misses on the same href wait on that cell
/// instead of issuing a second download. A failed fetch leaves the cell
/// empty so a later call retries. Entries are never evicted.
pub struct ResourceCache {
    fetcher: Arc<dyn Fetcher>,
    entries: Mutex<HashMap<String, Arc<OnceCell<PathBuf>>>>,
}

impl ResourceCache {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Local readable path for `href`.
    ///
    /// Local hrefs are returned as paths without touching the cache.
    pub async fn resolve_local_path(&self, href: &Href) -> Result<PathBuf> {
        if !href.is_network() {
            return Ok(href.to_local_path());
        }

        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(href.as_str().to_string()).or_default())
        };

        if let Some(path) = cell.get() {
            trace!("Resource cache hit for {}", href);
            return Ok(path.clone());
        }

        let path = cell
            .get_or_try_init(|| async {
                debug!("Fetching {} via {}", href, self.fetcher.name());
                self.fetcher.fetch(href).await
            })
            .await?;

        Ok(path.clone())
    }

    /// Number of hrefs with a stored local path
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
