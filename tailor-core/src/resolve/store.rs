//! Run-scoped memo of parsed documents

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, trace};

use crate::document::{Document, DocumentParser};
use crate::error::{ResolveError, Result};
use crate::fetch::ResourceCache;
use crate::model::Href;

/// Reads and parses each href at most once per resolution run.
///
/// Both resolvers walk the same import chain, the alteration search once
/// per selector, so without this every selector would re-read and re-parse
/// every document on the chain. Documents are shared read-only; callers
/// clone what they need to modify. Failed loads are not remembered.
pub struct DocumentStore {
    resources: Arc<ResourceCache>,
    parser: Arc<dyn DocumentParser>,
    documents: Mutex<HashMap<String, Arc<OnceCell<Arc<Document>>>>>,
}

impl DocumentStore {
    pub fn new(resources: Arc<ResourceCache>, parser: Arc<dyn DocumentParser>) -> Self {
        Self {
            resources,
            parser,
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch (through the resource cache) and parse the document behind `href`
    pub async fn load(&self, href: &Href) -> Result<Arc<Document>> {
        let cell = {
            let mut documents = self.documents.lock().await;
            Arc::clone(documents.entry(href.as_str().to_string()).or_default())
        };

        if let Some(document) = cell.get() {
            trace!("Document cache hit for {}", href);
            return Ok(Arc::clone(document));
        }

        let document = cell
            .get_or_try_init(|| async {
                let path = self.resources.resolve_local_path(href).await?;
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    ResolveError::fetch(href.as_str(), format!("{}: {e}", path.display()))
                })?;
                let document = self
                    .parser
                    .parse(&bytes)
                    .map_err(|e| ResolveError::parse(href.as_str(), e))?;
                debug!("Parsed {} from {}", document.kind(), href);
                Ok::<_, ResolveError>(Arc::new(document))
            })
            .await?;

        Ok(Arc::clone(document))
    }

    /// Number of documents parsed so far
    pub async fn len(&self) -> usize {
        let documents = self.documents.lock().await;
        documents.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Parser that counts its calls, for asserting how often documents are parsed
#[cfg(test)]
#[derive(Default)]
pub(crate) struct CountingParser {
    pub(crate) calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl DocumentParser for CountingParser {
    fn parse(&self, source: &[u8]) -> std::result::Result<Document, crate::document::DocumentError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        crate::document::SerdeDocumentParser.parse(source)
    }
}
