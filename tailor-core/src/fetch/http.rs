//! Network fetcher backed by reqwest

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

use super::Fetcher;
use crate::engine::HttpConfig;
use crate::error::{ResolveError, Result};
use crate::model::Href;

/// Downloads http(s) documents into a download directory.
///
/// Without an explicit directory the fetcher owns a temporary one that is
/// removed when the fetcher is dropped.
pub struct HttpFetcher {
    client: reqwest::Client,
    download_dir: PathBuf,
    _temp_dir: Option<TempDir>,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig, download_dir: Option<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ResolveError::Config(format!("Failed to create HTTP client: {e}")))?;

        let (download_dir, temp_dir) = match download_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir).map_err(|source| ResolveError::Io {
                    path: dir.clone(),
                    source,
                })?;
                (dir, None)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("tailor-downloads")
                    .tempdir()
                    .map_err(|source| ResolveError::Io {
                        path: std::env::temp_dir(),
                        source,
                    })?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        debug!("HTTP downloads stored in {}", download_dir.display());

        Ok(Self {
            client,
            download_dir,
            _temp_dir: temp_dir,
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Stable download location for a URL, keeping its file extension
    fn download_path(&self, url: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        let extension = url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        match extension {
            Some(ext) => self.download_dir.join(format!("{digest}.{ext}")),
            None => self.download_dir.join(digest),
        }
    }
}

/// Stage `bytes` in `dir` and rename over `target`.
///
/// Readers of a previous download at `target` keep seeing the old
/// complete file; they never observe a truncated one.
fn store_download(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, href: &Href) -> Result<PathBuf> {
        if !href.is_network() {
            return Ok(href.to_local_path());
        }

        let url = href.as_str();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::fetch(url, e))?;

        if !response.status().is_success() {
            return Err(ResolveError::fetch(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolveError::fetch(url, format!("failed to read response body: {e}")))?;

        let path = self.download_path(url);
        let size = bytes.len();
        let dir = self.download_dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || store_download(&dir, &target, &bytes))
            .await
            .map_err(|e| ResolveError::fetch(url, format!("download task failed: {e}")))?
            .map_err(|source| ResolveError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Downloaded {} ({} bytes)", url, size);
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
