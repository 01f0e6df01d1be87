//! Engine configuration
//!
//! ## Configuration Sources (in precedence order)
//!
//! 1. An explicit file passed by the caller (`--config`)
//! 2. `./tailor.yml` in the working directory
//! 3. `<platform config dir>/tailor/config.yml`
//! 4. Built-in defaults
//!
//! `TAILOR_HTTP_TIMEOUT` (seconds) overrides the HTTP timeout from any source.
//!
//! ```yaml
//! http:
//!   timeout_seconds: 30
//!   user_agent: tailor/0.3.0
//! download_dir: /var/cache/tailor
//! fail_fast: true
//! control_family: nist
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ResolveError, Result};
use crate::merge::ControlFamily;

/// Project-local configuration file name
pub const LOCAL_CONFIG_FILE: &str = "tailor.yml";

/// Environment override for the HTTP timeout
pub const TIMEOUT_ENV_VAR: &str = "TAILOR_HTTP_TIMEOUT";

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("tailor/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_fail_fast() -> bool {
    true
}

/// Settings for network fetches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub http: HttpConfig,

    /// Where downloaded documents are stored; a temporary directory when unset
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Abort the whole run on the first failing import
    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,

    /// Numbering convention used to map parameter and subcontrol ids
    #[serde(default)]
    pub control_family: ControlFamily,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            download_dir: None,
            fail_fast: default_fail_fast(),
            control_family: ControlFamily::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content)
            .map_err(|e| ResolveError::Config(format!("Failed to parse configuration: {e}")))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml_ng::from_str(&content).map_err(|e| {
            ResolveError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration following the documented precedence, then apply
    /// environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::discover() {
                Some(path) => {
                    info!("Using configuration at {}", path.display());
                    Self::load_from_path(&path)?
                }
                None => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        directories::ProjectDirs::from("", "", "tailor")
            .map(|dirs| dirs.config_dir().join("config.yml"))
            .filter(|path| path.is_file())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(TIMEOUT_ENV_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(seconds) => {
                    debug!("{} overrides HTTP timeout: {}s", TIMEOUT_ENV_VAR, seconds);
                    self.http.timeout_seconds = seconds;
                }
                Err(_) => warn!("Ignoring invalid {} value '{}'", TIMEOUT_ENV_VAR, raw),
            }
        }
    }
}
