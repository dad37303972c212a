//! Lectio Configuration
//!
//! Configuration lives in /etc/lectio/config.toml. Every field has a
//! default, so a missing file (or a file with only some sections) is fine.
//!
//! ```toml
//! mode = "local"
//!
//! [corpus]
//! path = "/var/lib/lectio/corpus.json"
//!
//! [remote]
//! backend = "bible-api"
//! translation = "web"
//! timeout_secs = 10
//!
//! [server]
//! bind = "127.0.0.1:7870"
//!
//! [log]
//! level = "info"
//! ```

use crate::corpus::{default_corpus_path, CORPUS_ENV};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// System configuration directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/lectio";
const CONFIG_FILE: &str = "config.toml";

/// Known remote backends
pub const BACKEND_BIBLE_API: &str = "bible-api";
pub const BACKEND_LABS: &str = "labs";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown remote backend '{0}' (expected 'bible-api' or 'labs')")]
    UnknownBackend(String),

    #[error("Cannot build HTTP client: {0}")]
    Http(String),
}

/// Where verses come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Local,
    Remote,
}

impl SourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Local => "local",
            SourceMode::Remote => "remote",
        }
    }
}

/// Local corpus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_path")]
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
        }
    }
}

/// Remote verse service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// "bible-api" or "labs"
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Verse endpoint; defaults per backend
    #[serde(default)]
    pub base_url: Option<String>,

    /// Search endpoint; search fails upstream when unset
    #[serde(default)]
    pub search_url: Option<String>,

    /// Translation code passed to backends that accept one
    #[serde(default)]
    pub translation: Option<String>,

    /// Transport timeout in seconds (valid: 1-120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_backend() -> String {
    BACKEND_BIBLE_API.to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: None,
            search_url: None,
            translation: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl RemoteConfig {
    pub fn effective_base_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.base_url {
            return Ok(url.clone());
        }
        match self.backend.as_str() {
            BACKEND_BIBLE_API => Ok("https://bible-api.com".to_string()),
            BACKEND_LABS => Ok("https://labs.bible.org/api/".to_string()),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }

    /// Clamp timeout to 1-120 seconds
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.clamp(1, 120)
    }
}

/// HTTP daemon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Upper bound on search results per request
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_bind() -> String {
    "127.0.0.1:7870".to_string()
}

fn default_search_limit() -> usize {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            search_limit: default_search_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Complete Lectio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LectioConfig {
    #[serde(default)]
    pub mode: SourceMode,

    #[serde(default)]
    pub corpus: CorpusConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl LectioConfig {
    pub fn system_path() -> PathBuf {
        Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load from a path; a missing file yields defaults, a malformed one an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `LECTIO_CORPUS` wins over the config file
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = std::env::var_os(CORPUS_ENV) {
            self.corpus.path = PathBuf::from(path);
        }
    }
}
