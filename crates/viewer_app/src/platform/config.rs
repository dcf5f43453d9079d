//! Application settings, read from an optional RON file.
//!
//! Looks for `ast_viewer.ron` in the working directory unless
//! `AST_VIEWER_CONFIG` names another file. `AST_VIEWER_BACKEND_URL` overrides
//! the backend address. Fields missing from the file keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;
use viewer_engine::{BackendSettings, EngineConfig};
use viewer_logging::LogDestination;

const CONFIG_FILENAME: &str = "ast_viewer.ron";
const CONFIG_PATH_ENV: &str = "AST_VIEWER_CONFIG";
const BACKEND_URL_ENV: &str = "AST_VIEWER_BACKEND_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub save_debounce_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_image_bytes: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            backend_url: backend.base_url,
            save_debounce_ms: 500,
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            max_image_bytes: backend.max_image_bytes,
            log_level: "info".to_string(),
            log_file: None,
            window_width: 1200.0,
            window_height: 760.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl AppConfig {
    /// Resolves the config path and environment overrides from the process.
    /// On error the defaults are returned alongside it.
    pub fn load() -> (Self, Option<ConfigError>) {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
        let backend_url = std::env::var(BACKEND_URL_ENV).ok();
        match Self::load_from(&path) {
            Ok(config) => (config.with_backend_override(backend_url), None),
            Err(err) => (Self::default().with_backend_override(backend_url), Some(err)),
        }
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn with_backend_override(mut self, backend_url: Option<String>) -> Self {
        if let Some(url) = backend_url.filter(|url| !url.trim().is_empty()) {
            self.backend_url = url;
        }
        self
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            backend: BackendSettings {
                base_url: self.backend_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                max_image_bytes: self.max_image_bytes,
            },
            save_debounce: Duration::from_millis(self.save_debounce_ms),
        }
    }

    /// Unknown level names fall back to `info`.
    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(self.log_level.trim()).unwrap_or(LevelFilter::Info)
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }
}
