//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `CRUDE_`, nesting separator `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/crude/{service_name}/config.toml
//! 4. System directory: /etc/crude/{service_name}/config.toml
//! 5. Default values
//!
//! ```toml
//! [service]
//! name = "blog"
//! log_level = "debug"
//!
//! [crud]
//! url_field = "slug"
//! paginate_limit = 20
//! own_user = true
//! own_user_request_property = "userId"
//! own_user_schema_property = "owner"
//!
//! [crud.labels]
//! createdAt = "Published"
//! ```
//!
//! `CRUDE_CRUD__PAGINATE_LIMIT=50` overrides `crud.paginate_limit`.
//! Callback options (`sanitize_result`, `paginate_query`) cannot be expressed
//! in files; add them with [`CrudOptions::reconfigure`].

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::options::CrudOptions;

/// Directory name under XDG and /etc
const CONFIG_PREFIX: &str = "crude";

/// Environment variable prefix
const ENV_PREFIX: &str = "CRUDE_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Dispatcher options
    #[serde(default)]
    pub crud: CrudOptions,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, used in logs
    pub name: String,

    /// Log filter directive, e.g. `info` or `crude=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: CONFIG_PREFIX.to_string(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if a source cannot be parsed and
    /// [`crate::Error::InvalidOptions`] if the loaded options are invalid.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| CONFIG_PREFIX.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let defaults = Config {
            service: ServiceConfig {
                name: service_name.to_string(),
                ..ServiceConfig::default()
            },
            ..Config::default()
        };
        let mut figment = Figment::new().merge(Serialized::defaults(defaults));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path; environment variables still apply.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()));

        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self> {
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.crud.validate()?;
        Ok(config)
    }

    /// Candidate config files, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let config_file_path = Path::new(service_name).join("config.toml");
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_PREFIX);
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(CONFIG_PREFIX).join(config_file_path));
        paths
    }
}
