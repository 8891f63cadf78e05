use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL,
    DEFAULT_LOGIN_ENDPOINT, DEFAULT_PLATFORM_LOGIN_ENDPOINT, DEFAULT_PLATFORM_LOGIN_ROUTE,
    DEFAULT_PLATFORM_PREFIX, DEFAULT_REFRESH_ENDPOINT, DEFAULT_REGISTER_ENDPOINT,
    DEFAULT_TENANT_LOGIN_ROUTE,
};

// =============================================================================
// Storage Backend Enum
// =============================================================================

/// Durable storage backend for session blobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keychain / credential manager
    Keyring,
    /// Process memory only (nothing survives a restart)
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Keyring => write!(f, "keyring"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Paths of the authentication bootstrap endpoints.
///
/// Requests to these paths never trigger a token refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub login: String,
    pub register: String,
    pub refresh: String,
    pub platform_login: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_ENDPOINT.to_string(),
            register: DEFAULT_REGISTER_ENDPOINT.to_string(),
            refresh: DEFAULT_REFRESH_ENDPOINT.to_string(),
            platform_login: DEFAULT_PLATFORM_LOGIN_ENDPOINT.to_string(),
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Path prefix that routes a request to the platform session
    pub platform_prefix: String,
    /// Transport-level timeout applied by the HTTP client
    pub timeout_secs: u64,
    pub endpoints: AuthEndpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            platform_prefix: DEFAULT_PLATFORM_PREFIX.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            endpoints: AuthEndpoints::default(),
        }
    }
}

/// Navigation surfaces used on forced logout and by route guards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutesConfig {
    pub tenant_login: String,
    pub platform_login: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            tenant_login: DEFAULT_TENANT_LOGIN_ROUTE.to_string(),
            platform_login: DEFAULT_PLATFORM_LOGIN_ROUTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Fully resolved application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub routes: RoutesConfig,
    pub storage: StorageConfig,
}

// =============================================================================
// File Configuration (JSON)
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
pub struct EndpointsFileConfig {
    pub login: Option<String>,
    pub register: Option<String>,
    pub refresh: Option<String>,
    pub platform_login: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ApiFileConfig {
    pub base_url: Option<String>,
    pub platform_prefix: Option<String>,
    pub timeout_secs: Option<u64>,
    pub endpoints: Option<EndpointsFileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RoutesFileConfig {
    pub tenant_login: Option<String>,
    pub platform_login: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StorageFileConfig {
    pub backend: Option<StorageBackend>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub api: Option<ApiFileConfig>,
    pub routes: Option<RoutesFileConfig>,
    pub storage: Option<StorageFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Replace `current` with `other` when `other` is set
fn overlay<T>(current: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *current = other;
    }
}

impl FileConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Names of top-level fields this version does not understand
    pub fn unknown_fields(&self) -> Vec<String> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    pub fn merge(&mut self, other: FileConfig) {
        if let Some(api) = other.api {
            let current = self.api.get_or_insert_with(ApiFileConfig::default);
            overlay(&mut current.base_url, api.base_url);
            overlay(&mut current.platform_prefix, api.platform_prefix);
            overlay(&mut current.timeout_secs, api.timeout_secs);
            if let Some(endpoints) = api.endpoints {
                let current = current
                    .endpoints
                    .get_or_insert_with(EndpointsFileConfig::default);
                overlay(&mut current.login, endpoints.login);
                overlay(&mut current.register, endpoints.register);
                overlay(&mut current.refresh, endpoints.refresh);
                overlay(&mut current.platform_login, endpoints.platform_login);
            }
        }

        if let Some(routes) = other.routes {
            let current = self.routes.get_or_insert_with(RoutesFileConfig::default);
            overlay(&mut current.tenant_login, routes.tenant_login);
            overlay(&mut current.platform_login, routes.platform_login);
        }

        if let Some(storage) = other.storage {
            let current = self.storage.get_or_insert_with(StorageFileConfig::default);
            overlay(&mut current.backend, storage.backend);
        }
    }
}

/// Profile config path (`~/.billdesk/billdesk.json`)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Ensure a route or endpoint path has exactly one leading slash and no trailing one
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{}", trimmed)
}

impl AppConfig {
    /// Load configuration: defaults -> profile file -> local/`--config` file -> CLI/env
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::from_layers(file_config, cli)
    }

    /// Resolve the final configuration from merged file config and CLI/env overrides
    pub fn from_layers(file_config: FileConfig, cli: &CliConfig) -> Result<Self> {
        let file_api = file_config.api.unwrap_or_default();
        let file_endpoints = file_api.endpoints.unwrap_or_default();
        let file_routes = file_config.routes.unwrap_or_default();
        let file_storage = file_config.storage.unwrap_or_default();

        let base_url = cli
            .api_url
            .clone()
            .or(file_api.base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let platform_prefix = cli
            .platform_prefix
            .as_deref()
            .or(file_api.platform_prefix.as_deref())
            .map(normalize_path)
            .unwrap_or_else(|| DEFAULT_PLATFORM_PREFIX.to_string());
        if platform_prefix == "/" {
            anyhow::bail!("Platform prefix cannot be the API root");
        }

        let timeout_secs = cli
            .api_timeout_secs
            .or(file_api.timeout_secs)
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let defaults = AuthEndpoints::default();
        let endpoints = AuthEndpoints {
            login: file_endpoints
                .login
                .map_or(defaults.login, |p| normalize_path(&p)),
            register: file_endpoints
                .register
                .map_or(defaults.register, |p| normalize_path(&p)),
            refresh: file_endpoints
                .refresh
                .map_or(defaults.refresh, |p| normalize_path(&p)),
            platform_login: file_endpoints
                .platform_login
                .map_or(defaults.platform_login, |p| normalize_path(&p)),
        };

        let routes_defaults = RoutesConfig::default();
        let routes = RoutesConfig {
            tenant_login: file_routes
                .tenant_login
                .map_or(routes_defaults.tenant_login, |p| normalize_path(&p)),
            platform_login: file_routes
                .platform_login
                .map_or(routes_defaults.platform_login, |p| normalize_path(&p)),
        };

        let storage = StorageConfig {
            backend: cli
                .storage_backend
                .or(file_storage.backend)
                .unwrap_or_default(),
        };

        let config = Self {
            api: ApiConfig {
                base_url,
                platform_prefix,
                timeout_secs,
                endpoints,
            },
            routes,
            storage,
        };

        tracing::debug!(
            base_url = %config.api.base_url,
            platform_prefix = %config.api.platform_prefix,
            storage = %config.storage.backend,
            "Configuration resolved"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> FileConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_layers(FileConfig::default(), &CliConfig::default()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api.endpoints.refresh, "/auth/refresh");
        assert_eq!(config.routes.platform_login, "/platform/login");
    }

    #[test]
    fn test_file_values_applied() {
        let file = parse(
            r#"{
                "api": {
                    "base_url": "https://api.example.com/v1/",
                    "platform_prefix": "admin-platform/",
                    "endpoints": { "refresh": "auth/token/refresh" }
                },
                "routes": { "tenant_login": "/signin" },
                "storage": { "backend": "memory" }
            }"#,
        );
        let config = AppConfig::from_layers(file, &CliConfig::default()).unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com/v1");
        assert_eq!(config.api.platform_prefix, "/admin-platform");
        assert_eq!(config.api.endpoints.refresh, "/auth/token/refresh");
        assert_eq!(config.api.endpoints.login, "/auth/login");
        assert_eq!(config.routes.tenant_login, "/signin");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse(r#"{ "api": { "base_url": "https://file.example.com" }, "storage": { "backend": "keyring" } }"#);
        let cli = CliConfig {
            api_url: Some("https://cli.example.com".to_string()),
            storage_backend: Some(StorageBackend::File),
            api_timeout_secs: Some(5),
            ..Default::default()
        };
        let config = AppConfig::from_layers(file, &cli).unwrap();

        assert_eq!(config.api.base_url, "https://cli.example.com");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.api.timeout_secs, 5);
    }

    #[test]
    fn test_merge_later_file_wins() {
        let mut base = parse(r#"{ "api": { "base_url": "https://a.example.com", "timeout_secs": 10 } }"#);
        base.merge(parse(r#"{ "api": { "base_url": "https://b.example.com" } }"#));

        let api = base.api.unwrap();
        assert_eq!(api.base_url.as_deref(), Some("https://b.example.com"));
        assert_eq!(api.timeout_secs, Some(10));
    }

    #[test]
    fn test_unknown_fields_reported() {
        let file = parse(r#"{ "apii": {}, "storage": {} }"#);
        assert_eq!(file.unknown_fields(), vec!["apii".to_string()]);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let cli = CliConfig {
            api_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(AppConfig::from_layers(FileConfig::default(), &cli).is_err());
    }

    #[test]
    fn test_root_platform_prefix_rejected() {
        let cli = CliConfig {
            platform_prefix: Some("/".to_string()),
            ..Default::default()
        };
        assert!(AppConfig::from_layers(FileConfig::default(), &cli).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{ "routes": { "platform_login": "/ops/login" } }"#).unwrap();

        let file = FileConfig::load_from_file(&path).unwrap();
        assert_eq!(
            file.routes.unwrap().platform_login.as_deref(),
            Some("/ops/login")
        );
    }
}
