//! Configuration loading and constants.
//!
//! Loads launcher configuration from a TOML file and defines the defaults used
//! when no file is present: listener and upstream addresses, the package
//! manager commands, the required package set and the application entry point.
//! `AppConfig` is the root configuration struct containing all settings.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Listener and Upstream
// =============================================================================

/// Port the health/redirect listener binds to
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Interface the health/redirect listener binds to
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Host the Python application is expected to serve on
pub const DEFAULT_UPSTREAM_HOST: &str = "localhost";

/// Port the Python application is expected to serve on
pub const DEFAULT_UPSTREAM_PORT: u16 = 3000;

/// Base URL redirects point at when no `[upstream]` section is configured
pub const DEFAULT_UPSTREAM_URL: &str =
    formatcp!("http://{}:{}", DEFAULT_UPSTREAM_HOST, DEFAULT_UPSTREAM_PORT);

/// Liveness path answered by the listener itself
pub const HEALTH_PATH: &str = "/health";

/// Body returned by the health endpoint
pub const HEALTH_BODY: &str = "Application is running";

/// Cache-Control value for every listener response
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Package Manager
// =============================================================================

/// Package manager executable
pub const DEFAULT_PACKAGE_MANAGER: &str = "pip";

/// Packages the playlist generator imports at startup
pub const DEFAULT_REQUIRED_PACKAGES: &[&str] =
    &["flask", "openai", "python-dotenv", "requests", "spotipy"];

// =============================================================================
// Application
// =============================================================================

/// Interpreter used to start the application
pub const DEFAULT_APP_PROGRAM: &str = "python";

/// Application entry file
pub const DEFAULT_APP_ENTRY: &str = "app.py";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "playlist_launcher=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Health/redirect listener
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Where non-health requests are redirected
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Dependency check and installation
    #[serde(default)]
    pub packages: PackagesConfig,
    /// Child application process
    #[serde(default)]
    pub app: LaunchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Location of the child application as seen by clients
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "UpstreamConfig::default_host")]
    pub host: String,
    #[serde(default = "UpstreamConfig::default_port")]
    pub port: u16,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl UpstreamConfig {
    fn default_host() -> String {
        DEFAULT_UPSTREAM_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_UPSTREAM_PORT
    }

    /// Base URL (scheme, host and port) that redirects are built on
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// How required package names are looked up in the listing output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Raw substring search over the whole listing text
    #[default]
    Substring,
    /// Whole, normalised package names parsed from the listing
    Exact,
}

/// Package manager commands and the required package set
#[derive(Debug, Clone, Deserialize)]
pub struct PackagesConfig {
    #[serde(default = "PackagesConfig::default_manager")]
    pub manager: String,
    #[serde(default = "PackagesConfig::default_list_args")]
    pub list_args: Vec<String>,
    #[serde(default = "PackagesConfig::default_install_args")]
    pub install_args: Vec<String>,
    #[serde(default = "PackagesConfig::default_required")]
    pub required: Vec<String>,
    #[serde(rename = "match", default)]
    pub match_mode: MatchMode,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            manager: Self::default_manager(),
            list_args: Self::default_list_args(),
            install_args: Self::default_install_args(),
            required: Self::default_required(),
            match_mode: MatchMode::default(),
        }
    }
}

impl PackagesConfig {
    fn default_manager() -> String {
        DEFAULT_PACKAGE_MANAGER.to_string()
    }

    fn default_list_args() -> Vec<String> {
        vec!["list".to_string()]
    }

    fn default_install_args() -> Vec<String> {
        vec!["install".to_string()]
    }

    fn default_required() -> Vec<String> {
        DEFAULT_REQUIRED_PACKAGES
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}

/// Application process settings
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    #[serde(default = "LaunchConfig::default_program")]
    pub program: String,
    #[serde(default = "LaunchConfig::default_args")]
    pub args: Vec<String>,
    /// Directory the application is started in (default: current directory)
    pub working_dir: Option<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            program: Self::default_program(),
            args: Self::default_args(),
            working_dir: None,
        }
    }
}

impl LaunchConfig {
    fn default_program() -> String {
        DEFAULT_APP_PROGRAM.to_string()
    }

    fn default_args() -> Vec<String> {
        vec![DEFAULT_APP_ENTRY.to_string()]
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load `path`, falling back to built-in defaults when the file is absent.
    ///
    /// A missing file is only tolerated when the path was not given explicitly.
    pub fn load_or_default<P: AsRef<Path>>(path: P, explicit: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation(
                "http.port must be a fixed, non-zero port".to_string(),
            ));
        }
        if self.upstream.port == 0 {
            return Err(ConfigError::Validation(
                "upstream.port must be non-zero".to_string(),
            ));
        }
        if self.packages.required.is_empty() {
            return Err(ConfigError::Validation(
                "packages.required must list at least one package".to_string(),
            ));
        }
        if self.packages.manager.trim().is_empty() {
            return Err(ConfigError::Validation(
                "packages.manager must not be empty".to_string(),
            ));
        }
        if self.app.program.trim().is_empty() {
            return Err(ConfigError::Validation(
                "app.program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.upstream.base_url(), DEFAULT_UPSTREAM_URL);
        assert_eq!(config.packages.manager, "pip");
        assert_eq!(config.packages.list_args, vec!["list"]);
        assert_eq!(config.packages.install_args, vec!["install"]);
        assert_eq!(
            config.packages.required,
            vec!["flask", "openai", "python-dotenv", "requests", "spotipy"]
        );
        assert_eq!(config.packages.match_mode, MatchMode::Substring);
        assert_eq!(config.app.program, "python");
        assert_eq!(config.app.args, vec!["app.py"]);
        assert!(config.app.working_dir.is_none());
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_default_upstream_url() {
        assert_eq!(DEFAULT_UPSTREAM_URL, "http://localhost:3000");
    }

    #[test]
    fn test_partial_config_overrides_only_given_keys() {
        let config = AppConfig::parse(
            r#"
            [http]
            port = 9000

            [packages]
            manager = "pip3"
            match = "exact"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.packages.manager, "pip3");
        assert_eq!(config.packages.match_mode, MatchMode::Exact);
        assert_eq!(config.packages.required.len(), 5);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_empty_required_list_rejected() {
        let err = AppConfig::parse("[packages]\nrequired = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = AppConfig::parse("[http]\nport = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_match_mode_is_parse_error() {
        let err = AppConfig::parse("[packages]\nmatch = \"fuzzy\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_default_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = AppConfig::load_or_default(&path, false).unwrap();
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = AppConfig::load_or_default(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[app]\nprogram = \"python3\"\nworking_dir = \"/srv/app\"").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.app.program, "python3");
        assert_eq!(config.app.working_dir.as_deref(), Some("/srv/app"));
        assert_eq!(config.app.args, vec!["app.py"]);
    }
}
