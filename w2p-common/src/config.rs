//! Configuration loading and root folder resolution
//!
//! Bootstrap settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file never stops startup; it is logged
//! and the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "W2P_ROOT_FOLDER";

/// Environment variable carrying the Mapbox access token
pub const MAPBOX_TOKEN_ENV: &str = "W2P_MAPBOX_TOKEN";

/// SQLite database file name inside the root folder
pub const DATABASE_FILE: &str = "wish2plan.db";

/// Default HTTP port for w2p-api
pub const DEFAULT_PORT: u16 = 5780;

/// Bootstrap configuration read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Mapbox access token for place lookup
    #[serde(default)]
    pub mapbox_token: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load the platform config file, falling back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = config_file_path() else {
            debug!("No config file found, using built-in defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Locate the config file for the current platform
///
/// On Linux the user file (`~/.config/wish2plan/config.toml`) wins over
/// the system file (`/etc/wish2plan/config.toml`).
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("wish2plan").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/wish2plan/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("wish2plan"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\wish2plan"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("wish2plan"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/wish2plan"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("wish2plan"))
            .unwrap_or_else(|| PathBuf::from("./wish2plan_data"))
    }
}

/// Resolves the root folder through the four configuration tiers
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml: TomlConfig,
}

impl RootFolderResolver {
    pub fn new(toml: TomlConfig) -> Self {
        Self { cli_arg: None, toml }
    }

    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        if let Some(path) = std::env::var_os(ROOT_FOLDER_ENV).filter(|v| !v.is_empty()) {
            debug!("Root folder from {}", ROOT_FOLDER_ENV);
            return PathBuf::from(path);
        }

        if let Some(path) = &self.toml.root_folder {
            debug!("Root folder from config file: {}", path.display());
            return path.clone();
        }

        default_root_folder()
    }
}

/// Prepares the resolved root folder for use
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

/// Pick the Mapbox token: command line or environment, then TOML
///
/// Blank values are ignored at every tier.
pub fn resolve_mapbox_token(cli_or_env: Option<String>, toml: &TomlConfig) -> Option<String> {
    cli_or_env
        .into_iter()
        .chain(toml.mapbox_token.clone())
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
}

/// Pick the HTTP port: command line or environment, then TOML, then default
pub fn resolve_port(cli_or_env: Option<u16>, toml: &TomlConfig) -> u16 {
    cli_or_env.or(toml.port).unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::parse(
            r#"
            root_folder = "/srv/wish2plan"
            port = 6000
            mapbox_token = "pk.test"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.root_folder, Some(PathBuf::from("/srv/wish2plan")));
        assert_eq!(config.port, Some(6000));
        assert_eq!(config.mapbox_token.as_deref(), Some("pk.test"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = TomlConfig::parse("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = TomlConfig::parse("port = \"not a number\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_mapbox_token_priority() {
        let toml = TomlConfig {
            mapbox_token: Some("from-toml".to_string()),
            ..Default::default()
        };

        assert_eq!(
            resolve_mapbox_token(Some("from-cli".to_string()), &toml).as_deref(),
            Some("from-cli")
        );
        assert_eq!(resolve_mapbox_token(None, &toml).as_deref(), Some("from-toml"));
        assert_eq!(
            resolve_mapbox_token(Some("   ".to_string()), &toml).as_deref(),
            Some("from-toml")
        );
        assert_eq!(resolve_mapbox_token(None, &TomlConfig::default()), None);
    }

    #[test]
    fn test_port_priority() {
        let toml = TomlConfig {
            port: Some(7000),
            ..Default::default()
        };
        assert_eq!(resolve_port(Some(8000), &toml), 8000);
        assert_eq!(resolve_port(None, &toml), 7000);
        assert_eq!(resolve_port(None, &TomlConfig::default()), DEFAULT_PORT);
    }

    #[test]
    fn test_database_path_inside_root() {
        let initializer = RootFolderInitializer::new(PathBuf::from("/tmp/w2p"));
        assert_eq!(initializer.database_path(), PathBuf::from("/tmp/w2p/wish2plan.db"));
    }
}
