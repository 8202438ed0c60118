//! Configuration loading and config file resolution

use crate::models::PasswordPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "BRIDGE_CONFIG";

/// Environment variable overriding `database_path`
pub const DATABASE_PATH_ENV_VAR: &str = "BRIDGE_DATABASE_PATH";

/// Settings shared by Bridge tools
///
/// Every field has a default, so a partial (or missing) TOML file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    pub password_policy: PasswordPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            database_path: get_default_data_folder().join("bridge.db"),
            log_level: "info".to_string(),
            password_policy: PasswordPolicy::default(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve and load the effective configuration
    ///
    /// A missing config file is not an error: compiled defaults are used and
    /// a warning is logged. Environment overrides are applied last.
    pub fn resolve(cli_arg: Option<&str>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)?
            }
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(DATABASE_PATH_ENV_VAR) {
            if !path.trim().is_empty() {
                self.database_path = PathBuf::from(path);
            }
        }
    }
}

/// Config file resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config directory, if the file exists
///
/// `None` means compiled defaults apply.
pub fn resolve_config_path(cli_arg: Option<&str>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file
    dirs::config_dir()
        .map(|d| d.join("bridge").join("config.toml"))
        .filter(|path| path.exists())
}

/// Get OS-dependent default data folder path
fn get_default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/bridge (or /var/lib/bridge for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("bridge"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/bridge"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/bridge
        dirs::data_dir()
            .map(|d| d.join("bridge"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/bridge"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\bridge
        dirs::data_local_dir()
            .map(|d| d.join("bridge"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\bridge"))
    } else {
        PathBuf::from("./bridge_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BridgeConfig::from_toml_str("log_level = \"debug\"").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.password_policy, PasswordPolicy::default());
        assert!(config.database_path.ends_with("bridge.db"));
    }

    #[test]
    fn test_password_policy_section() {
        let config = BridgeConfig::from_toml_str(
            r#"
            database_path = "/tmp/accounts.db"

            [password_policy]
            min_length = 12
            symbol_required = false
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/accounts.db"));
        assert_eq!(config.password_policy.min_length, 12);
        assert!(!config.password_policy.symbol_required);
        // Fields absent from the section keep the policy defaults
        assert!(config.password_policy.numeric_required);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = BridgeConfig::from_toml_str("log_level = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
