//! Application configuration assembled from defaults, a TOML file and the
//! environment.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the platform config/data roots used by Rentour.
pub const APP_DIR: &str = "rentour";

/// Prefix for environment overrides (`RENTOUR_OWNER__EMAIL`, ...).
pub const ENV_PREFIX: &str = "RENTOUR";

/// Avatar shown for the owner profile when none is configured.
pub const DEFAULT_AVATAR: &str = "assets/user_profile.png";

const DEFAULT_CONFIG: &str = r#"# Rentour configuration.
# Every key can also be set through the environment, e.g.
#   RENTOUR_OWNER__EMAIL, RENTOUR_OWNER__PASSWORD, RENTOUR_OWNER__NAME,
#   RENTOUR_CATALOG__API_URL

currency = "₱"

[owner]
# email = "owner@example.com"
# password = "change-me"
name = "Owner"

[catalog]
# api_url = "http://localhost:3000"
timeout_secs = 10
"#;

/// Owner credentials and the profile details issued on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// Expected login email. Login always fails while unset.
    #[serde(default)]
    pub email: Option<String>,
    /// Expected login password. Login always fails while unset.
    #[serde(default)]
    pub password: Option<String>,
    /// Display name placed in the profile on successful login.
    #[serde(default = "default_owner_name")]
    pub name: String,
    /// Profile image reference.
    #[serde(default = "default_avatar")]
    pub avatar: String,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            name: default_owner_name(),
            avatar: default_avatar(),
        }
    }
}

/// Optional backend the catalog can be fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL serving `/api/cars` and `/api/tours`.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Owner login settings.
    #[serde(default)]
    pub owner: OwnerConfig,
    /// Remote catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// File backing the durable key-value store.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Currency symbol used when rendering prices.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            owner: OwnerConfig::default(),
            catalog: CatalogConfig::default(),
            storage_path: default_storage_path(),
            currency: default_currency(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) layered under the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        Ok(config)
    }

    /// Whether both owner credentials are configured.
    pub fn owner_login_enabled(&self) -> bool {
        self.owner.email.is_some() && self.owner.password.is_some()
    }
}

/// Default configuration file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

fn default_owner_name() -> String {
    "Owner".to_string()
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_currency() -> String {
    "₱".to_string()
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
currency = "$"
storage_path = "/tmp/rentour-test.json"

[owner]
email = "owner@example.com"
password = "secret"
name = "Fleet Owner"

[catalog]
api_url = "http://localhost:3000"
timeout_secs = 3
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.currency, "$");
        assert_eq!(config.owner.email.as_deref(), Some("owner@example.com"));
        assert_eq!(config.owner.password.as_deref(), Some("secret"));
        assert_eq!(config.owner.name, "Fleet Owner");
        assert_eq!(config.owner.avatar, DEFAULT_AVATAR);
        assert_eq!(
            config.catalog.api_url.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(config.catalog.timeout(), Duration::from_secs(3));
        assert_eq!(config.storage_path, PathBuf::from("/tmp/rentour-test.json"));
        assert!(config.owner_login_enabled());
        Ok(())
    }

    #[test]
    fn default_template_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.owner.name, "Owner");
        assert_eq!(config.catalog.timeout_secs, 10);
        Ok(())
    }
}
