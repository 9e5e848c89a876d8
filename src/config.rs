//! bc-cli configuration loaded from `~/.butler-coffee/config.toml`.
//!
//! [`BcConfig`] holds the API endpoint, the stored tokens and the knobs of
//! the ordering workflow. Values missing from the file use sensible
//! defaults. `BASE_HOSTNAME` and `BC_CLI_DEBUG` take precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.butler.coffee";
const CONFIG_DIR: &str = ".butler-coffee";
const CONFIG_FILE: &str = "config.toml";
const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BcConfig {
    /// Base URL of the Butler Coffee API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,

    /// Access token expiry, unix milliseconds or RFC 3339.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expires_at: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token_expires_at: String,

    /// Smallest monthly total that can be ordered.
    #[serde(default = "default_min_quantity_kg")]
    pub min_quantity_kg: u32,

    /// Largest monthly total that can be ordered.
    #[serde(default = "default_max_quantity_kg")]
    pub max_quantity_kg: u32,

    /// Seconds between payment status checks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seconds to wait for payment before giving up.
    #[serde(default = "default_activation_timeout_secs")]
    pub activation_timeout_secs: u64,

    /// Log request and response bodies.
    #[serde(default)]
    pub debug: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_min_quantity_kg() -> u32 {
    1
}

fn default_max_quantity_kg() -> u32 {
    50
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_activation_timeout_secs() -> u64 {
    300
}

impl Default for BcConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            access_token: String::new(),
            refresh_token: String::new(),
            expires_at: String::new(),
            refresh_token_expires_at: String::new(),
            min_quantity_kg: default_min_quantity_kg(),
            max_quantity_kg: default_max_quantity_kg(),
            poll_interval_secs: default_poll_interval_secs(),
            activation_timeout_secs: default_activation_timeout_secs(),
            debug: false,
        }
    }
}

impl BcConfig {
    /// Location of the config file: `$BC_CLI_CONFIG`, else
    /// `$HOME/.butler-coffee/config.toml`.
    pub fn path() -> PathBuf {
        if let Ok(path) = std::env::var("BC_CLI_CONFIG")
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load from the default location, applying environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::path())?;
        config.apply_env_overrides(
            std::env::var("BASE_HOSTNAME").ok().as_deref(),
            std::env::var("BC_CLI_DEBUG").ok().as_deref(),
        );
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str::<BcConfig>(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply `BASE_HOSTNAME` and `BC_CLI_DEBUG`. An empty host is ignored;
    /// debug is only switched on by exactly `1`.
    fn apply_env_overrides(&mut self, base_hostname: Option<&str>, debug: Option<&str>) {
        if let Some(host) = base_hostname
            && !host.is_empty()
        {
            self.api_url = host.to_string();
        }
        if debug == Some("1") {
            self.debug = true;
        }
    }

    /// Write to [`BcConfig::path`].
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Write the config as TOML, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        restrict_permissions(path)?;
        Ok(())
    }

    /// An access token is stored. Expiry is checked separately.
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Tokens are considered expired 30 seconds early. An unparsable
    /// expiry counts as expired; a missing one never expires.
    pub fn is_token_expired(&self) -> bool {
        if self.expires_at.is_empty() {
            return false;
        }
        match parse_timestamp(&self.expires_at) {
            Some(at) => Utc::now() + chrono::Duration::seconds(30) > at,
            None => true,
        }
    }

    pub fn clear_tokens(&mut self) {
        self.access_token.clear();
        self.refresh_token.clear();
        self.expires_at.clear();
        self.refresh_token_expires_at.clear();
    }

    /// Delay between payment checks, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(MIN_POLL_INTERVAL_SECS))
    }

    /// How long to wait for payment. At least one poll interval, so a zero
    /// timeout still gets one status check.
    pub fn activation_timeout(&self) -> Duration {
        self.poll_interval()
            .max(Duration::from_secs(self.activation_timeout_secs))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Parse a token timestamp: an integer is unix milliseconds, anything else
/// must be RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ms) = value.parse::<i64>() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = BcConfig::default();
        assert_eq!(config.api_url, "https://api.butler.coffee");
        assert_eq!(config.min_quantity_kg, 1);
        assert_eq!(config.max_quantity_kg, 50);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.activation_timeout(), Duration::from_secs(300));
        assert!(!config.debug);
        assert!(!config.is_authenticated());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            access_token = "tok-123"
            max_quantity_kg = 20
        "#;
        let config: BcConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.access_token, "tok-123");
        assert_eq!(config.max_quantity_kg, 20);
        assert_eq!(config.min_quantity_kg, 1);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.is_authenticated());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BcConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BcConfig::default());
    }

    #[test]
    fn save_then_load_keeps_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = BcConfig {
            access_token: "a".into(),
            refresh_token: "r".into(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = BcConfig::load_from(&path).unwrap();
        assert_eq!(loaded.access_token, "a");
        assert_eq!(loaded.refresh_token, "r");
    }

    #[test]
    fn clear_tokens_logs_out() {
        let mut config = BcConfig {
            access_token: "a".into(),
            expires_at: "1".into(),
            ..Default::default()
        };
        config.clear_tokens();
        assert!(!config.is_authenticated());
        assert!(config.expires_at.is_empty());
    }

    #[test]
    fn token_expiry() {
        let mut config = BcConfig::default();
        assert!(!config.is_token_expired());

        config.expires_at = "1000".into();
        assert!(config.is_token_expired());

        config.expires_at = (Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
        assert!(!config.is_token_expired());

        config.expires_at = "garbage".into();
        assert!(config.is_token_expired());
    }

    #[test]
    fn env_overrides_replace_host_and_enable_debug() {
        let mut config = BcConfig::default();
        config.apply_env_overrides(Some("http://localhost:8080"), Some("1"));
        assert_eq!(config.api_url, "http://localhost:8080");
        assert!(config.debug);
    }

    #[test]
    fn empty_or_unset_env_overrides_are_ignored() {
        let mut config = BcConfig::default();
        config.apply_env_overrides(Some(""), Some("true"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.debug);

        config.apply_env_overrides(None, None);
        assert_eq!(config, BcConfig::default());
    }

    #[test]
    fn zero_intervals_are_clamped() {
        let config = BcConfig {
            poll_interval_secs: 0,
            activation_timeout_secs: 0,
            ..BcConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.activation_timeout(), Duration::from_secs(1));

        let config = BcConfig {
            poll_interval_secs: 10,
            activation_timeout_secs: 3,
            ..BcConfig::default()
        };
        assert_eq!(config.activation_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn parse_timestamp_formats() {
        let ms = parse_timestamp("1764427190000").unwrap();
        let rfc = parse_timestamp("2025-11-29T14:39:50Z").unwrap();
        assert_eq!(ms, rfc);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
