//! Configuration management for draftdesk.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::workspace::Layout;

/// Environment variable holding the bearer token for remote endpoints.
pub const API_KEY_ENV: &str = "DRAFTDESK_API_KEY";

/// Floor applied to the request timeout and the poll interval.
pub const MIN_DURATION_SECS: u64 = 1;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Remote endpoint settings
    pub api: ApiConfig,

    /// Library settings
    pub library: LibraryConfig,

    /// Visual media settings
    pub media: MediaConfig,

    /// Editor settings
    pub editor: EditorConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Organization the library is scoped to
    pub organization_id: String,

    /// Organization display name used in prompts
    pub organization_name: String,

    /// Workspace layout (sidebar, split, wizard)
    pub layout: Layout,
}

/// Remote endpoint settings.
///
/// An empty URL means the endpoint is not wired.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Text generation service base URL
    pub generation_url: String,

    /// Content library base URL
    pub library_url: String,

    /// Visual generation service base URL
    pub media_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Rows fetched per refresh (clamped to 100..=500)
    pub page_size: usize,
}

/// Visual media settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Seconds between job status requests
    pub poll_interval_secs: u64,

    /// Seconds after which polling stops
    pub poll_ceiling_secs: u64,
}

/// Editor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Delay used when saving without a library endpoint
    pub simulated_save_ms: u64,

    /// Tone used when none is given
    pub default_tone: String,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`], never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(MIN_DURATION_SECS))
    }

    /// Bearer token from the environment, if set.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
    }
}

impl MediaConfig {
    /// Never below one second; a zero period would stall the poller.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(MIN_DURATION_SECS))
    }

    pub fn poll_ceiling(&self) -> Duration {
        Duration::from_secs(self.poll_ceiling_secs)
    }
}

impl EditorConfig {
    pub fn simulated_save_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_save_ms)
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.draftdesk.toml` in current directory
    /// 2. `~/.config/draftdesk/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(".draftdesk.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(config_path) = Self::global_config_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        // Return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("draftdesk"))
    }

    /// Get the global config file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            organization_id: String::new(),
            organization_name: String::new(),
            layout: Layout::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            generation_url: String::new(),
            library_url: String::new(),
            media_url: String::new(),
            timeout_secs: 60,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { page_size: 200 }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { poll_interval_secs: 10, poll_ceiling_secs: 300 }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { simulated_save_ms: 1000, default_tone: "professional".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api.generation_url.is_empty());
        assert_eq!(config.library.page_size, 200);
        assert_eq!(config.media.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.media.poll_ceiling(), Duration::from_secs(300));
        assert_eq!(config.general.layout, Layout::Sidebar);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("layout = \"sidebar\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            organization_id = "org-42"
            layout = "wizard"

            [api]
            generation_url = "https://gen.example.com"

            [media]
            poll_interval_secs = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.organization_id, "org-42");
        assert_eq!(config.general.layout, Layout::Wizard);
        assert_eq!(config.api.generation_url, "https://gen.example.com");
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.media.poll_interval_secs, 5);
        assert_eq!(config.media.poll_ceiling_secs, 300);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[library]\npage_size = 500\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.library.page_size, 500);
    }

    #[test]
    fn test_zero_durations_are_floored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 0\n\n[media]\npoll_interval_secs = 0\n")
            .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.media.poll_interval_secs, 0);
        assert_eq!(config.media.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.api.timeout(), Duration::from_secs(1));
    }

    #[test]
    #[serial(draftdesk_env)]
    fn test_api_key_from_env() {
        let original = std::env::var(API_KEY_ENV).ok();

        std::env::set_var(API_KEY_ENV, "secret");
        assert_eq!(ApiConfig::default().api_key().as_deref(), Some("secret"));

        std::env::set_var(API_KEY_ENV, "  ");
        assert!(ApiConfig::default().api_key().is_none());

        match original {
            Some(val) => std::env::set_var(API_KEY_ENV, val),
            None => std::env::remove_var(API_KEY_ENV),
        }
    }
}
