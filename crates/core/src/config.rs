use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::paths::Paths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    /// Default headless mode when the dispatcher auto-starts a browser.
    #[serde(default)]
    pub headless: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Wait budget for clickable elements, in seconds.
    #[serde(default = "default_click_timeout_secs")]
    pub click_timeout_secs: u64,
    /// Wait budget for secondary UI elements (e.g. the camera toggle), in seconds.
    #[serde(default = "default_secondary_timeout_secs")]
    pub secondary_timeout_secs: u64,
    /// Settle delay after navigation before interacting with the page.
    #[serde(default = "default_navigation_settle_ms")]
    pub navigation_settle_ms: u64,
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_click_timeout_secs() -> u64 {
    10
}

fn default_secondary_timeout_secs() -> u64 {
    5
}

fn default_navigation_settle_ms() -> u64 {
    3000
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            click_timeout_secs: default_click_timeout_secs(),
            secondary_timeout_secs: default_secondary_timeout_secs(),
            navigation_settle_ms: default_navigation_settle_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Self {
        let path = paths.config_file();
        if path.exists() {
            match Self::load(&path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load config, using defaults");
                }
            }
        }
        Self::default()
    }

    pub fn save(&self, paths: &Paths) -> Result<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.openai.max_tokens, 150);
        assert!((config.openai.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.browser.click_timeout_secs, 10);
        assert_eq!(config.browser.secondary_timeout_secs, 5);
        assert!(!config.browser.headless);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"openai": {"apiKey": "sk-test"}}"#).unwrap();
        assert_eq!(config.openai.api_key, "sk-test");
        assert_eq!(config.openai.max_tokens, 150);
        assert_eq!(config.browser.window_width, 1920);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().to_path_buf());
        let mut config = Config::default();
        config.openai.api_key = "sk-round-trip".to_string();
        config.browser.headless = true;
        config.save(&paths).unwrap();

        let loaded = Config::load(&paths.config_file()).unwrap();
        assert_eq!(loaded.openai.api_key, "sk-round-trip");
        assert!(loaded.browser.headless);
    }
}
