//! Configuration management

use crate::error::Result;
use crate::llm::SlotStats;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API key ring configuration
    #[serde(default)]
    pub keyring: KeyRingConfig,

    /// Generation endpoint and sampling configuration
    #[serde(default)]
    pub generation: GenerationSettings,
}

/// Persisted state of the API key ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRingConfig {
    /// API keys in rotation order
    #[serde(default)]
    pub keys: Vec<String>,

    /// Index of the key used for the next request
    #[serde(default)]
    pub current_index: usize,

    /// Retry a failed request with the next key
    #[serde(default = "default_fallback")]
    pub fallback_enabled: bool,

    /// Usage statistics, parallel to `keys`; missing entries start at zero
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<SlotStats>,
}

impl Default for KeyRingConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            current_index: 0,
            fallback_enabled: default_fallback(),
            stats: Vec::new(),
        }
    }
}

fn default_fallback() -> bool {
    true
}

/// Generation endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Base URL of the generative language API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name used in the `generateContent` path
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Threshold applied to every harm category
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Context documents longer than this are truncated before prompting
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            safety_threshold: default_safety_threshold(),
            timeout_secs: default_timeout(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_endpoint() -> String {
    std::env::var("EXAMDESK_ENDPOINT")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string())
}

fn default_model() -> String {
    std::env::var("EXAMDESK_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string())
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_safety_threshold() -> String {
    "BLOCK_MEDIUM_AND_ABOVE".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_context_chars() -> usize {
    12_000
}

impl Config {
    /// Load config from a specific path, falling back to defaults if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("EXAMDESK_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

impl KeyRingConfig {
    /// Copy with keys from `EXAMDESK_API_KEYS` (comma-separated) appended.
    ///
    /// Environment keys are meant for requests only and are never saved.
    pub fn with_env_keys(&self) -> Self {
        let mut merged = self.clone();
        if let Ok(extra) = std::env::var("EXAMDESK_API_KEYS") {
            merged.merge_keys(&extra);
        }
        merged
    }

    /// Append comma-separated keys, skipping blanks and duplicates
    pub fn merge_keys(&mut self, list: &str) {
        for key in list.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            if !self.keys.iter().any(|existing| existing == key) {
                self.keys.push(key.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.yml")).unwrap();
        assert!(config.keyring.fallback_enabled);
        assert_eq!(config.keyring.current_index, 0);
        assert_eq!(config.generation.top_k, 40);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.keyring.keys = vec!["key-a".to_string(), "key-b".to_string()];
        config.keyring.current_index = 1;
        config.keyring.fallback_enabled = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.keyring.keys, vec!["key-a", "key-b"]);
        assert_eq!(loaded.keyring.current_index, 1);
        assert!(!loaded.keyring.fallback_enabled);
    }

    #[test]
    fn test_slot_stats_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");

        let mut config = Config::default();
        config.keyring.keys = vec!["key-a".to_string()];
        config.keyring.stats = vec![SlotStats {
            request_count: 3,
            error_count: 1,
            health: crate::llm::SlotHealth::Limited,
            last_error: Some("HTTP 429: Too Many Requests".to_string()),
            ..Default::default()
        }];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.keyring.stats, config.keyring.stats);
    }

    #[test]
    fn test_partial_yaml_uses_field_defaults() {
        let config: Config = serde_yaml::from_str("keyring:\n  keys: [abc]\n").unwrap();
        assert_eq!(config.keyring.keys, vec!["abc"]);
        assert!(config.keyring.fallback_enabled);
        assert!(config.keyring.stats.is_empty());
        assert_eq!(config.generation.max_output_tokens, 2048);
    }

    #[test]
    fn test_merge_keys_skips_duplicates_and_blanks() {
        let mut keyring = KeyRingConfig {
            keys: vec!["one".to_string()],
            ..Default::default()
        };
        keyring.merge_keys("one, two,, three ");
        assert_eq!(keyring.keys, vec!["one", "two", "three"]);
    }
}
