use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "ASTROSCOPE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub celestrak: CelestrakConfig,

    #[serde(default)]
    pub nasa: NasaConfig,

    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelestrakConfig {
    #[serde(default = "default_celestrak_url")]
    pub base_url: String,

    /// Group served when none is named
    #[serde(default = "default_group")]
    pub default_group: String,

    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NasaConfig {
    #[serde(default = "default_nasa_key")]
    pub api_key: String,

    #[serde(default = "default_nasa_url")]
    pub base_url: String,

    #[serde(default = "default_slow_timeout")]
    pub timeout_secs: u64,

    /// DONKI lookback window in days
    #[serde(default = "default_space_weather_days")]
    pub space_weather_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// OpenAI-compatible API root, `/chat/completions` is appended
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_slow_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_celestrak_url() -> String {
    "https://celestrak.org/NORAD/elements/gp.php".to_string()
}

fn default_group() -> String {
    "stations".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_slow_timeout() -> u64 {
    60
}

fn default_nasa_key() -> String {
    "DEMO_KEY".to_string()
}

fn default_nasa_url() -> String {
    "https://api.nasa.gov".to_string()
}

fn default_space_weather_days() -> u32 {
    3
}

fn default_llm_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.1-8b-instruct".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            celestrak: CelestrakConfig::default(),
            nasa: NasaConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Default for CelestrakConfig {
    fn default() -> Self {
        Self {
            base_url: default_celestrak_url(),
            default_group: default_group(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            api_key: default_nasa_key(),
            base_url: default_nasa_url(),
            timeout_secs: default_slow_timeout(),
            space_weather_days: default_space_weather_days(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            model: default_llm_model(),
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: default_slow_timeout(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when it exists, defaults otherwise. Environment overrides apply in both cases.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Config path from `ASTROSCOPE_CONFIG`, or `config.toml`
    pub fn default_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Secrets and endpoints that may come from the environment
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("NASA_API_KEY") {
            self.nasa.api_key = key;
        }
        if let Some(key) = lookup("LLM_API_KEY") {
            self.summarizer.api_key = Some(key);
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            self.summarizer.base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.summarizer.model = model;
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.celestrak.default_group, "stations");
        assert_eq!(config.nasa.api_key, "DEMO_KEY");
        assert_eq!(config.nasa.space_weather_days, 3);
        assert!(config.summarizer.api_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 9000

[nasa]
api_key = "abc123"

[summarizer]
model = "local-model"
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.nasa.api_key, "abc123");
        assert_eq!(config.nasa.base_url, "https://api.nasa.gov");
        assert_eq!(config.summarizer.model, "local-model");
        assert_eq!(config.celestrak.timeout_secs, 30);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            "NASA_API_KEY" => Some("env-key".to_string()),
            "LLM_API_KEY" => Some("sk-test".to_string()),
            "LLM_MODEL" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.nasa.api_key, "env-key");
        assert_eq!(config.summarizer.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.summarizer.model, "llama-3.1-8b-instruct");
    }
}
