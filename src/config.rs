use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub ai: AiConfig,

    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/anitrack.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens. Overridden by the JWT_SECRET
    /// environment variable; the default only exists so tests and local dev
    /// work without a config file.
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Remote generative AI is opt-in; with this off the recommendation
    /// endpoint only ever uses the local heuristic.
    pub enabled: bool,

    /// Overridden by the GEMINI_API_KEY environment variable.
    pub api_key: String,

    pub base_url: String,

    /// Candidate model ids to try, in preference order.
    pub candidate_models: Vec<String>,

    /// How many catalog rows to offer the model as candidates (default: 200)
    pub catalog_sample_size: u64,

    /// Request timeout in seconds for the outbound AI call (default: 30)
    pub request_timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            candidate_models: vec![
                "models/text-bison-001".to_string(),
                "models/chat-bison-001".to_string(),
                "gemini-1".to_string(),
                "gemini-pro".to_string(),
            ],
            catalog_sample_size: 200,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// How many top-anime pages to fetch from Jikan (25 entries per page)
    pub pages: u32,

    /// Delay between page fetches, to stay under the Jikan rate limit
    pub page_delay_ms: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            pages: 30,
            page_delay_ms: 1500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            ai: AiConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets come from the environment when present so they never need to
    /// live in config.toml.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("JWT_SECRET")
            && !secret.is_empty()
        {
            self.auth.jwt_secret = secret;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY")
            && !key.is_empty()
        {
            self.ai.api_key = key;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("anitrack").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".anitrack").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret cannot be empty");
        }

        if self.ai.enabled && self.ai.api_key.is_empty() {
            anyhow::bail!("ai.api_key (or GEMINI_API_KEY) is required when ai.enabled is true");
        }

        if self.ai.catalog_sample_size == 0 {
            anyhow::bail!("ai.catalog_sample_size must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert!(!config.ai.enabled);
        assert_eq!(config.ai.catalog_sample_size, 200);
        assert_eq!(config.ai.candidate_models[0], "models/text-bison-001");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[ai]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [ai]
            enabled = true
            api_key = "test-key"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(config.ai.enabled);

        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_validate_rejects_ai_without_key() {
        let mut config = Config::default();
        config.ai.enabled = true;
        config.ai.api_key = String::new();
        assert!(config.validate().is_err());
    }
}
