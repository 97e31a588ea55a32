use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub catalog: CatalogConfig,

    pub mail: MailConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Tokio worker threads; 0 lets the runtime decide.
    pub worker_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Base URL used when building links in outbound mail.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the external show catalog API.
    pub base_url: String,

    /// Request timeout; catalog lookups are fallible and possibly slow.
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub sender: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB.
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations).
    pub argon2_time_cost: u32,

    /// Argon2 parallelism.
    pub argon2_parallelism: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: "info".to_string(),
            worker_threads: 0,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8523,
            cors_allowed_origins: vec!["*".to_string()],
            base_url: "http://localhost:8523".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.thetvdb.com".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "noreply@followarr.local".to_string(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
            mail: MailConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("followarr")
        .join("followarr.db")
        .display()
        .to_string()
}

fn config_path() -> PathBuf {
    std::env::var("FOLLOWARR_CONFIG")
        .map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from)
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = config_path();

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    pub fn create_default_if_missing() -> Result<()> {
        let path = config_path();

        if path.exists() {
            return Ok(());
        }

        let config = Self::default();
        let raw = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        info!("Created default config at {}", path.display());
        Ok(())
    }

    /// Connection URL for the SQLite database.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.general.database_path)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.server.port != 0, "server.port must not be 0");
        anyhow::ensure!(
            self.catalog.timeout_seconds > 0,
            "catalog.timeout_seconds must be positive"
        );
        anyhow::ensure!(
            self.security.argon2_parallelism > 0,
            "security.argon2_parallelism must be positive"
        );
        Ok(())
    }
}
