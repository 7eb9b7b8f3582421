use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::workflows::LeadIdStrategy;

/// Main configuration structure for the intake engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntakeConfig {
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Where session records live
    pub storage: StorageConfig,
    /// Lead reference generation
    pub leads: LeadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level or full EnvFilter directive
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
    /// Enable metrics collection
    pub metrics_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    File,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file backend
    pub directory: PathBuf,
    /// Database settings (sqlite backend only)
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeadConfig {
    pub prefix: String,
    pub strategy: LeadIdStrategy,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
                metrics_enabled: true,
            },
            storage: StorageConfig {
                backend: StorageBackend::File,
                directory: PathBuf::from(".dealer-intake/sessions"),
                database: Some(DatabaseConfig {
                    url: "sqlite://.dealer-intake/sessions.db".to_string(),
                    max_connections: 5,
                    auto_migrate: true,
                }),
            },
            leads: LeadConfig {
                prefix: "LEAD".to_string(),
                strategy: LeadIdStrategy::Timestamp,
            },
        }
    }
}

impl IntakeConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (dealer-intake.toml)
    /// 3. Environment variables (prefixed with DEALER_INTAKE_)
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`IntakeConfig::load`], reading `path` instead of the default file.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None if Path::new("dealer-intake.toml").exists() => {
                builder = builder.add_source(File::with_name("dealer-intake"));
            }
            None => {}
        }

        // DEALER_INTAKE_STORAGE__BACKEND=sqlite
        builder = builder.add_source(
            Environment::with_prefix("DEALER_INTAKE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<IntakeConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = IntakeConfig::load_env_file();
        IntakeConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static IntakeConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
