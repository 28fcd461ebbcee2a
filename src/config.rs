//! Configuration for the PostgreSQL MCP server

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Connection settings for the target database.
///
/// Resolved once at startup and immutable afterwards. Missing name, user, or
/// password are not validated here; they surface as a connect failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Database name
    pub dbname: String,

    /// Database user
    pub user: String,

    /// Database password
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: String::new(),
            user: String::new(),
            password: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// Resolve the effective configuration.
    ///
    /// An optional TOML file provides base values, then `DB_HOST`, `DB_PORT`,
    /// `DB_NAME`, `DB_USER`, and `DB_PASSWORD` environment variables override
    /// them. File lookup order:
    /// 1. `POSTGRES_MCP_CONFIG` environment variable
    /// 2. `~/.postgres-mcp/config.toml`
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config: {}. Using defaults.", e);
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_env();
        config
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Connection parameters for the driver.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .dbname(&self.dbname)
            .user(&self.user)
            .password(&self.password);
        pg
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("POSTGRES_MCP_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".postgres-mcp").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DB_HOST") {
            self.host = v;
        }
        if let Ok(v) = std::env::var("DB_PORT") {
            match parse_port(&v) {
                Some(port) => self.port = port,
                None => tracing::warn!("Invalid DB_PORT value {:?}, keeping {}", v, self.port),
            }
        }
        if let Ok(v) = std::env::var("DB_NAME") {
            self.dbname = v;
        }
        if let Ok(v) = std::env::var("DB_USER") {
            self.user = v;
        }
        if let Ok(v) = std::env::var("DB_PASSWORD") {
            self.password = v;
        }
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}
