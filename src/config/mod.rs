use std::path::{Path, PathBuf};
use anyhow::{Result, Context, bail};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::protocol::ResponseSchema;

/// Environment variable that replaces `endpoint.base_url`.
pub const ENDPOINT_ENV_VAR: &str = "COCKPIT_ENDPOINT";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CockpitConfig {
    /// Execution endpoint settings
    pub endpoint: EndpointConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Terminal form settings
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Scheme, host and port of the execution service
    pub base_url: String,

    /// Route commands are posted to
    pub path: String,

    /// Timeout for the whole exchange, in seconds
    pub timeout_seconds: u64,

    /// Timeout for establishing the connection, in seconds
    pub connect_timeout_seconds: u64,

    /// How reply bodies are checked
    #[serde(default)]
    pub response_schema: ResponseSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "cognition_cockpit=debug"
    pub level: String,

    /// Log file; stderr when absent
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Event poll interval in milliseconds
    pub tick_rate_ms: u64,

    /// Show the clock in the header
    pub show_clock: bool,
}

impl EndpointConfig {
    /// Full URL commands are posted to.
    pub fn endpoint_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid endpoint base URL: {}", self.base_url))?;
        base.join(&self.path)
            .with_context(|| format!("Invalid endpoint path: {}", self.path))
    }
}

impl Default for CockpitConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                path: "/api/execute-command".to_string(),
                timeout_seconds: 30,
                connect_timeout_seconds: 10,
                response_schema: ResponseSchema::Lenient,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: cockpit_dir().map(|dir| dir.join("cockpit.log")),
            },
            tui: TuiConfig {
                tick_rate_ms: 100,
                show_clock: true,
            },
        }
    }
}

impl CockpitConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.load_env_vars();

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the default configuration path
    pub fn default_path() -> Result<PathBuf> {
        cockpit_dir()
            .map(|dir| dir.join("config.toml"))
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))
    }

    fn load_env_vars(&mut self) {
        if let Ok(url) = std::env::var(ENDPOINT_ENV_VAR) {
            if !url.trim().is_empty() {
                self.endpoint.base_url = url;
            }
        }
    }

    /// Merge with command-line overrides
    pub fn merge_overrides(&mut self, overrides: Vec<(String, String)>) -> Result<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "base_url" | "endpoint" => self.endpoint.base_url = value,
                "path" => self.endpoint.path = value,
                "timeout" => self.endpoint.timeout_seconds = value.parse()
                    .with_context(|| format!("Invalid timeout: {}", value))?,
                "connect_timeout" => self.endpoint.connect_timeout_seconds = value.parse()
                    .with_context(|| format!("Invalid connect timeout: {}", value))?,
                "schema" => self.endpoint.response_schema = value.parse()?,
                "log_level" => self.logging.level = value,
                "log_file" => self.logging.file = Some(PathBuf::from(value)),
                "tick_rate" => self.tui.tick_rate_ms = value.parse()
                    .with_context(|| format!("Invalid tick rate: {}", value))?,
                _ => bail!("Unknown config key: {}", key),
            }
        }
        // Fail early rather than on the first submission.
        self.endpoint.endpoint_url()?;
        Ok(())
    }
}

fn cockpit_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cockpit"))
}

/// Splits a `key=value` override.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("Override must look like key=value, got '{}'", raw),
    }
}

/// Load or create configuration
pub fn load_or_create_config(path: Option<&Path>) -> Result<CockpitConfig> {
    let config_path = if let Some(p) = path {
        p.to_path_buf()
    } else {
        CockpitConfig::default_path()?
    };

    if config_path.exists() {
        CockpitConfig::load(&config_path)
    } else {
        let mut config = CockpitConfig::default();
        config.save(&config_path)?;
        config.load_env_vars();
        Ok(config)
    }
}
