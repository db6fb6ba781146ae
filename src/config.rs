// ABOUTME: Application configuration loaded from ~/.aptos-flow/config.toml
// Missing file falls back to defaults; APTOS_NODE_URL overrides the node endpoint

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_NODE_URL: &str = "https://fullnode.devnet.aptoslabs.com";
pub const DEFAULT_NETWORK: &str = "devnet";
const NODE_URL_ENV: &str = "APTOS_NODE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Network requested from the wallet when connecting
    pub network_name: String,
    pub node_url: String,
    /// Root for workflow records, logs and demo wallet state
    pub data_dir: Option<PathBuf>,
    pub execution: ExecutionConfig,
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub step_start_delay_ms: u64,
    pub step_complete_delay_ms: u64,
    pub finish_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub analysis_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network_name: DEFAULT_NETWORK.to_string(),
            node_url: DEFAULT_NODE_URL.to_string(),
            data_dir: None,
            execution: ExecutionConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            step_start_delay_ms: 1000,
            step_complete_delay_ms: 1500,
            finish_delay_ms: 1000,
        }
    }
}

impl ExecutionConfig {
    /// No delays at all; used by tests and scripted runs.
    pub const fn immediate() -> Self {
        Self {
            step_start_delay_ms: 0,
            step_complete_delay_ms: 0,
            finish_delay_ms: 0,
        }
    }

    pub const fn step_start_delay(&self) -> Duration {
        Duration::from_millis(self.step_start_delay_ms)
    }

    pub const fn step_complete_delay(&self) -> Duration {
        Duration::from_millis(self.step_complete_delay_ms)
    }

    pub const fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms)
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self { analysis_delay_ms: 1500 }
    }
}

impl OptimizerConfig {
    pub const fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }
}

impl AppConfig {
    /// Default location of the app's data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home_dir.join(".aptos-flow"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::default_data_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(NODE_URL_ENV) {
            if !url.trim().is_empty() {
                self.node_url = url;
            }
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_data_dir(),
        }
    }

    pub fn workflows_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("workflows"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("logs"))
    }
}
