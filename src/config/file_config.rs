use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub catalog_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub downloads_dir: Option<String>,
    pub user_agent: Option<String>,
    pub artifact_extension: Option<String>,

    // Sections
    pub transfer: Option<TransferConfig>,
    pub install: Option<InstallConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TransferConfig {
    pub poll_interval_ms: Option<u64>,
    pub max_poll_attempts: Option<u32>,
    /// Host is on a metered connection
    pub metered: Option<bool>,
    /// Host is roaming
    pub roaming: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct InstallConfig {
    pub elevated: Option<bool>,
    pub opener: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
