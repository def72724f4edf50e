mod file_config;

pub use file_config::{FileConfig, InstallConfig, TransferConfig};

use anyhow::{bail, Context, Result};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

use crate::transfer::{EnqueueSettings, NetworkConditions, NetworkPolicy};

pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/ASDFG0537701349/my-app-store/main/apps.json";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "apk";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;
pub const DEFAULT_OPENER: &str = "xdg-open";

/// CLI arguments that can be used for config resolution.
/// Anything set in the TOML file wins over these.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub catalog_url: Option<String>,
    pub downloads_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub downloads_dir: PathBuf,
    pub user_agent: String,
    pub artifact_extension: String,

    pub transfer: TransferSettings,
    pub install: InstallSettings,
}

#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    /// Conditions of the host network, checked against each request's policy
    pub network: NetworkConditions,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            network: NetworkConditions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstallSettings {
    pub elevated: bool,
    pub opener: String,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            elevated: false,
            opener: DEFAULT_OPENER.to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_url = file
            .catalog_url
            .or_else(|| cli.catalog_url.clone())
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        validate_catalog_url(&catalog_url)?;

        let downloads_dir = file
            .downloads_dir
            .map(PathBuf::from)
            .or_else(|| cli.downloads_dir.clone())
            .unwrap_or_else(default_downloads_dir);

        let connect_timeout_secs = file
            .connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let read_timeout_secs = file.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS);
        let user_agent = file
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let artifact_extension = file
            .artifact_extension
            .unwrap_or_else(|| DEFAULT_ARTIFACT_EXTENSION.to_string());

        let transfer_file = file.transfer.unwrap_or_default();
        let transfer = TransferSettings {
            poll_interval_ms: transfer_file
                .poll_interval_ms
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            max_poll_attempts: transfer_file
                .max_poll_attempts
                .unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS),
            network: NetworkConditions {
                metered: transfer_file.metered.unwrap_or(false),
                roaming: transfer_file.roaming.unwrap_or(false),
            },
        };
        if transfer.poll_interval_ms == 0 {
            bail!("transfer.poll_interval_ms must be greater than 0");
        }
        if transfer.max_poll_attempts == 0 {
            bail!("transfer.max_poll_attempts must be greater than 0");
        }

        let install_file = file.install.unwrap_or_default();
        let install = InstallSettings {
            elevated: install_file.elevated.unwrap_or(false),
            opener: install_file
                .opener
                .unwrap_or_else(|| DEFAULT_OPENER.to_string()),
        };

        Ok(Self {
            catalog_url,
            connect_timeout_secs,
            read_timeout_secs,
            downloads_dir,
            user_agent,
            artifact_extension,
            transfer,
            install,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.transfer.poll_interval_ms)
    }

    /// Settings applied to every enqueued transfer.
    pub fn enqueue_settings(&self) -> EnqueueSettings {
        EnqueueSettings {
            downloads_dir: self.downloads_dir.clone(),
            artifact_extension: self.artifact_extension.clone(),
            user_agent: self.user_agent.clone(),
            network_policy: NetworkPolicy::default(),
        }
    }
}

/// `<data dir>/storefront/downloads`, or `./downloads` when the platform has no data dir.
fn default_downloads_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("storefront").join("downloads"))
        .unwrap_or_else(|| PathBuf::from("downloads"))
}

fn validate_catalog_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("Invalid catalog_url: {:?}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("catalog_url must use http or https: {:?}", raw);
    }
    Ok(())
}
