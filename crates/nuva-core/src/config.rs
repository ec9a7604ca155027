use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_METADATA_URL: &str =
    "https://raw.githubusercontent.com/nuvanti/nuva/main/latest.txt";
pub const DEFAULT_RELEASE_BASE_URL: &str = "https://github.com/nuvanti/nuva/releases/download";

/// Which [`crate::Archive`] implementation unpacks the downloaded release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// In-process extraction with the `zip` crate.
    #[default]
    Native,
    /// `unzip` on unix-likes, `Expand-Archive` on Windows.
    System,
}

/// Everything the installer would otherwise hard-code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Overrides `<home>/.nuva/bin`.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,

    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    #[serde(default = "default_release_base_url")]
    pub release_base_url: String,

    #[serde(default)]
    pub extractor: ExtractorKind,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    #[serde(default = "default_extract_timeout")]
    pub extract_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_metadata_url() -> String {
    DEFAULT_METADATA_URL.to_string()
}

fn default_release_base_url() -> String {
    DEFAULT_RELEASE_BASE_URL.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    600
}

fn default_extract_timeout() -> u64 {
    120
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            install_dir: None,
            metadata_url: default_metadata_url(),
            release_base_url: default_release_base_url(),
            extractor: ExtractorKind::default(),
            connect_timeout_secs: default_connect_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            download_timeout_secs: default_download_timeout(),
            extract_timeout_secs: default_extract_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl InstallerConfig {
    /// Defaults with a different install directory.
    #[must_use]
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn install_dir(&self) -> Option<&Path> {
        self.install_dir.as_deref()
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    #[must_use]
    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }
}
