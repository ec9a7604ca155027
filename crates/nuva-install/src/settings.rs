use std::path::{Path, PathBuf};

use log::{debug, warn};
use nuva_core::InstallerConfig;
use nuva_platform::AppPaths;

/// Where the active configuration came from, kept so it can be logged once
/// logging is up.
#[derive(Debug)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
    Invalid { path: PathBuf, error: String },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            Self::Defaults => debug!("No installer settings file, using defaults"),
            Self::File(path) => debug!("Loaded installer settings from {}", path.display()),
            Self::Invalid { path, error } => warn!(
                "Ignoring invalid installer settings in {}: {error}",
                path.display()
            ),
        }
    }
}

pub fn load() -> (InstallerConfig, ConfigSource) {
    let Ok(paths) = AppPaths::new() else {
        return (InstallerConfig::default(), ConfigSource::Defaults);
    };
    load_from(&paths.settings_file())
}

pub fn load_from(path: &Path) -> (InstallerConfig, ConfigSource) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return (InstallerConfig::default(), ConfigSource::Defaults);
    };

    match serde_json::from_str(&content) {
        Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
        Err(error) => (
            InstallerConfig::default(),
            ConfigSource::Invalid {
                path: path.to_path_buf(),
                error: error.to_string(),
            },
        ),
    }
}
