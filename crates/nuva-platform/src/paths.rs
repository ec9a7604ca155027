use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Platform;

const ARCHIVE_FILE_NAME: &str = "nuva.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

/// Where the installer keeps its own settings and log file.
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Build installer paths for the current platform.
    ///
    /// # Errors
    /// Returns an error when the user config or data directory cannot be
    /// determined.
    pub fn new() -> Result<Self, PathsError> {
        Ok(Self {
            config_dir: dirs::config_dir()
                .ok_or(PathsError::ConfigDirUnavailable)?
                .join("nuva"),
            data_dir: dirs::data_dir()
                .ok_or(PathsError::DataDirUnavailable)?
                .join("nuva"),
        })
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("installer.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("install.log")
    }

    /// Ensure the config and data directories exist on disk.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

/// Layout of the directory nuva is installed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    install_dir: PathBuf,
    is_default: bool,
}

impl InstallPaths {
    /// `<home>/.nuva/bin` for the current user.
    ///
    /// # Errors
    /// Returns [`PathsError::HomeDirUnavailable`] when no home directory is set.
    pub fn default_location() -> Result<Self, PathsError> {
        let home = dirs::home_dir().ok_or(PathsError::HomeDirUnavailable)?;
        Ok(Self::under_home(&home))
    }

    #[must_use]
    pub fn under_home(home: &Path) -> Self {
        Self {
            install_dir: home.join(".nuva").join("bin"),
            is_default: true,
        }
    }

    #[must_use]
    pub fn custom(install_dir: PathBuf) -> Self {
        Self {
            install_dir,
            is_default: false,
        }
    }

    /// Resolve an optional override, falling back to the default location.
    ///
    /// # Errors
    /// Returns an error when no override is given and the home directory is
    /// unknown.
    pub fn resolve(install_dir: Option<&Path>) -> Result<Self, PathsError> {
        match install_dir {
            Some(dir) => Ok(Self::custom(dir.to_path_buf())),
            None => Self::default_location(),
        }
    }

    #[must_use]
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Whether this is the `<home>/.nuva/bin` location rather than an override.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.install_dir.join(ARCHIVE_FILE_NAME)
    }

    #[must_use]
    pub fn binary_path(&self, platform: Platform) -> PathBuf {
        self.install_dir.join(platform.binary_name())
    }

    /// Create the install directory and its parents. Succeeds when it already
    /// exists.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.install_dir)
    }
}
