use std::path::PathBuf;

use log::info;
use nuva_platform::{InstallPaths, Platform};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::archive::{Archive, archive_for};
use crate::config::InstallerConfig;
use crate::error::{ExtractionError, InstallError};
use crate::finalize::{completion_message, make_executable, remove_archive, remove_stale_binary};
use crate::guard::run_with_timeout;
use crate::http::{build_client, download_archive, download_url, fetch_latest_version};

/// Milestones reported while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallProgress {
    PlatformResolved { platform: Platform, archive: String },
    VersionResolved(String),
    Downloading { url: String },
    Downloaded { bytes: u64 },
    Extracting,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub version: String,
    pub download_url: String,
    pub platform: Platform,
    pub paths: InstallPaths,
    pub binary_path: PathBuf,
}

impl InstallReport {
    #[must_use]
    pub fn completion_message(&self) -> String {
        completion_message(&self.paths, self.platform.os)
    }
}

/// Downloads the latest nuva release and installs it, replacing whatever was
/// installed before.
pub struct Installer {
    config: InstallerConfig,
    platform: Option<Platform>,
    archive: Option<Box<dyn Archive>>,
}

impl Installer {
    #[must_use]
    pub fn new(config: InstallerConfig) -> Self {
        Self {
            config,
            platform: None,
            archive: None,
        }
    }

    /// Install for `platform` instead of the host platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Use `archive` instead of the extractor named in the config.
    #[must_use]
    pub fn with_archive(mut self, archive: Box<dyn Archive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Run one install. Every step fails fast; a failure leaves whatever was
    /// already written (for example the downloaded archive) in place.
    ///
    /// # Errors
    /// Returns the first error hit by any step, or [`InstallError::Timeout`] /
    /// [`InstallError::Cancelled`] when a step runs too long or `cancel` fires.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        progress: &mpsc::Sender<InstallProgress>,
    ) -> Result<InstallReport, InstallError> {
        let platform = match self.platform {
            Some(platform) => platform,
            None => Platform::current()?,
        };
        let archive_name = platform.archive_name()?;
        let _ = progress
            .send(InstallProgress::PlatformResolved {
                platform,
                archive: archive_name.to_string(),
            })
            .await;

        let paths = InstallPaths::resolve(self.config.install_dir())?;
        paths.ensure().map_err(|error| {
            InstallError::io_with_path(
                "failed to create install directory",
                paths.install_dir(),
                &error,
            )
        })?;
        info!(
            "Installing nuva for {platform} into {}",
            paths.install_dir().display()
        );

        let client = build_client(&self.config)?;

        let version = run_with_timeout(
            "fetching latest version",
            self.config.fetch_timeout(),
            cancel,
            fetch_latest_version(&client, &self.config.metadata_url),
        )
        .await?;
        let _ = progress
            .send(InstallProgress::VersionResolved(version.clone()))
            .await;

        let url = download_url(&self.config.release_base_url, &version, archive_name);
        let _ = progress
            .send(InstallProgress::Downloading { url: url.clone() })
            .await;

        let archive_path = paths.archive_path();
        let bytes = run_with_timeout(
            "downloading archive",
            self.config.download_timeout(),
            cancel,
            download_archive(&client, &url, &archive_path),
        )
        .await?;
        let _ = progress.send(InstallProgress::Downloaded { bytes }).await;

        let binary_path = paths.binary_path(platform);
        remove_stale_binary(&binary_path)?;

        let _ = progress.send(InstallProgress::Extracting).await;
        let default_archive;
        let archive: &dyn Archive = if let Some(archive) = self.archive.as_deref() {
            archive
        } else {
            default_archive = archive_for(self.config.extractor, platform.os);
            default_archive.as_ref()
        };
        info!("Extracting {} with {}", archive_path.display(), archive.name());
        run_with_timeout(
            "extracting archive",
            self.config.extract_timeout(),
            cancel,
            async {
                archive
                    .extract(&archive_path, paths.install_dir())
                    .await
                    .map_err(InstallError::from)
            },
        )
        .await?;

        if !binary_path.is_file() {
            return Err(ExtractionError::MissingBinary {
                name: platform.binary_name().to_string(),
            }
            .into());
        }

        remove_archive(&archive_path)?;
        make_executable(&binary_path, platform.os)?;
        info!("Installed nuva {version} at {}", binary_path.display());

        Ok(InstallReport {
            version,
            download_url: url,
            platform,
            paths,
            binary_path,
        })
    }
}
