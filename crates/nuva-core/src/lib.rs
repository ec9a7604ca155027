//! Install or update the `nuva` binary from its published releases.
//!
//! The pipeline lives in [`Installer::run`]; every step it performs is also
//! exported on its own:
//! - platform and path resolution come from `nuva-platform`;
//! - [`fetch_latest_version`], [`download_url`] and [`download_archive`] talk
//!   to the release host;
//! - [`Archive`] unpacks the download, natively or through a system tool;
//! - [`remove_stale_binary`], [`remove_archive`] and [`make_executable`]
//!   finish the install.

mod archive;
mod config;
mod error;
mod finalize;
mod guard;
mod http;
mod installer;

pub use archive::{Archive, CommandExtractor, ZipExtractor, archive_for};
pub use config::{DEFAULT_METADATA_URL, DEFAULT_RELEASE_BASE_URL, ExtractorKind, InstallerConfig};
pub use error::{ExtractionError, FetchFailure, InstallError};
pub use finalize::{completion_message, make_executable, remove_archive, remove_stale_binary};
pub use guard::run_with_timeout;
pub use http::{build_client, download_archive, download_url, fetch_latest_version};
pub use installer::{InstallProgress, InstallReport, Installer};
