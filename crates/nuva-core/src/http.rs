use std::path::Path;

use log::{debug, info};
use reqwest::header::{CACHE_CONTROL, PRAGMA};

use crate::config::InstallerConfig;
use crate::error::{FetchFailure, InstallError};

/// HTTP client shared by the version and archive requests.
///
/// Only the connect phase is bounded here; whole-request deadlines come from
/// the per-step timeouts in [`crate::guard`].
///
/// # Errors
/// Returns [`InstallError::ClientBuild`] if the TLS backend fails to
/// initialise.
pub fn build_client(config: &InstallerConfig) -> Result<reqwest::Client, InstallError> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout())
        .user_agent(format!("nuva-install/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(InstallError::ClientBuild)
}

/// Fetch the latest published version token, bypassing any HTTP cache.
///
/// # Errors
/// Returns [`InstallError::VersionFetch`] when the request fails, the server
/// answers with a non-success status, or the body holds no version.
pub async fn fetch_latest_version(
    client: &reqwest::Client,
    metadata_url: &str,
) -> Result<String, InstallError> {
    let fail = |cause| InstallError::VersionFetch {
        url: metadata_url.to_string(),
        cause,
    };

    let response = client
        .get(metadata_url)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .map_err(|error| fail(FetchFailure::Request(error)))?;

    if !response.status().is_success() {
        return Err(fail(FetchFailure::Status(response.status())));
    }

    let body = response
        .text()
        .await
        .map_err(|error| fail(FetchFailure::Body(error)))?;
    let version = parse_version_token(&body).ok_or_else(|| fail(FetchFailure::EmptyVersion))?;

    debug!("Latest version from {metadata_url}: {version}");
    Ok(version.to_string())
}

fn parse_version_token(body: &str) -> Option<&str> {
    let version = body.trim();
    (!version.is_empty()).then_some(version)
}

#[must_use]
pub fn download_url(release_base_url: &str, version: &str, archive_name: &str) -> String {
    format!(
        "{}/{version}/{archive_name}",
        release_base_url.trim_end_matches('/')
    )
}

/// Download the release archive into memory and write it to `dest`,
/// replacing any file already there.
///
/// Returns the number of bytes written.
///
/// # Errors
/// Returns [`InstallError::Download`] for network or status failures and
/// [`InstallError::Io`] when the archive cannot be written.
pub async fn download_archive(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, InstallError> {
    let fail = |cause| InstallError::Download {
        url: url.to_string(),
        cause,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|error| fail(FetchFailure::Request(error)))?;

    if !response.status().is_success() {
        return Err(fail(FetchFailure::Status(response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|error| fail(FetchFailure::Body(error)))?;

    tokio::fs::write(dest, &bytes).await.map_err(|error| {
        InstallError::io_with_path("failed to write downloaded archive", dest, &error)
    })?;

    info!("Downloaded {} bytes to {}", bytes.len(), dest.display());
    Ok(bytes.len() as u64)
}
