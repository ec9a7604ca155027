use std::path::Path;

use nuva_platform::{PathsError, PlatformError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    UnsupportedPlatform(#[from] PlatformError),

    #[error(transparent)]
    Paths(#[from] PathsError),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("failed to fetch latest nuva version from {url}: {cause}")]
    VersionFetch {
        url: String,
        #[source]
        cause: FetchFailure,
    },

    #[error("failed to download {url}: {cause}")]
    Download {
        url: String,
        #[source]
        cause: FetchFailure,
    },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },
}

impl InstallError {
    pub(crate) fn io_with_path(context: &'static str, path: &Path, source: &std::io::Error) -> Self {
        Self::Io {
            context,
            source: std::io::Error::new(source.kind(), format!("{}: {source}", path.display())),
        }
    }
}

/// Why one of the two HTTP requests failed.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("server responded with HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("response did not contain a version")]
    EmptyVersion,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("error when unzipping nuva zip file with {tool}: {output}")]
    ToolFailed { tool: String, output: String },

    #[error("archive did not contain {name}")]
    MissingBinary { name: String },

    #[error("{tool} was not found on PATH")]
    ToolMissing { tool: String },

    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Zip {
        context: &'static str,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction task panicked: {0}")]
    Join(#[source] tokio::task::JoinError),
}

impl ExtractionError {
    pub(crate) fn zip(context: &'static str, source: zip::result::ZipError) -> Self {
        Self::Zip { context, source }
    }

    pub(crate) fn io_with_path(context: &'static str, path: &Path, source: &std::io::Error) -> Self {
        Self::Io {
            context,
            source: std::io::Error::new(source.kind(), format!("{}: {source}", path.display())),
        }
    }
}
