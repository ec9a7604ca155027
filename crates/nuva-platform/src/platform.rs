use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("unsupported operating system and architecture: {os}/{arch}")]
    Unsupported { os: String, arch: String },
}

impl PlatformError {
    fn unsupported(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::Unsupported {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Windows,
    Macos,
    Linux,
}

impl OperatingSystem {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "windows" => Some(Self::Windows),
            "macos" | "darwin" => Some(Self::Macos),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Linux => "linux",
        }
    }

    #[must_use]
    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86_64,
    Aarch64,
}

impl Architecture {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x86_64" => Some(Self::X86_64),
            "aarch64" => Some(Self::Aarch64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

/// The (operating system, architecture) pair that selects which release
/// archive gets installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: OperatingSystem,
    pub arch: Architecture,
}

impl Platform {
    #[must_use]
    pub const fn new(os: OperatingSystem, arch: Architecture) -> Self {
        Self { os, arch }
    }

    /// Detect the platform this binary was compiled for.
    ///
    /// # Errors
    /// Returns [`PlatformError::Unsupported`] when the host OS or architecture
    /// is not one nuva ships for.
    pub fn current() -> Result<Self, PlatformError> {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a platform from `std::env::consts`-style names.
    ///
    /// # Errors
    /// Returns [`PlatformError::Unsupported`] for unknown names.
    pub fn from_names(os: &str, arch: &str) -> Result<Self, PlatformError> {
        match (OperatingSystem::from_name(os), Architecture::from_name(arch)) {
            (Some(os), Some(arch)) => Ok(Self::new(os, arch)),
            _ => Err(PlatformError::unsupported(os, arch)),
        }
    }

    /// Release archive published for this platform.
    ///
    /// # Errors
    /// Returns [`PlatformError::Unsupported`] for pairs without a published
    /// build (for example Linux on aarch64).
    pub fn archive_name(self) -> Result<&'static str, PlatformError> {
        match (self.os, self.arch) {
            (OperatingSystem::Windows, Architecture::X86_64) => Ok("nuva.windows.zip"),
            (OperatingSystem::Macos, Architecture::Aarch64) => Ok("nuva.mac.m1.zip"),
            (OperatingSystem::Linux, Architecture::X86_64) => Ok("nuva.linux.zip"),
            (os, arch) => Err(PlatformError::unsupported(os.as_str(), arch.as_str())),
        }
    }

    #[must_use]
    pub fn binary_name(self) -> &'static str {
        if self.os.is_windows() {
            "nuva.exe"
        } else {
            "nuva"
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}
