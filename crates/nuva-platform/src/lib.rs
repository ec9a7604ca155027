//! Host platform detection and filesystem layout for the nuva installer.

mod commands;
mod paths;
mod platform;

pub use commands::HideWindow;
pub use paths::{AppPaths, InstallPaths, PathsError};
pub use platform::{Architecture, OperatingSystem, Platform, PlatformError};
