use std::path::Path;

use log::debug;
use nuva_platform::{InstallPaths, OperatingSystem};

use crate::error::InstallError;

/// Delete a previously installed binary so extraction never merges with or
/// refuses to overwrite it. A missing file is fine.
///
/// # Errors
/// Returns [`InstallError::Io`] for any failure other than "not found".
pub fn remove_stale_binary(path: &Path) -> Result<(), InstallError> {
    remove_if_present(path, "failed to remove previous nuva binary")
}

/// # Errors
/// Returns [`InstallError::Io`] for any failure other than "not found".
pub fn remove_archive(path: &Path) -> Result<(), InstallError> {
    remove_if_present(path, "failed to remove downloaded archive")
}

fn remove_if_present(path: &Path, context: &'static str) -> Result<(), InstallError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(InstallError::io_with_path(context, path, &error)),
    }
}

/// Give the installed binary mode 0777. Zip extraction does not reliably keep
/// the executable bit. Windows has nothing to do here.
///
/// # Errors
/// Returns [`InstallError::Io`] if the permissions cannot be changed.
pub fn make_executable(path: &Path, os: OperatingSystem) -> Result<(), InstallError> {
    if os.is_windows() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777)).map_err(
            |error| InstallError::io_with_path("failed to make nuva executable", path, &error),
        )?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

/// Final message asking the user to put the install directory on `PATH`.
#[must_use]
pub fn completion_message(paths: &InstallPaths, os: OperatingSystem) -> String {
    let location = match (paths.is_default(), os.is_windows()) {
        (false, _) => paths.install_dir().display().to_string(),
        (true, true) => "%HOME%/.nuva/bin".to_string(),
        (true, false) => "$HOME/.nuva/bin".to_string(),
    };
    format!("nuva successfully installed. Please add {location} to your path")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use nuva_platform::{InstallPaths, OperatingSystem};

    use super::{completion_message, make_executable, remove_archive, remove_stale_binary};

    #[test]
    fn remove_stale_binary_deletes_existing_file() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let binary = temp.path().join("nuva");
        std::fs::write(&binary, b"old").expect("binary should be written");

        remove_stale_binary(&binary).expect("existing binary should be removed");

        assert!(!binary.exists());
    }

    #[test]
    fn removing_missing_files_is_not_an_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        remove_stale_binary(&temp.path().join("nuva")).expect("missing binary is fine");
        remove_archive(&temp.path().join("nuva.zip")).expect("missing archive is fine");
    }

    #[test]
    fn removing_a_directory_reports_io_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let dir = temp.path().join("nuva");
        std::fs::create_dir(&dir).expect("directory should be created");

        let result = remove_stale_binary(&dir);

        assert!(matches!(
            result,
            Err(crate::InstallError::Io {
                context: "failed to remove previous nuva binary",
                ..
            })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn make_executable_sets_full_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir should be created");
        let binary = temp.path().join("nuva");
        std::fs::write(&binary, b"#!/bin/sh\n").expect("binary should be written");
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o600))
            .expect("permissions should be narrowed");

        make_executable(&binary, OperatingSystem::Linux).expect("chmod should succeed");

        let mode = std::fs::metadata(&binary)
            .expect("metadata should be readable")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o777);
    }

    #[test]
    fn make_executable_is_a_no_op_on_windows() {
        make_executable(Path::new("/does/not/exist/nuva.exe"), OperatingSystem::Windows)
            .expect("windows has no permission step");
    }

    #[test]
    fn completion_message_uses_os_variable_syntax() {
        let paths = InstallPaths::under_home(Path::new("/home/someone"));

        assert_eq!(
            completion_message(&paths, OperatingSystem::Linux),
            "nuva successfully installed. Please add $HOME/.nuva/bin to your path"
        );
        assert_eq!(
            completion_message(&paths, OperatingSystem::Windows),
            "nuva successfully installed. Please add %HOME%/.nuva/bin to your path"
        );
    }

    #[test]
    fn completion_message_names_custom_directory() {
        let paths = InstallPaths::custom("/opt/nuva/bin".into());

        assert_eq!(
            completion_message(&paths, OperatingSystem::Macos),
            format!(
                "nuva successfully installed. Please add {} to your path",
                Path::new("/opt/nuva/bin").display()
            )
        );
    }
}
