use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};
use nuva_platform::{HideWindow, OperatingSystem};

use crate::config::ExtractorKind;
use crate::error::ExtractionError;

/// Unpacks a downloaded release archive into a directory.
#[async_trait]
pub trait Archive: Send + Sync {
    fn name(&self) -> &'static str;

    /// Expand `source` into `dest`, overwriting files that already exist.
    ///
    /// # Errors
    /// Returns an [`ExtractionError`] when the archive cannot be read or
    /// written out.
    async fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError>;
}

#[must_use]
pub fn archive_for(kind: ExtractorKind, os: OperatingSystem) -> Box<dyn Archive> {
    match kind {
        ExtractorKind::Native => Box::new(ZipExtractor),
        ExtractorKind::System => Box::new(CommandExtractor::for_os(os)),
    }
}

/// In-process extraction using the `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

#[async_trait]
impl Archive for ZipExtractor {
    fn name(&self) -> &'static str {
        "zip"
    }

    async fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        let source = source.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_zip(&source, &dest))
            .await
            .map_err(ExtractionError::Join)?
    }
}

fn extract_zip(zip_path: &Path, dest: &Path) -> Result<(), ExtractionError> {
    let file = std::fs::File::open(zip_path).map_err(|error| {
        ExtractionError::io_with_path("failed to open zip file", zip_path, &error)
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|error| ExtractionError::zip("failed to read zip archive", error))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|error| ExtractionError::zip("failed to read zip entry", error))?;
        let Some(name) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path: {}", entry.name());
            continue;
        };
        let out_path = dest.join(name);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|error| {
                ExtractionError::io_with_path("failed to create directory", &out_path, &error)
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                ExtractionError::io_with_path("failed to create parent directory", parent, &error)
            })?;
        }
        let mut outfile = std::fs::File::create(&out_path).map_err(|error| {
            ExtractionError::io_with_path("failed to create extracted file", &out_path, &error)
        })?;
        std::io::copy(&mut entry, &mut outfile).map_err(|error| {
            ExtractionError::io_with_path("failed to extract archive entry", &out_path, &error)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode()
                && let Err(error) =
                    std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))
            {
                warn!(
                    "Failed to restore mode {mode:o} on {}: {error}",
                    out_path.display()
                );
            }
        }
    }

    debug!("Extracted {} into {}", zip_path.display(), dest.display());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgLayout {
    /// `<zip> -d <dest>`
    Unzip,
    /// A single `Expand-Archive -LiteralPath '<zip>' -DestinationPath '<dest>'`
    /// argument, since `-Command` re-parses everything after it as script.
    ExpandArchive,
}

/// Shells out to the platform's archive tool. The child is killed when the
/// extraction future is dropped (timeout or cancellation).
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: OsString,
    leading_args: Vec<OsString>,
    layout: ArgLayout,
}

impl CommandExtractor {
    #[must_use]
    pub fn for_os(os: OperatingSystem) -> Self {
        if os.is_windows() {
            Self::expand_archive()
        } else {
            Self::unzip()
        }
    }

    /// `unzip -o <zip> -d <dest>`
    #[must_use]
    pub fn unzip() -> Self {
        Self {
            program: "unzip".into(),
            leading_args: vec!["-o".into()],
            layout: ArgLayout::Unzip,
        }
    }

    /// `powershell -NoProfile -NonInteractive -Command "Expand-Archive -Force ..."`
    #[must_use]
    pub fn expand_archive() -> Self {
        Self {
            program: "powershell".into(),
            leading_args: ["-NoProfile", "-NonInteractive", "-Command"]
                .into_iter()
                .map(OsString::from)
                .collect(),
            layout: ArgLayout::ExpandArchive,
        }
    }

    /// Run an arbitrary program with unzip-style arguments appended after
    /// `leading_args`.
    #[must_use]
    pub fn custom(program: impl Into<OsString>, leading_args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args,
            layout: ArgLayout::Unzip,
        }
    }

    fn tool_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn resolve_program(&self) -> Result<PathBuf, ExtractionError> {
        which::which(&self.program).map_err(|_| ExtractionError::ToolMissing {
            tool: self.tool_name(),
        })
    }

    fn args(&self, source: &Path, dest: &Path) -> Vec<OsString> {
        let mut args = self.leading_args.clone();
        match self.layout {
            ArgLayout::Unzip => {
                args.push(source.into());
                args.push("-d".into());
                args.push(dest.into());
            }
            ArgLayout::ExpandArchive => {
                let script = format!(
                    "Expand-Archive -Force -LiteralPath {} -DestinationPath {}",
                    powershell_quote(source),
                    powershell_quote(dest)
                );
                args.push(script.into());
            }
        }
        args
    }
}

/// Single-quoted PowerShell literal: nothing inside is expanded, and an
/// embedded `'` is doubled.
fn powershell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', "''"))
}

#[async_trait]
impl Archive for CommandExtractor {
    fn name(&self) -> &'static str {
        match self.layout {
            ArgLayout::Unzip => "unzip",
            ArgLayout::ExpandArchive => "expand-archive",
        }
    }

    async fn extract(&self, source: &Path, dest: &Path) -> Result<(), ExtractionError> {
        let program = self.resolve_program()?;
        let args = self.args(source, dest);
        debug!("Running {} {:?}", program.display(), args);

        let output = tokio::process::Command::new(&program)
            .args(&args)
            .hide_window()
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExtractionError::Spawn {
                tool: self.tool_name(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push('\n');
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Err(ExtractionError::ToolFailed {
            tool: self.tool_name(),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::path::Path;

    use nuva_platform::OperatingSystem;

    use super::{Archive, CommandExtractor, ZipExtractor, archive_for};
    use crate::config::ExtractorKind;
    use crate::error::ExtractionError;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let zip_file = std::fs::File::create(path).expect("zip file should be created");
        let mut writer = zip::ZipWriter::new(zip_file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
        for (name, contents) in entries {
            writer
                .start_file(*name, options)
                .expect("file entry should be started");
            writer
                .write_all(contents.as_bytes())
                .expect("file entry should be written");
        }
        writer.finish().expect("zip archive should be finalized");
    }

    #[tokio::test]
    async fn zip_extractor_writes_entries_into_destination() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("nuva.zip");
        write_zip(&zip_path, &[("nuva", "binary-v1"), ("docs/README", "readme")]);

        ZipExtractor
            .extract(&zip_path, temp.path())
            .await
            .expect("zip should extract");

        assert_eq!(
            std::fs::read(temp.path().join("nuva")).expect("binary should be extracted"),
            b"binary-v1"
        );
        assert!(temp.path().join("docs").join("README").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zip_extractor_restores_stored_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("nuva.zip");
        let zip_file = std::fs::File::create(&zip_path).expect("zip file should be created");
        let mut writer = zip::ZipWriter::new(zip_file);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o750);
        writer
            .start_file("nuva", options)
            .expect("file entry should be started");
        writer.write_all(b"bin").expect("file entry should be written");
        writer.finish().expect("zip archive should be finalized");

        ZipExtractor
            .extract(&zip_path, temp.path())
            .await
            .expect("zip should extract");

        let mode = std::fs::metadata(temp.path().join("nuva"))
            .expect("metadata should be readable")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[tokio::test]
    async fn zip_extractor_overwrites_existing_files() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("nuva.zip");
        std::fs::write(temp.path().join("nuva"), b"stale contents that are longer")
            .expect("stale file should be written");
        write_zip(&zip_path, &[("nuva", "fresh")]);

        ZipExtractor
            .extract(&zip_path, temp.path())
            .await
            .expect("zip should extract");

        assert_eq!(
            std::fs::read(temp.path().join("nuva")).expect("binary should be readable"),
            b"fresh"
        );
    }

    #[tokio::test]
    async fn zip_extractor_skips_entries_escaping_destination() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let dest = temp.path().join("bin");
        std::fs::create_dir_all(&dest).expect("dest should be created");
        let zip_path = dest.join("nuva.zip");
        write_zip(&zip_path, &[("../outside", "nope"), ("nuva", "ok")]);

        ZipExtractor
            .extract(&zip_path, &dest)
            .await
            .expect("extraction should not fail on unsafe entries");

        assert!(!temp.path().join("outside").exists());
        assert!(dest.join("nuva").is_file());
    }

    #[tokio::test]
    async fn zip_extractor_rejects_garbage() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let zip_path = temp.path().join("nuva.zip");
        std::fs::write(&zip_path, b"this is not a zip").expect("garbage should be written");

        let result = ZipExtractor.extract(&zip_path, temp.path()).await;

        assert!(matches!(result, Err(ExtractionError::Zip { .. })));
    }

    #[test]
    fn unzip_arguments_put_destination_after_flag() {
        let args = CommandExtractor::unzip().args(Path::new("a.zip"), Path::new("out"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(args, ["-o", "a.zip", "-d", "out"]);
    }

    #[test]
    fn expand_archive_quotes_paths_with_spaces_and_apostrophes() {
        let args = CommandExtractor::expand_archive().args(
            Path::new(r"C:\Users\Jane O'Doe\.nuva\bin\nuva.zip"),
            Path::new(r"C:\Users\Jane O'Doe\.nuva\bin"),
        );
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            [
                "-NoProfile",
                "-NonInteractive",
                "-Command",
                r"Expand-Archive -Force -LiteralPath 'C:\Users\Jane O''Doe\.nuva\bin\nuva.zip' -DestinationPath 'C:\Users\Jane O''Doe\.nuva\bin'",
            ]
        );
    }

    #[test]
    fn powershell_quote_keeps_script_characters_literal() {
        assert_eq!(
            super::powershell_quote(Path::new("a $(b); 'c'")),
            "'a $(b); ''c'''"
        );
    }

    #[test]
    fn archive_for_picks_implementation() {
        assert_eq!(
            archive_for(ExtractorKind::Native, OperatingSystem::Linux).name(),
            "zip"
        );
        assert_eq!(
            archive_for(ExtractorKind::System, OperatingSystem::Linux).name(),
            "unzip"
        );
        assert_eq!(
            archive_for(ExtractorKind::System, OperatingSystem::Windows).name(),
            "expand-archive"
        );
    }

    #[tokio::test]
    async fn missing_tool_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let extractor = CommandExtractor::custom("nuva-no-such-unzip-tool", Vec::new());

        let result = extractor
            .extract(&temp.path().join("nuva.zip"), temp.path())
            .await;

        assert!(matches!(
            result,
            Err(ExtractionError::ToolMissing { ref tool }) if tool == "nuva-no-such-unzip-tool"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_surfaces_combined_output() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let script = temp.path().join("fake-unzip.sh");
        std::fs::write(&script, "echo checking archive\necho 'bad zip' >&2\nexit 9\n")
            .expect("script should be written");
        let extractor = CommandExtractor::custom("sh", vec![script.into_os_string()]);

        let result = extractor
            .extract(&temp.path().join("nuva.zip"), temp.path())
            .await;

        let Err(ExtractionError::ToolFailed { tool, output }) = result else {
            panic!("expected a ToolFailed error");
        };
        assert_eq!(tool, "sh");
        assert_eq!(output, "checking archive\n\nbad zip\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn succeeding_tool_is_ok() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let script = temp.path().join("fake-unzip.sh");
        std::fs::write(&script, "exit 0\n").expect("script should be written");
        let extractor = CommandExtractor::custom("sh", vec![script.into_os_string()]);

        extractor
            .extract(&temp.path().join("nuva.zip"), temp.path())
            .await
            .expect("zero exit status should succeed");
    }
}
