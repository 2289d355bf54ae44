//! Archive creation for staged NAR trees.
//!
//! A NAR is a zip file. Each packaging step stages a single top-level
//! directory (`META-INF`, `include` or `lib`) inside the output directory
//! and asks an [`Archiver`] to write that directory, rooted at the output
//! directory, into the archive. Two archivers exist: [`ZipArchiver`] writes
//! the zip in-process, and [`JarArchiver`] drives the JDK `jar` tool the
//! way the NAR plugin's own build does.

use crate::error::{NarError, Result};
use crate::executor::{CommandExecutor, command_line, failure_message};
use camino::Utf8Path;
use std::fs;
use std::io;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// How entries are written into an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageMode {
    /// Entries are stored uncompressed, which the NAR plugin expects.
    #[default]
    Stored,
    /// Entries are deflated.
    Deflated,
}

/// A single archive to write.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveRequest<'a> {
    /// Destination archive file.
    pub archive_path: &'a Utf8Path,
    /// Directory that entry names are relative to.
    pub base_dir: &'a Utf8Path,
    /// Name of the directory under `base_dir` to archive.
    pub source: &'a str,
    /// Entry storage mode.
    pub mode: StorageMode,
}

impl ArchiveRequest<'_> {
    fn failure(&self, exit_code: Option<i32>, reason: impl Into<String>) -> NarError {
        NarError::ArchiveFailed {
            archive: self.archive_path.to_owned(),
            exit_code,
            reason: reason.into(),
        }
    }
}

/// Writes a staged directory into an archive.
pub trait Archiver {
    /// Archive `request.source` (and everything below it) into
    /// `request.archive_path`.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::ArchiveFailed`] when the archive cannot be
    /// written or the external tool exits unsuccessfully.
    fn archive(&self, request: &ArchiveRequest<'_>) -> Result<()>;
}

/// In-process zip archiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn archive(&self, request: &ArchiveRequest<'_>) -> Result<()> {
        write_zip(request).map_err(|err| {
            discard_partial(request.archive_path);
            request.failure(None, err.to_string())
        })
    }
}

fn write_zip(request: &ArchiveRequest<'_>) -> zip::result::ZipResult<()> {
    let method = match request.mode {
        StorageMode::Stored => CompressionMethod::Stored,
        StorageMode::Deflated => CompressionMethod::Deflated,
    };
    let options = SimpleFileOptions::default().compression_method(method);
    let mut zip = ZipWriter::new(fs::File::create(request.archive_path)?);

    let root = request.base_dir.join(request.source);
    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let name = entry_name(request.base_dir, entry.path())?;
        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else {
            zip.start_file(name, options)?;
            io::copy(&mut fs::File::open(entry.path())?, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Remove whatever a failed write left at `path`.
fn discard_partial(path: &Utf8Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("removed incomplete archive {path}"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("failed to remove incomplete archive {path}: {err}"),
    }
}

/// Return the `/`-separated entry name of `path` relative to `base`.
fn entry_name(base: &Utf8Path, path: &std::path::Path) -> io::Result<String> {
    let relative = path.strip_prefix(base).map_err(io::Error::other)?;
    let relative = Utf8Path::from_path(relative).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("path is not valid UTF-8: {}", relative.display()),
        )
    })?;
    Ok(relative
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Archiver that runs the JDK `jar` tool.
///
/// Runs `jar -c[v]fM[0] <archive> -C <base_dir> <source>/`; `M` suppresses
/// the jar manifest and `0` selects store mode.
pub struct JarArchiver<'e> {
    executor: &'e dyn CommandExecutor,
    jar: String,
    verbose: bool,
}

impl<'e> JarArchiver<'e> {
    /// Create an archiver running `jar` through `executor`.
    #[must_use]
    pub fn new(executor: &'e dyn CommandExecutor, jar: impl Into<String>, verbose: bool) -> Self {
        Self {
            executor,
            jar: jar.into(),
            verbose,
        }
    }

    /// Return the arguments passed to `jar` for `request`.
    #[must_use]
    pub fn arguments(&self, request: &ArchiveRequest<'_>) -> Vec<String> {
        let mut flags = String::from("-c");
        if self.verbose {
            flags.push('v');
        }
        flags.push_str("fM");
        if request.mode == StorageMode::Stored {
            flags.push('0');
        }
        vec![
            flags,
            request.archive_path.to_string(),
            "-C".to_owned(),
            request.base_dir.to_string(),
            format!("{}/", request.source),
        ]
    }
}

impl std::fmt::Debug for JarArchiver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JarArchiver")
            .field("jar", &self.jar)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl Archiver for JarArchiver<'_> {
    fn archive(&self, request: &ArchiveRequest<'_>) -> Result<()> {
        let args = self.arguments(request);
        if self.verbose {
            log::info!("{}", command_line(&self.jar, args.as_slice()));
        }

        let output = self
            .executor
            .run(&self.jar, &args, request.base_dir)
            .map_err(|err| request.failure(None, err.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{}", stdout.trim_end());
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(request.failure(output.status.code(), failure_message(&output)))
        }
    }
}

/// Default name of the jar executable.
pub const DEFAULT_JAR: &str = "jar";
