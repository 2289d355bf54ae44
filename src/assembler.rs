//! Staging and archiving of the three NAR artefacts.
//!
//! Each artefact is produced by the same sequence: lay out a single staging
//! root (`META-INF`, `include` or `lib`) inside the output directory, hand it
//! to the [`Archiver`], then delete the staging root. The three sequences run
//! one after another and never overlap, so the output directory only ever
//! holds one staging root at a time.

use crate::archive::{ArchiveRequest, Archiver, StorageMode};
use crate::coordinates::ProjectCoordinates;
use crate::error::{NarError, Result};
use crate::library::LibraryDescriptor;
use crate::naming::NarKind;
use crate::properties::{NarProperties, PROPERTIES_FILE};
use crate::triple::PlatformTriple;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Staging root of the base archive.
pub const META_INF_DIR: &str = "META-INF";

/// Staging root of the header archive.
pub const INCLUDE_DIR: &str = "include";

/// Staging root of the binary archive.
pub const LIB_DIR: &str = "lib";

/// File name suffixes copied into the header archive.
pub const HEADER_SUFFIXES: &[&str] = &[".h", ".hpp"];

/// What happens to a staging root when archiving it fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Leave the staging root in place for inspection.
    #[default]
    KeepOnFailure,
    /// Remove the staging root whatever the outcome.
    Always,
}

/// Settings applied to every artefact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Entry storage mode handed to the archiver.
    pub storage: StorageMode,
    /// Staging cleanup behaviour after an archiver failure.
    pub cleanup: CleanupPolicy,
}

/// Everything the assembler reads.
#[derive(Debug, Clone, Copy)]
pub struct NarInputs<'a> {
    /// The binary being packaged.
    pub library: &'a LibraryDescriptor,
    /// Target platform of the binary.
    pub triple: &'a PlatformTriple,
    /// Project coordinates and output directory.
    pub coordinates: &'a ProjectCoordinates,
    /// Directory tree holding the library headers.
    pub include_dir: &'a Utf8Path,
}

impl NarInputs<'_> {
    fn output_directory(&self) -> &Utf8Path {
        self.coordinates.output_directory()
    }
}

/// Paths of the archives written by [`ArtifactAssembler::assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledNar {
    /// Base archive carrying `nar.properties`.
    pub base: Utf8PathBuf,
    /// Header archive.
    pub noarch: Utf8PathBuf,
    /// Binary archive.
    pub platform: Utf8PathBuf,
}

/// Produces the base, header and binary archives.
pub struct ArtifactAssembler<'a> {
    archiver: &'a dyn Archiver,
    options: AssemblerOptions,
}

impl<'a> ArtifactAssembler<'a> {
    /// Create an assembler writing archives through `archiver`.
    #[must_use]
    pub fn new(archiver: &'a dyn Archiver, options: AssemblerOptions) -> Self {
        Self { archiver, options }
    }

    /// Write all three archives in order: base, header, binary.
    ///
    /// Archives that were completed before a failure are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::StagingDirectoryExists`] when a staging root is
    /// already present, [`NarError::StagingFailed`] when laying out or
    /// removing a staging root fails, and [`NarError::ArchiveFailed`] when
    /// the archiver fails.
    pub fn assemble(&self, inputs: &NarInputs<'_>) -> Result<AssembledNar> {
        Ok(AssembledNar {
            base: self.assemble_base(inputs)?,
            noarch: self.assemble_noarch(inputs)?,
            platform: self.assemble_platform(inputs)?,
        })
    }

    /// Write the base archive holding
    /// `META-INF/nar/<group>/<artifact>/nar.properties`.
    ///
    /// # Errors
    ///
    /// See [`ArtifactAssembler::assemble`].
    pub fn assemble_base(&self, inputs: &NarInputs<'_>) -> Result<Utf8PathBuf> {
        let coordinates = inputs.coordinates;
        let properties = NarProperties::for_library(coordinates, inputs.library, inputs.triple);
        self.package(
            NarKind::Base,
            inputs.output_directory(),
            META_INF_DIR,
            &inputs.library.nar_filename(),
            |root| {
                let dir = root
                    .join("nar")
                    .join(coordinates.group_id())
                    .join(coordinates.artifact_id());
                create_dir(NarKind::Base, &dir)?;
                let file = dir.join(PROPERTIES_FILE);
                fs::write(&file, properties.render()).map_err(staging_error(NarKind::Base, &file))
            },
        )
    }

    /// Write the header archive holding the filtered `include/` tree.
    ///
    /// # Errors
    ///
    /// See [`ArtifactAssembler::assemble`].
    pub fn assemble_noarch(&self, inputs: &NarInputs<'_>) -> Result<Utf8PathBuf> {
        self.package(
            NarKind::NoArch,
            inputs.output_directory(),
            INCLUDE_DIR,
            &inputs.library.noarch_filename(),
            |root| copy_headers(inputs.include_dir, root),
        )
    }

    /// Write the binary archive holding `lib/<aol>/<binding>/<binary>`.
    ///
    /// # Errors
    ///
    /// See [`ArtifactAssembler::assemble`].
    pub fn assemble_platform(&self, inputs: &NarInputs<'_>) -> Result<Utf8PathBuf> {
        let library = inputs.library;
        self.package(
            NarKind::Platform,
            inputs.output_directory(),
            LIB_DIR,
            &library.platform_filename(inputs.triple),
            |root| {
                let dir = root
                    .join(inputs.triple.to_string())
                    .join(library.binding().as_str());
                create_dir(NarKind::Platform, &dir)?;
                let dest = dir.join(library.file_name());
                fs::copy(library.library_path(), &dest)
                    .map(drop)
                    .map_err(staging_error(NarKind::Platform, &dest))
            },
        )
    }

    /// Stage, archive and clean a single artefact.
    fn package<F>(
        &self,
        kind: NarKind,
        output_dir: &Utf8Path,
        root_name: &str,
        archive_filename: &str,
        stage: F,
    ) -> Result<Utf8PathBuf>
    where
        F: FnOnce(&Utf8Path) -> Result<()>,
    {
        let root = output_dir.join(root_name);
        if root.symlink_metadata().is_ok() {
            return Err(NarError::StagingDirectoryExists { path: root });
        }

        log::debug!("staging {kind} archive in {root}");
        if let Err(err) = stage(&root) {
            discard(&root);
            return Err(err);
        }

        let archive_path = output_dir.join(archive_filename);
        let request = ArchiveRequest {
            archive_path: &archive_path,
            base_dir: output_dir,
            source: root_name,
            mode: self.options.storage,
        };
        if let Err(err) = self.archiver.archive(&request) {
            match self.options.cleanup {
                CleanupPolicy::KeepOnFailure => {
                    log::warn!("keeping staging directory {root} for inspection");
                }
                CleanupPolicy::Always => discard(&root),
            }
            return Err(err);
        }

        fs::remove_dir_all(&root).map_err(staging_error(kind, &root))?;
        log::info!("created {archive_path}");
        Ok(archive_path)
    }
}

impl std::fmt::Debug for ArtifactAssembler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactAssembler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Whether `file_name` ends in one of [`HEADER_SUFFIXES`].
///
/// # Examples
///
/// ```
/// use bin_to_nar::assembler::is_header;
///
/// assert!(is_header("mylib.hpp"));
/// assert!(!is_header("mylib.cpp"));
/// ```
#[must_use]
pub fn is_header(file_name: &str) -> bool {
    HEADER_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

/// Copy the directory tree under `source` into `dest`, keeping every
/// directory but only header files.
///
/// # Errors
///
/// Returns [`NarError::StagingFailed`] when the tree cannot be read or a
/// directory or file cannot be written.
pub fn copy_headers(source: &Utf8Path, dest: &Utf8Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().map_or_else(|| source.to_owned(), lossy_path);
            NarError::StagingFailed {
                step: NarKind::NoArch,
                path,
                source: io::Error::from(err),
            }
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|err| NarError::StagingFailed {
                step: NarKind::NoArch,
                path: lossy_path(entry.path()),
                source: io::Error::other(err),
            })?;
        let target = lossy_path(&dest.as_std_path().join(relative));

        if entry.file_type().is_dir() {
            create_dir(NarKind::NoArch, &target)?;
        } else if entry.file_name().to_str().is_some_and(is_header) {
            fs::copy(entry.path(), &target).map_err(staging_error(NarKind::NoArch, &target))?;
        } else {
            log::debug!("skipping non-header file {}", entry.path().display());
        }
    }
    Ok(())
}

fn create_dir(step: NarKind, dir: &Utf8Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(staging_error(step, dir))
}

fn staging_error(step: NarKind, path: &Utf8Path) -> impl FnOnce(io::Error) -> NarError + '_ {
    move |source| NarError::StagingFailed {
        step,
        path: path.to_owned(),
        source,
    }
}

fn lossy_path(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from(path.to_string_lossy().into_owned())
}

/// Best-effort removal of a staging root after a failure.
fn discard(root: &Utf8Path) {
    match fs::remove_dir_all(root) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            log::warn!("could not remove staging directory {root}: {err}");
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
