//! Run configuration resolved from command-line flags and a defaults file.
//!
//! Options arrive in two layers of [`PackagingOptions`]: the command line
//! and an optional TOML file named by `--config`. The command line wins
//! wherever it supplies a value. [`PackagingConfig::from_options`] then
//! validates the merged layer in one pass, so every configuration error is
//! reported before anything is staged.
//!
//! The file uses the long flag names in snake case:
//!
//! ```toml
//! libpath = "build/libmylib.so"
//! includepath = "include"
//! pompath = "pom.xml"
//! groupid = "com.example"
//! artifactid = "mylib"
//! library_version = "1.2.0"
//! architecture = "x86_64"
//! os = "Linux"
//! linker = "g++"
//! type = "shared"
//! install = true
//!
//! [deploy]
//! url = "https://repo.example.com/releases"
//! server_id = "releases"
//! ```

use crate::archive::StorageMode;
use crate::assembler::{AssemblerOptions, CleanupPolicy};
use crate::binding::BindingType;
use crate::coordinates::ProjectCoordinates;
use crate::error::{NarError, Result};
use crate::library::{LibraryDescriptor, LibraryFlavour};
use crate::publisher::{PublishPolicy, PublishTarget, default_maven_command};
use crate::triple::PlatformTriple;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use std::io;

/// Archiving tool used to write the NARs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiverKind {
    /// Write archives in-process.
    #[default]
    Zip,
    /// Run the JDK `jar` tool.
    Jar,
}

/// Remote repository settings for `--deploy`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployOptions {
    /// Repository URL.
    pub url: String,
    /// Server id in Maven `settings.xml`.
    pub server_id: String,
}

/// One unvalidated layer of options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagingOptions {
    /// Path to the compiled library.
    pub libpath: Option<Utf8PathBuf>,
    /// Directory holding the library headers.
    pub includepath: Option<Utf8PathBuf>,
    /// Pom file describing the project.
    pub pompath: Option<Utf8PathBuf>,
    /// Maven group id.
    pub groupid: Option<String>,
    /// Maven artifact id.
    pub artifactid: Option<String>,
    /// Library version.
    pub library_version: Option<String>,
    /// Target architecture.
    pub architecture: Option<String>,
    /// Target operating system.
    pub os: Option<String>,
    /// Linker the library was built with.
    pub linker: Option<String>,
    /// Binding type of the library.
    #[serde(rename = "type")]
    pub library_type: Option<String>,
    /// Install the NARs into the local repository.
    pub install: Option<bool>,
    /// Deploy the NARs to a remote repository.
    pub deploy: Option<DeployOptions>,
    /// Non-standard library file extension.
    pub ext: Option<String>,
    /// Archiving tool.
    pub archiver: Option<ArchiverKind>,
    /// Deflate archive entries instead of storing them.
    pub deflate: Option<bool>,
    /// Remove staging directories even when archiving fails.
    pub clean_on_failure: Option<bool>,
    /// Stop publishing at the first failed command.
    pub fail_fast: Option<bool>,
    /// Maven executable.
    pub mvn: Option<String>,
    /// `jar` executable.
    pub jar: Option<String>,
    /// Directory the NARs are written to.
    pub outdir: Option<Utf8PathBuf>,
}

impl PackagingOptions {
    /// Read options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::InvalidConfigFile`] when the file cannot be read
    /// or does not parse.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| NarError::InvalidConfigFile {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Parse options from TOML text; `path` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::InvalidConfigFile`] for malformed TOML, unknown
    /// keys or values of the wrong type.
    pub fn parse(text: &str, path: &Utf8Path) -> Result<Self> {
        toml::from_str(text).map_err(|err| NarError::InvalidConfigFile {
            path: path.to_owned(),
            reason: err.message().to_owned(),
        })
    }

    /// Fill every unset value from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            libpath: self.libpath.or(fallback.libpath),
            includepath: self.includepath.or(fallback.includepath),
            pompath: self.pompath.or(fallback.pompath),
            groupid: self.groupid.or(fallback.groupid),
            artifactid: self.artifactid.or(fallback.artifactid),
            library_version: self.library_version.or(fallback.library_version),
            architecture: self.architecture.or(fallback.architecture),
            os: self.os.or(fallback.os),
            linker: self.linker.or(fallback.linker),
            library_type: self.library_type.or(fallback.library_type),
            install: self.install.or(fallback.install),
            deploy: self.deploy.or(fallback.deploy),
            ext: self.ext.or(fallback.ext),
            archiver: self.archiver.or(fallback.archiver),
            deflate: self.deflate.or(fallback.deflate),
            clean_on_failure: self.clean_on_failure.or(fallback.clean_on_failure),
            fail_fast: self.fail_fast.or(fallback.fail_fast),
            mvn: self.mvn.or(fallback.mvn),
            jar: self.jar.or(fallback.jar),
            outdir: self.outdir.or(fallback.outdir),
        }
    }
}

/// A fully validated packaging run.
#[derive(Debug, Clone)]
pub struct PackagingConfig {
    /// The library being packaged.
    pub library: LibraryDescriptor,
    /// Target platform of the library.
    pub triple: PlatformTriple,
    /// Project coordinates and output directory.
    pub coordinates: ProjectCoordinates,
    /// Directory holding the library headers.
    pub include_dir: Utf8PathBuf,
    /// Repositories to register the NARs with, in order.
    pub targets: Vec<PublishTarget>,
    /// Output verbosity (`-v` count).
    pub verbosity: u8,
    /// Archiving tool.
    pub archiver: ArchiverKind,
    /// Storage and cleanup settings for the assembler.
    pub assembler: AssemblerOptions,
    /// Reaction to failed registrations.
    pub publish_policy: PublishPolicy,
    /// Maven executable.
    pub maven: String,
    /// `jar` executable.
    pub jar: String,
}

impl PackagingConfig {
    /// Validate merged options.
    ///
    /// Paths are canonicalised against the current directory, since Maven
    /// later runs inside the output directory.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::MissingOption`] for an absent required value,
    /// [`NarError::InvalidChoice`] for a value outside its closed set,
    /// [`NarError::PathNotFound`] for a missing input and
    /// [`NarError::OutputNotWritable`] for a read-only output directory.
    pub fn from_options(options: PackagingOptions, verbosity: u8) -> Result<Self> {
        let libpath = required(options.libpath, "--libpath")?;
        let includepath = required(options.includepath, "--includepath")?;
        let pompath = required(options.pompath, "--pompath")?;
        let group_id = required(options.groupid, "--groupid")?;
        let artifact_id = required(options.artifactid, "--artifactid")?;
        let version = required(options.library_version, "--library-version")?;
        let architecture = required(options.architecture, "--architecture")?;
        let os = required(options.os, "--os")?;
        let linker = required(options.linker, "--linker")?;
        let library_type = required(options.library_type, "--type")?;
        let outdir = required(options.outdir, "OUTDIR")?;

        let triple = PlatformTriple::parse(&architecture, &os, &linker)?;
        let binding = BindingType::try_from(library_type.as_str())?;
        let flavour = LibraryFlavour::for_os(triple.operating_system());

        let library = LibraryDescriptor::new(
            &resolve_path(&libpath, "library")?,
            &version,
            binding,
            options.ext.as_deref(),
            flavour,
        )?;

        let include_dir = resolve_path(&includepath, "include directory")?;
        if !include_dir.is_dir() {
            return Err(NarError::PathNotFound {
                what: "include directory",
                path: includepath,
            });
        }

        let coordinates = ProjectCoordinates::new(
            &group_id,
            &artifact_id,
            &version,
            &resolve_path(&pompath, "pom file")?,
            &resolve_path(&outdir, "output directory")?,
        )?;

        let mut targets = Vec::new();
        if options.install.unwrap_or(false) {
            targets.push(PublishTarget::Install);
        }
        if let Some(deploy) = options.deploy {
            targets.push(PublishTarget::Deploy {
                url: deploy.url,
                repository_id: deploy.server_id,
            });
        }

        Ok(Self {
            library,
            triple,
            coordinates,
            include_dir,
            targets,
            verbosity,
            archiver: options.archiver.unwrap_or_default(),
            assembler: AssemblerOptions {
                storage: if options.deflate.unwrap_or(false) {
                    StorageMode::Deflated
                } else {
                    StorageMode::Stored
                },
                cleanup: if options.clean_on_failure.unwrap_or(false) {
                    CleanupPolicy::Always
                } else {
                    CleanupPolicy::KeepOnFailure
                },
            },
            publish_policy: if options.fail_fast.unwrap_or(false) {
                PublishPolicy::StopOnFirstFailure
            } else {
                PublishPolicy::ContinueOnFailure
            },
            maven: options
                .mvn
                .unwrap_or_else(|| default_maven_command().to_owned()),
            jar: options
                .jar
                .unwrap_or_else(|| crate::archive::DEFAULT_JAR.to_owned()),
        })
    }

    /// Whether commands should be echoed as they run.
    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbosity > 1
    }

    /// Return the directory the NARs are written to.
    #[must_use]
    pub fn output_directory(&self) -> &Utf8Path {
        self.coordinates.output_directory()
    }
}

fn required<T>(value: Option<T>, option: &'static str) -> Result<T> {
    value.ok_or(NarError::MissingOption { option })
}

/// Canonicalise `path`, reporting a missing path as [`NarError::PathNotFound`].
fn resolve_path(path: &Utf8Path, what: &'static str) -> Result<Utf8PathBuf> {
    path.canonicalize_utf8().map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => NarError::PathNotFound {
            what,
            path: path.to_owned(),
        },
        io::ErrorKind::InvalidData => NarError::NonUtf8Path {
            path: path.to_string(),
        },
        _ => NarError::Io(err),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
