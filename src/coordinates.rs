//! Maven coordinates of the project the NARs belong to.

use crate::error::{NarError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Name of the scratch file used to check the output directory is writable.
const WRITE_CHECK_FILE: &str = ".bin-to-nar-write-test";

/// Group, artifact and version plus the pom and output locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCoordinates {
    group_id: String,
    artifact_id: String,
    version: String,
    pom_path: Utf8PathBuf,
    output_directory: Utf8PathBuf,
}

impl ProjectCoordinates {
    /// Validate and build project coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::PathNotFound`] if the pom file or output
    /// directory does not exist, and [`NarError::OutputNotWritable`] if a
    /// file cannot be created in the output directory.
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        version: &str,
        pom_path: &Utf8Path,
        output_directory: &Utf8Path,
    ) -> Result<Self> {
        if !pom_path.is_file() {
            return Err(NarError::PathNotFound {
                what: "pom file",
                path: pom_path.to_owned(),
            });
        }
        if !output_directory.is_dir() {
            return Err(NarError::PathNotFound {
                what: "output directory",
                path: output_directory.to_owned(),
            });
        }
        ensure_writable(output_directory)?;

        Ok(Self {
            group_id: group_id.to_owned(),
            artifact_id: artifact_id.to_owned(),
            version: version.to_owned(),
            pom_path: pom_path.to_owned(),
            output_directory: output_directory.to_owned(),
        })
    }

    /// Return the Maven group id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Return the Maven artifact id.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Return the project version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the path of the pom describing the project.
    #[must_use]
    pub fn pom_path(&self) -> &Utf8Path {
        &self.pom_path
    }

    /// Return the directory the archives are written to.
    #[must_use]
    pub fn output_directory(&self) -> &Utf8Path {
        &self.output_directory
    }
}

fn ensure_writable(dir: &Utf8Path) -> Result<()> {
    let scratch = dir.join(WRITE_CHECK_FILE);
    match fs::write(&scratch, b"") {
        Ok(()) => {
            if let Err(err) = fs::remove_file(&scratch) {
                log::warn!("could not remove write check file {scratch}: {err}");
            }
            Ok(())
        }
        Err(e) => Err(NarError::OutputNotWritable {
            path: dir.to_owned(),
            reason: e.to_string(),
        }),
    }
}
