//! Registration of NAR archives with Maven.
//!
//! Each archive is handed to Maven's `install-file` or `deploy-file` goal in
//! its own process, run from the output directory so the archive can be
//! named by file name alone. Invocations are independent: by default a
//! failing artefact is recorded and the remaining artefacts are still
//! attempted.

use crate::coordinates::ProjectCoordinates;
use crate::error::{NarError, PublishFailure, Result};
use crate::executor::{CommandExecutor, command_line, failure_message};
use crate::library::LibraryDescriptor;
use crate::naming::{NarKind, NarName};
use crate::output::write_stderr_line;
use crate::triple::PlatformTriple;
use std::fmt;
use std::io::Write;

/// Maven goal registering an archive in the local repository.
pub const INSTALL_GOAL: &str = "org.apache.maven.plugins:maven-install-plugin:2.5.2:install-file";

/// Maven goal uploading an archive to a remote repository.
pub const DEPLOY_GOAL: &str = "org.apache.maven.plugins:maven-deploy-plugin:2.8.2:deploy-file";

/// Return the Maven launcher for the host platform.
#[must_use]
pub const fn default_maven_command() -> &'static str {
    if cfg!(windows) { "mvn.cmd" } else { "mvn" }
}

/// Repository an archive is registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    /// The local Maven repository.
    Install,
    /// A remote repository.
    Deploy {
        /// Repository URL.
        url: String,
        /// Server id in Maven `settings.xml` holding the credentials.
        repository_id: String,
    },
}

impl PublishTarget {
    /// Return the Maven goal for this target.
    #[must_use]
    pub const fn goal(&self) -> &'static str {
        match self {
            Self::Install => INSTALL_GOAL,
            Self::Deploy { .. } => DEPLOY_GOAL,
        }
    }

    /// Return a short verb describing the target.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Deploy { .. } => "deploy",
        }
    }
}

impl fmt::Display for PublishTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => f.write_str("local repository"),
            Self::Deploy { url, repository_id } => write!(f, "{url} ({repository_id})"),
        }
    }
}

/// Reaction to a failed registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublishPolicy {
    /// Record the failure and keep going.
    #[default]
    ContinueOnFailure,
    /// Stop at the first failure.
    StopOnFirstFailure,
}

/// The archives to register and the project they belong to.
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    /// Project coordinates; the output directory is the working directory.
    pub coordinates: &'a ProjectCoordinates,
    /// Archive names in publishing order.
    pub archives: Vec<NarName>,
}

impl<'a> PublishRequest<'a> {
    /// Request registration of the base, header and binary archives.
    #[must_use]
    pub fn for_library(
        coordinates: &'a ProjectCoordinates,
        library: &LibraryDescriptor,
        triple: &PlatformTriple,
    ) -> Self {
        Self {
            coordinates,
            archives: vec![
                library.nar_name(),
                library.noarch_name(),
                library.platform_name(triple),
            ],
        }
    }
}

/// Build the Maven arguments registering `archive` with `target`.
///
/// # Examples
///
/// ```no_run
/// use bin_to_nar::coordinates::ProjectCoordinates;
/// use bin_to_nar::naming::NarName;
/// use bin_to_nar::publisher::{PublishTarget, maven_arguments};
/// use camino::Utf8Path;
///
/// let coordinates = ProjectCoordinates::new(
///     "com.example",
///     "mylib",
///     "1.2.0",
///     Utf8Path::new("pom.xml"),
///     Utf8Path::new("out"),
/// )?;
/// let args = maven_arguments(&PublishTarget::Install, &NarName::base("mylib", "1.2.0"), &coordinates);
/// assert_eq!(args[1], "-Dfile=mylib-1.2.0.nar");
/// # Ok::<(), bin_to_nar::error::NarError>(())
/// ```
#[must_use]
pub fn maven_arguments(
    target: &PublishTarget,
    archive: &NarName,
    coordinates: &ProjectCoordinates,
) -> Vec<String> {
    let mut args = vec![
        target.goal().to_owned(),
        format!("-Dfile={}", archive.filename()),
    ];
    match archive.classifier() {
        None => args.extend([
            "-Dtype=nar".to_owned(),
            format!("-DgroupId={}", coordinates.group_id()),
            format!("-DartifactId={}", coordinates.artifact_id()),
            format!("-Dversion={}", coordinates.version()),
            "-Dpackaging=nar".to_owned(),
            "-DgeneratePom=false".to_owned(),
        ]),
        Some(classifier) => args.extend([
            "-Dpackaging=nar".to_owned(),
            "-DgeneratePom=false".to_owned(),
            format!("-Dclassifier={classifier}"),
            format!("-DpomFile={}", coordinates.pom_path()),
        ]),
    }
    if let PublishTarget::Deploy { url, repository_id } = target {
        args.push(format!("-DrepositoryId={repository_id}"));
        args.push(format!("-Durl={url}"));
    }
    args
}

/// Result of registering a single archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Verb of the target the archive was registered with.
    pub verb: &'static str,
    /// Which archive was registered.
    pub kind: NarKind,
    /// The failure, if registration did not succeed.
    pub failure: Option<PublishFailure>,
}

/// Outcomes of every attempted registration, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
    /// Return the outcomes in the order they were attempted.
    #[must_use]
    pub fn outcomes(&self) -> &[PublishOutcome] {
        &self.outcomes
    }

    /// Iterate over the failed registrations.
    pub fn failures(&self) -> impl Iterator<Item = &PublishFailure> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.failure.as_ref())
    }

    /// Whether every attempted registration succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Append the outcomes of `other`.
    pub fn extend(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
    }

    /// Convert the report into a result.
    ///
    /// # Errors
    ///
    /// Returns [`NarError::PublishFailed`] listing every failed registration.
    pub fn into_result(self) -> Result<()> {
        let failures: Vec<PublishFailure> = self
            .outcomes
            .into_iter()
            .filter_map(|outcome| outcome.failure)
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(NarError::PublishFailed { failures })
        }
    }
}

/// Runs Maven registration commands for NAR archives.
pub struct RepositoryPublisher<'e> {
    executor: &'e dyn CommandExecutor,
    maven: String,
    policy: PublishPolicy,
}

impl<'e> RepositoryPublisher<'e> {
    /// Create a publisher running `maven` through `executor`.
    #[must_use]
    pub fn new(
        executor: &'e dyn CommandExecutor,
        maven: impl Into<String>,
        policy: PublishPolicy,
    ) -> Self {
        Self {
            executor,
            maven: maven.into(),
            policy,
        }
    }

    /// Register every archive of `request` with `target`.
    ///
    /// Each Maven command line is echoed to `progress` before it runs.
    #[must_use]
    pub fn publish(
        &self,
        target: &PublishTarget,
        request: &PublishRequest<'_>,
        progress: &mut dyn Write,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        for archive in &request.archives {
            let outcome = self.publish_one(target, archive, request.coordinates, progress);
            let failed = outcome.failure.is_some();
            report.outcomes.push(outcome);
            if failed && self.policy == PublishPolicy::StopOnFirstFailure {
                log::warn!("stopping after the first failed {}", target.verb());
                break;
            }
        }
        report
    }

    /// Register every archive with each target in turn.
    ///
    /// Under [`PublishPolicy::StopOnFirstFailure`] later targets are skipped
    /// once one fails.
    #[must_use]
    pub fn publish_all(
        &self,
        targets: &[PublishTarget],
        request: &PublishRequest<'_>,
        progress: &mut dyn Write,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        for target in targets {
            report.extend(self.publish(target, request, progress));
            if !report.is_success() && self.policy == PublishPolicy::StopOnFirstFailure {
                break;
            }
        }
        report
    }

    fn publish_one(
        &self,
        target: &PublishTarget,
        archive: &NarName,
        coordinates: &ProjectCoordinates,
        progress: &mut dyn Write,
    ) -> PublishOutcome {
        let args = maven_arguments(target, archive, coordinates);
        log::info!("{} {} archive", target.verb(), archive.kind());
        write_stderr_line(progress, command_line(&self.maven, args.as_slice()));

        let failure = match self
            .executor
            .run(&self.maven, &args, coordinates.output_directory())
        {
            Ok(output) if output.status.success() => {
                log::debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
                None
            }
            Ok(output) => Some(PublishFailure {
                kind: archive.kind(),
                exit_code: output.status.code(),
                message: failure_message(&output),
            }),
            Err(err) => Some(PublishFailure {
                kind: archive.kind(),
                exit_code: None,
                message: err.to_string(),
            }),
        };

        if let Some(failure) = &failure {
            log::warn!("{} of {failure} failed", target.verb());
        }
        PublishOutcome {
            verb: target.verb(),
            kind: archive.kind(),
            failure,
        }
    }
}

impl fmt::Debug for RepositoryPublisher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryPublisher")
            .field("maven", &self.maven)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
