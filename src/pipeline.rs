//! Packaging pipeline orchestration.
//!
//! Wires a validated [`PackagingConfig`] to the assembler and publisher,
//! choosing the archiver and reporting progress to stderr.

use crate::archive::{Archiver, JarArchiver, ZipArchiver};
use crate::assembler::{AssembledNar, ArtifactAssembler, NarInputs};
use crate::config::{ArchiverKind, PackagingConfig};
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::output::{assembled_message, publish_failure_line, write_stderr_line};
use crate::publisher::{PublishRequest, PublishTarget, RepositoryPublisher};
use std::io::Write;

/// Context for a packaging run.
pub struct PipelineContext<'a> {
    /// Validated configuration.
    pub config: &'a PackagingConfig,
    /// Runs `jar` and `mvn`.
    pub executor: &'a dyn CommandExecutor,
    /// Suppress progress output.
    pub quiet: bool,
}

impl PipelineContext<'_> {
    fn progress(&self, stderr: &mut dyn Write, message: impl std::fmt::Display) {
        if !self.quiet {
            write_stderr_line(stderr, message);
        }
    }
}

/// Write the three NARs into the output directory.
///
/// # Errors
///
/// Returns any staging or archiving error from the assembler.
pub fn assemble_nars(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<AssembledNar> {
    let config = context.config;
    context.progress(
        stderr,
        format!("Creating NAR files in {}...", config.output_directory()),
    );

    let zip = ZipArchiver;
    let jar = JarArchiver::new(context.executor, config.jar.as_str(), config.is_verbose());
    let archiver: &dyn Archiver = match config.archiver {
        ArchiverKind::Zip => &zip,
        ArchiverKind::Jar => &jar,
    };

    let inputs = NarInputs {
        library: &config.library,
        triple: &config.triple,
        coordinates: &config.coordinates,
        include_dir: &config.include_dir,
    };
    let nar = ArtifactAssembler::new(archiver, config.assembler).assemble(&inputs)?;
    context.progress(stderr, assembled_message(&nar));
    Ok(nar)
}

/// Register the NARs with every configured repository.
///
/// Does nothing when neither install nor deploy was requested.
///
/// # Errors
///
/// Returns [`crate::error::NarError::PublishFailed`] listing every failed
/// registration.
pub fn publish_nars(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<()> {
    let config = context.config;
    if config.targets.is_empty() {
        return Ok(());
    }

    for target in &config.targets {
        let message = match target {
            PublishTarget::Install => "Installing NAR files into the local repository...".to_owned(),
            PublishTarget::Deploy { .. } => format!("Deploying NAR files to {target}..."),
        };
        context.progress(stderr, message);
    }

    let publisher = RepositoryPublisher::new(
        context.executor,
        config.maven.as_str(),
        config.publish_policy,
    );
    let request = PublishRequest::for_library(&config.coordinates, &config.library, &config.triple);
    let mut sink = std::io::sink();
    let progress: &mut dyn Write = if context.quiet { &mut sink } else { &mut *stderr };
    let report = publisher.publish_all(&config.targets, &request, progress);

    for outcome in report.outcomes() {
        if let Some(failure) = &outcome.failure {
            write_stderr_line(stderr, publish_failure_line(outcome.verb, failure));
        }
    }
    report.into_result()
}

/// Assemble the NARs, then publish them.
///
/// # Errors
///
/// Returns the first assembly error, or the publishing failures.
pub fn run_pipeline(context: &PipelineContext<'_>, stderr: &mut dyn Write) -> Result<AssembledNar> {
    let nar = assemble_nars(context, stderr)?;
    publish_nars(context, stderr)?;
    Ok(nar)
}
