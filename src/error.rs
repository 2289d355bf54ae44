//! Error types for NAR packaging.
//!
//! Variants fall into four groups: configuration problems detected before
//! any filesystem mutation, staging failures while laying out an archive,
//! archiver failures, and repository publishing failures. Each message is
//! written so that the CLI can print it verbatim.

use crate::naming::NarKind;
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while packaging or publishing NAR artefacts.
#[derive(Debug, Error)]
pub enum NarError {
    /// A required input path does not exist or has the wrong file type.
    #[error("{what} not found at {path}")]
    PathNotFound {
        /// Human-readable name of the missing input (for example "library").
        what: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },

    /// A value is outside the closed set accepted for an option.
    #[error("invalid {option} {value:?}; expected one of: {expected}")]
    InvalidChoice {
        /// Option name, such as "architecture".
        option: &'static str,
        /// Rejected value.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },

    /// A required option was supplied neither on the command line nor in
    /// the configuration file.
    #[error("missing required option {option}")]
    MissingOption {
        /// Flag or argument name of the missing option, such as `--libpath`.
        option: &'static str,
    },

    /// The output directory exists but cannot be written to.
    #[error("output directory {path} is not writable: {reason}")]
    OutputNotWritable {
        /// Path to the output directory.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration file {path}: {reason}")]
    InvalidConfigFile {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the read or parse failure.
        reason: String,
    },

    /// A filesystem path is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// Creating directories or copying files for an archive failed.
    #[error("staging the {step} archive failed at {path}: {source}")]
    StagingFailed {
        /// Archive being staged when the failure happened.
        step: NarKind,
        /// Path involved in the failing operation.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A staging root is already present in the output directory.
    #[error("staging directory {path} already exists; clean the output directory and retry")]
    StagingDirectoryExists {
        /// The pre-existing staging root.
        path: Utf8PathBuf,
    },

    /// The archiver failed to produce an archive.
    #[error("creating {archive} failed{}: {reason}", ExitCodeSuffix(.exit_code))]
    ArchiveFailed {
        /// Archive that was being written.
        archive: Utf8PathBuf,
        /// Exit code of the external archiver, when one was run.
        exit_code: Option<i32>,
        /// Description of the failure.
        reason: String,
    },

    /// One or more repository registration commands failed.
    #[error("publishing failed for {}", PublishFailureList(.failures))]
    PublishFailed {
        /// Every artefact whose registration failed.
        failures: Vec<PublishFailure>,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// A failed registration of a single artefact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFailure {
    /// Which of the three archives failed.
    pub kind: NarKind,
    /// Exit code of the registration command, if it ran at all.
    pub exit_code: Option<i32>,
    /// Captured stderr, or the spawn error message.
    pub message: String,
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} archive{}", self.kind, ExitCodeSuffix(&self.exit_code))?;
        if !self.message.is_empty() {
            write!(f, " ({})", self.message)?;
        }
        Ok(())
    }
}

struct ExitCodeSuffix<'a>(&'a Option<i32>);

impl fmt::Display for ExitCodeSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, " with exit code {code}"),
            None => Ok(()),
        }
    }
}

struct PublishFailureList<'a>(&'a [PublishFailure]);

impl fmt::Display for PublishFailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, failure) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// Result type alias using [`NarError`].
pub type Result<T> = std::result::Result<T, NarError>;
