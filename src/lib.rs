//! NAR packaging for prebuilt native libraries.
//!
//! This crate wraps a compiled library, its headers and platform metadata in
//! the three archives consumed by the Maven NAR plugin, and optionally
//! registers them with a local or remote Maven repository. It backs the
//! `bin-to-nar` CLI binary and can be driven programmatically.
//!
//! # Modules
//!
//! - [`archive`] - Zip and `jar` archivers
//! - [`assembler`] - Staging, archiving and cleanup of the three NARs
//! - [`binding`] - Library binding types
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Option layering and validation
//! - [`coordinates`] - Maven project coordinates
//! - [`error`] - Error taxonomy
//! - [`executor`] - External command execution
//! - [`library`] - Library descriptors and platform naming flavours
//! - [`naming`] - NAR file name grammar
//! - [`output`] - Progress messages
//! - [`pipeline`] - End-to-end run orchestration
//! - [`plan`] - Execution plan rendering
//! - [`properties`] - The `nar.properties` manifest
//! - [`publisher`] - Maven install and deploy
//! - [`triple`] - Architecture-OS-linker triples

pub mod archive;
pub mod assembler;
pub mod binding;
pub mod cli;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod executor;
pub mod library;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod properties;
pub mod publisher;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod triple;
