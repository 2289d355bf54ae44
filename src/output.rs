//! User-facing progress messages.
//!
//! Progress goes to stderr so that stdout stays free for scripting; write
//! failures are ignored because the messages are informational only.

use crate::assembler::AssembledNar;
use crate::error::PublishFailure;
use std::fmt::Display;
use std::io::Write;

/// Banner printed before the plan.
pub const BANNER: &str = "Binary to NAR generator";

/// Write `message` and a newline to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Summarise the archives written by a run.
///
/// # Examples
///
/// ```
/// use bin_to_nar::assembler::AssembledNar;
/// use bin_to_nar::output::assembled_message;
///
/// let nar = AssembledNar {
///     base: "out/mylib-1.2.0.nar".into(),
///     noarch: "out/mylib-1.2.0-noarch.nar".into(),
///     platform: "out/mylib-1.2.0-x86_64-Linux-gpp-shared.nar".into(),
/// };
/// assert!(assembled_message(&nar).starts_with("Created 3 NAR files:"));
/// ```
#[must_use]
pub fn assembled_message(nar: &AssembledNar) -> String {
    format!(
        "Created 3 NAR files:\n  {}\n  {}\n  {}",
        nar.base, nar.noarch, nar.platform
    )
}

/// Describe a single failed registration for the progress log.
#[must_use]
pub fn publish_failure_line(verb: &str, failure: &PublishFailure) -> String {
    format!("  {verb} failed: {failure}")
}
