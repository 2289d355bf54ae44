//! External command execution.
//!
//! The `jar` archiver and the Maven publisher both shell out. They do so
//! through [`CommandExecutor`] so tests can substitute a mock or stub.

use crate::error::{NarError, Result};
use camino::Utf8Path;
use std::process::{Command, Output};

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs `cmd` with `args` in `cwd` and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bin_to_nar::executor::{CommandExecutor, SystemCommandExecutor};
    /// use camino::Utf8Path;
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run("mvn", &["--version".to_owned()], Utf8Path::new("."))?;
    /// assert!(output.status.success());
    /// # Ok::<(), bin_to_nar::error::NarError>(())
    /// ```
    fn run(&self, cmd: &str, args: &[String], cwd: &Utf8Path) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[String], cwd: &Utf8Path) -> Result<Output> {
        log::debug!("running {} in {cwd}", command_line(cmd, args));
        Command::new(cmd)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(NarError::from)
    }
}

/// Render a command and its arguments as a single display line.
#[must_use]
pub fn command_line<S: AsRef<str>>(cmd: &str, args: &[S]) -> String {
    std::iter::once(cmd)
        .chain(args.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Return trimmed stderr of a finished command, falling back to stdout.
#[must_use]
pub fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    message.trim().to_owned()
}
