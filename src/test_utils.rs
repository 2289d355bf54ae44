//! Shared test utilities for driving the archiver and publisher without
//! spawning real processes.

use crate::error::{NarError, Result};
use crate::executor::CommandExecutor;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "mvn").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Expect `cmd` with `args`, answering with `result`.
    #[must_use]
    pub fn new<S: AsRef<str>>(cmd: &'static str, args: &[S], result: Result<Output>) -> Self {
        Self {
            cmd,
            args: args.iter().map(|arg| arg.as_ref().to_owned()).collect(),
            result,
        }
    }
}

/// A command invocation observed by [`StubExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The command that was run.
    pub cmd: String,
    /// Its arguments.
    pub args: Vec<String>,
    /// The working directory it was run in.
    pub cwd: Utf8PathBuf,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Matches invocations against expected calls in order and returns their
/// predefined results. Unexpected or mismatched invocations produce
/// [`NarError::StubMismatch`] so that callers which tolerate command
/// failures still surface the problem.
#[derive(Debug, Default)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    recorded: RefCell<Vec<RecordedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            recorded: RefCell::new(Vec::new()),
        }
    }

    /// Returns every invocation seen so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.recorded.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[String], cwd: &Utf8Path) -> Result<Output> {
        self.recorded.borrow_mut().push(RecordedCall {
            cmd: cmd.to_owned(),
            args: args.to_vec(),
            cwd: cwd.to_owned(),
        });

        let call = self
            .expected
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| NarError::StubMismatch {
                message: format!("unexpected invocation of {cmd}"),
            })?;

        if call.cmd != cmd || call.args != args {
            return Err(NarError::StubMismatch {
                message: format!(
                    "expected {} {:?}, got {cmd} {args:?}",
                    call.cmd, call.args
                ),
            });
        }

        call.result
    }
}
