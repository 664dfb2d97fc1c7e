//! Process-based action execution through the bridge CLI.
//!
//! [`CliExecutor`] locates the CLI on the search path, spawns
//! `<cli> --json <descriptor>`, drains both output streams, waits for the
//! process to exit, and parses standard output as a [`ResponseDocument`].
//! Each call owns its child process from spawn to exit; nothing is pooled.
//!
//! On Unix the CLI leads its own process group. A timeout kills the whole
//! group and returns without waiting for the output readers, so helpers the
//! CLI forked cannot hold the caller past the limit.

use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ExecutionError;
use crate::protocol::{ActionDescriptor, ResponseDocument};
use crate::runner::ActionExecutor;

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
const JSON_FLAG: &str = "--json";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Executes descriptors by spawning the bridge CLI.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use deckbridge_actions::{ActionDescriptor, ActionExecutor, CliExecutor};
///
/// let executor = CliExecutor::new("mumble_json_bridge_cli")
///     .with_timeout(Some(Duration::from_secs(30)));
/// let response = executor.execute(&ActionDescriptor::new("toggle_local_user_mute"));
/// ```
#[derive(Debug, Clone)]
pub struct CliExecutor {
    program: String,
    search_path: Option<OsString>,
    timeout: Option<Duration>,
}

impl CliExecutor {
    /// Creates an executor for the named program, looked up on `PATH`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            search_path: None,
            timeout: None,
        }
    }

    /// Searches the given `PATH`-style list instead of the process `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Kills the process once `timeout` elapses; `None` waits indefinitely.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name of the program this executor runs.
    #[must_use]
    pub const fn program(&self) -> &str {
        self.program.as_str()
    }

    /// Resolves the program to an executable path.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::ExecutableNotFound`] when no executable of
    /// that name is on the search path.
    pub fn locate(&self) -> Result<PathBuf, ExecutionError> {
        let located = self.search_path.as_ref().map_or_else(
            || which::which(&self.program),
            |paths| {
                let cwd = env::current_dir().unwrap_or_default();
                which::which_in(&self.program, Some(paths), cwd)
            },
        );
        located.map_err(|source| ExecutionError::ExecutableNotFound {
            program: self.program.clone(),
            source,
        })
    }

    fn io_error(&self, source: io::Error) -> ExecutionError {
        ExecutionError::Io {
            program: self.program.clone(),
            source: Arc::new(source),
        }
    }

    fn spawn(&self, executable: &Path, argument: &str) -> Result<Child, ExecutionError> {
        let mut command = Command::new(executable);
        command
            .arg(JSON_FLAG)
            .arg(argument)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command
            .spawn()
            .map_err(|source| ExecutionError::SpawnFailed {
                program: self.program.clone(),
                source: Arc::new(source),
            })
    }

    fn run(
        &self,
        executable: &Path,
        descriptor: &ActionDescriptor,
    ) -> Result<ResponseDocument, ExecutionError> {
        let argument = descriptor
            .to_command_argument()
            .map_err(ExecutionError::SerializeDescriptor)?;

        debug!(
            target: PROCESS_TARGET,
            program = self.program.as_str(),
            executable = %executable.display(),
            operation = descriptor.operation(),
            "spawning bridge CLI"
        );

        let mut child = self.spawn(executable, &argument)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.io_error(io::Error::other("failed to capture stdout")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.io_error(io::Error::other("failed to capture stderr")))?;

        let started = Instant::now();
        let stdout_reader = thread::spawn(move || drain_stream(stdout));
        let stderr_reader = thread::spawn(move || drain_stream(stderr));

        // Readers still blocked on a pipe after a timeout are left detached.
        let status = match wait_for_exit(&mut child, self.timeout) {
            Ok(WaitOutcome::Exited(status)) => status,
            Ok(WaitOutcome::TimedOut(limit)) => {
                warn!(
                    target: PROCESS_TARGET,
                    program = self.program.as_str(),
                    timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    "bridge CLI timed out and was killed"
                );
                return Err(ExecutionError::Timeout { timeout: limit });
            }
            Err(error) => return Err(self.io_error(error)),
        };

        let stdout = join_reader(stdout_reader.join());
        let stderr = join_reader(stderr_reader.join()).map_err(|error| self.io_error(error))?;
        debug!(
            target: PROCESS_TARGET,
            program = self.program.as_str(),
            ?status,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            stderr = stderr.as_str(),
            "bridge CLI exited"
        );

        if !status.success() {
            return Err(ExecutionError::NonZeroExit {
                status: status.code().unwrap_or(-1),
                stderr,
            });
        }

        let stdout = stdout.map_err(|error| self.io_error(error))?;
        parse_response(stdout)
    }
}

impl ActionExecutor for CliExecutor {
    fn execute(&self, descriptor: &ActionDescriptor) -> Result<ResponseDocument, ExecutionError> {
        let executable = self.locate()?;
        self.run(&executable, descriptor)
    }
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut(Duration),
}

/// Reads a stream line by line until it closes.
///
/// Lines are captured up to the first empty line; anything after it is read
/// and discarded so the child never blocks on a full pipe. Captured lines are
/// concatenated without their terminators and the result is trimmed.
fn drain_stream(stream: impl Read) -> io::Result<String> {
    let mut reader = BufReader::new(stream);
    let mut captured = String::new();
    let mut capturing = true;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if !capturing {
            continue;
        }
        let content = line.trim_end_matches(['\r', '\n']);
        if content.is_empty() {
            capturing = false;
        } else {
            captured.push_str(content);
        }
    }

    Ok(captured.trim().to_owned())
}

fn join_reader(joined: thread::Result<io::Result<String>>) -> io::Result<String> {
    joined.unwrap_or_else(|_| Err(io::Error::other("output reader thread panicked")))
}

fn wait_for_exit(child: &mut Child, timeout: Option<Duration>) -> io::Result<WaitOutcome> {
    let Some(limit) = timeout else {
        return child.wait().map(WaitOutcome::Exited);
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(WaitOutcome::Exited(status));
        }
        if started.elapsed() >= limit {
            kill_process_tree(child);
            drop(child.wait());
            return Ok(WaitOutcome::TimedOut(limit));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kills the child's process group, falling back to the child alone.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let killed = i32::try_from(child.id())
        .map(Pid::from_raw)
        .is_ok_and(|group| killpg(group, Signal::SIGKILL).is_ok());
    if !killed {
        drop(child.kill());
    }
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    drop(child.kill());
}

fn parse_response(stdout: String) -> Result<ResponseDocument, ExecutionError> {
    serde_json::from_str(&stdout)
        .map_err(|source| ExecutionError::MalformedResponse { output: stdout, source })
}
