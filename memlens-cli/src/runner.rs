//! Process Runner
//!
//! Executes one external command with a hard timeout and captures its output.
//!
//! Each child is placed in its own process group so a timeout can take down
//! everything it spawned (the instrumentation tool and the analyzed program
//! both fork). The group is also killed once the leader exits, so stray
//! descendants never outlive the run. stdout and stderr are drained on
//! background threads; a child that fills a pipe can never stall the wait, and
//! collecting the drained output is bounded by the termination grace period.
//!
//! A nonzero exit is a normal outcome. Only a failed launch or an expired
//! timeout is an error.

use std::ffi::OsStr;
use std::io::Read;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Grace period between SIGTERM and SIGKILL on timeout, and the bound on collecting output
const TERMINATION_GRACE: Duration = Duration::from_millis(500);

/// Failure to obtain a finished process
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The program could not be started
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying launch error
        source: std::io::Error,
    },

    /// The process group was killed after exceeding the timeout
    #[error("{program} did not finish within {limit:?}")]
    Timeout {
        /// Program that was killed
        program: String,
        /// Configured limit
        limit: Duration,
    },

    /// Waiting on the child failed
    #[error("I/O error while waiting for child: {0}")]
    Io(#[from] std::io::Error),
}

/// How the child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with a status code
    Exited(i32),
    /// Killed by a signal
    Signaled(i32),
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitOutcome::Exited(code),
            (None, Some(signal)) => ExitOutcome::Signaled(signal),
            (None, None) => ExitOutcome::Exited(-1),
        }
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr, lossily decoded
    pub stderr: String,
    /// How the process terminated
    pub exit: ExitOutcome,
    /// Wall-clock time from launch to exit
    pub elapsed: Duration,
}

impl ProcessOutput {
    /// True only for a normal exit with status 0
    pub fn success(&self) -> bool {
        self.exit == ExitOutcome::Exited(0)
    }
}

/// Runs external commands with a fixed timeout
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    timeout: Duration,
}

/// Send a signal to every process in the child's group. Errors are ignored:
/// the group may already be gone.
fn signal_group(pgid: u32, signal: libc::c_int) {
    let ret = unsafe { libc::kill(-(pgid as libc::pid_t), signal) };
    if ret == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return;
        }
        debug!("signal {} to group {} not delivered: {}", signal, pgid, err);
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Take whatever a drain thread captured, giving up at `deadline`
fn collect(pipe: Option<Receiver<Vec<u8>>>, deadline: Instant) -> String {
    pipe.and_then(|rx| {
        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .ok()
    })
    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    .unwrap_or_default()
}

impl ProcessRunner {
    /// Create a runner that kills children after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args`, capturing stdout, stderr and the exit outcome.
    pub fn run<P, I, S>(&self, program: P, args: I) -> Result<ProcessOutput, RunnerError>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program_name = program.as_ref().to_string_lossy().into_owned();
        let mut command = Command::new(program.as_ref());
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        debug!("launching {:?}", command);

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: program_name.clone(),
            source,
        })?;
        let pid = child.id();

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let status = child.wait();
            let _ = tx.send((status, start.elapsed()));
        });

        match rx.recv_timeout(self.timeout) {
            Ok((status, elapsed)) => {
                let status = status?;
                // Descendants left behind by the leader would hold the pipes open
                signal_group(pid, libc::SIGKILL);
                let deadline = Instant::now() + TERMINATION_GRACE;
                let output = ProcessOutput {
                    stdout: collect(stdout, deadline),
                    stderr: collect(stderr, deadline),
                    exit: status.into(),
                    elapsed,
                };
                debug!(
                    "{} finished in {:.2?} with {:?}",
                    program_name, output.elapsed, output.exit
                );
                Ok(output)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "{} exceeded {:?}, terminating process group {}",
                    program_name, self.timeout, pid
                );
                signal_group(pid, libc::SIGTERM);
                let exited = rx.recv_timeout(TERMINATION_GRACE).is_ok();
                signal_group(pid, libc::SIGKILL);
                if !exited {
                    let _ = rx.recv();
                }
                // Output threads are detached: a surviving grandchild may still hold the pipes.
                Err(RunnerError::Timeout {
                    program: program_name,
                    limit: self.timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(RunnerError::Io(std::io::Error::other(
                "child wait thread exited without reporting a status",
            ))),
        }
    }
}
