//! Typed external command execution: build a command as a value, run it with
//! captured output under a deadline, and never leak the child or its
//! descendants.
//!
//! Every extractor invocation goes through here. The child runs in its own
//! process group; on deadline or global cancellation the whole group is
//! killed, so helpers spawned by the tool (shells, converters) die with it.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::utils::config::{COMMAND_CAPTURE_MAX, COMMAND_POLL_MS};

/// A command line as a value. No shell is involved at any point; arguments
/// are passed through verbatim.
#[derive(Clone, Debug)]
pub struct ExternalCommand {
    program: String,
    args: Vec<OsString>,
}

/// Outcome of a completed (or killed) invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code when the child exited normally.
    pub exit_code: Option<i32>,
    /// True when the deadline expired and the process group was killed.
    pub timed_out: bool,
    /// True when the run was aborted by global cancellation.
    pub cancelled: bool,
}

impl CommandOutput {
    /// Captured stdout as lossy UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn success(&self) -> bool {
        !self.timed_out && !self.cancelled && self.exit_code == Some(0)
    }
}

impl ExternalCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn arg_path(self, path: &Path) -> Self {
        self.arg(path.as_os_str().to_os_string())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run to completion under `deadline`, draining stdout/stderr on reader
    /// threads (capture is truncated past a cap but the pipes stay drained).
    /// Returns Err only when the child could not be spawned (tool missing);
    /// timeouts and nonzero exits are data in [`CommandOutput`].
    pub fn run(&self, deadline: Duration, cancel: &Arc<AtomicBool>) -> Result<CommandOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawn {}", self.program))?;
        let pid = child.id();

        let stdout = child.stdout.take().expect("stdout piped");
        let stderr = child.stderr.take().expect("stderr piped");
        let out_handle = spawn_drain(stdout);
        let err_handle = spawn_drain(stderr);

        let started = Instant::now();
        let poll = Duration::from_millis(COMMAND_POLL_MS);
        let mut timed_out = false;
        let mut cancelled = false;
        let exit_code = loop {
            if let Some(status) = child.try_wait().context("wait on child")? {
                break status.code();
            }
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                kill_group(pid);
                let _ = child.wait();
                break None;
            }
            if started.elapsed() >= deadline {
                timed_out = true;
                kill_group(pid);
                let _ = child.wait();
                break None;
            }
            std::thread::sleep(poll);
        };

        let stdout = out_handle.join().unwrap_or_default();
        let stderr = err_handle.join().unwrap_or_default();
        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            timed_out,
            cancelled,
        })
    }
}

/// Drain a pipe into a capped buffer on its own thread. Reading continues
/// past the cap (discarding) so the child never blocks on a full pipe.
fn spawn_drain<R: Read + Send + 'static>(mut pipe: R) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut captured = Vec::new();
        let mut chunk = [0u8; 64 * 1024];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let room = COMMAND_CAPTURE_MAX.saturating_sub(captured.len());
                    captured.extend_from_slice(&chunk[..n.min(room)]);
                }
            }
        }
        captured
    })
}

/// Kill the child's whole process group (negative pid). Descendants spawned
/// by the tool share the group because of `process_group(0)`.
#[cfg(unix)]
fn kill_group(pid: u32) {
    unsafe {
        libc::kill(-(pid as i32), libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}
