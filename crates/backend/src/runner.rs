//! Subprocess primitive shared by all CLI-based executors.
//!
//! Spawns a named program with an exact argument vector (never through a
//! shell) and collects its output. Non-zero exits are data, not errors:
//! translating them into domain errors is the calling executor's job, since
//! each CLI backend has its own error-text conventions.

use async_trait::async_trait;
use counsel_types::{CounselError, Result};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt as _, AsyncReadExt as _, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Maximum number of characters of any argument included in debug telemetry.
const ARG_PREVIEW_MAX: usize = 120;

/// One subprocess invocation: program plus exact argument vector.
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// When set, each newline-delimited stdout line is forwarded as it
    /// arrives, in addition to being accumulated. Building block for
    /// event-streaming consumers; the default executors run buffered.
    pub line_sink: Option<UnboundedSender<String>>,
}

impl Invocation {
    /// Creates a buffered invocation.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            line_sink: None,
        }
    }

    /// Attaches a per-line stdout sink.
    #[must_use]
    pub fn with_line_sink(mut self, sink: UnboundedSender<String>) -> Self {
        self.line_sink = Some(sink);
        self
    }
}

/// The terminated child's collected output.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl RunOutput {
    /// Returns `true` if the child exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Spawns external programs and collects their output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the program to completion.
    ///
    /// # Errors
    ///
    /// Returns [`CounselError::Spawn`] when the program cannot be launched,
    /// or [`CounselError::Io`] when reading its output fails. A non-zero
    /// exit is NOT an error at this layer.
    async fn run(&self, invocation: Invocation) -> Result<RunOutput>;
}

/// The real subprocess runner used outside tests.
///
/// No built-in timeout: the caller or the OS bounds the child's lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: Invocation) -> Result<RunOutput> {
        let started = Instant::now();
        debug!(
            program = %invocation.program,
            args = ?invocation.args.iter().map(|a| preview(a)).collect::<Vec<_>>(),
            "spawning backend CLI"
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CounselError::Spawn {
                program: invocation.program.clone(),
                message: e.to_string(),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| CounselError::Spawn {
            program: invocation.program.clone(),
            message: "stdout was not captured".to_string(),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| CounselError::Spawn {
            program: invocation.program.clone(),
            message: "stderr was not captured".to_string(),
        })?;

        // stdout and stderr are drained concurrently with the wait so a
        // chatty child cannot fill a pipe and deadlock.
        let sink = invocation.line_sink;
        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut collected = String::new();
            while let Some(line) = lines.next_line().await? {
                if let Some(sink) = &sink {
                    // A dropped receiver only disables streaming.
                    let _ = sink.send(line.clone());
                }
                collected.push_str(&line);
                collected.push('\n');
            }
            Ok::<String, std::io::Error>(collected)
        });
        let stderr_task = tokio::spawn(async move {
            let mut collected = String::new();
            stderr.read_to_string(&mut collected).await?;
            Ok::<String, std::io::Error>(collected)
        });

        let status = child
            .wait()
            .await
            .map_err(|e| CounselError::Io(format!("waiting for {}: {e}", invocation.program)))?;
        let stdout = stdout_task
            .await
            .map_err(|e| CounselError::Io(e.to_string()))??;
        let stderr = stderr_task
            .await
            .map_err(|e| CounselError::Io(e.to_string()))??;

        let output = RunOutput {
            stdout,
            stderr,
            exit_code: status.code(),
            duration: started.elapsed(),
        };
        debug!(
            program = %invocation.program,
            exit_code = ?output.exit_code,
            stdout_len = output.stdout.len(),
            duration_ms = output.duration.as_millis(),
            "backend CLI finished"
        );
        Ok(output)
    }
}

/// Truncates an argument for debug telemetry.
fn preview(arg: &str) -> String {
    if arg.len() <= ARG_PREVIEW_MAX {
        return arg.to_string();
    }
    let mut end = ARG_PREVIEW_MAX;
    while !arg.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[{} chars]", &arg[..end], arg.len())
}

// ── Test support ──────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_support {
    use super::{CommandRunner, Invocation, RunOutput};
    use async_trait::async_trait;
    use counsel_types::{CounselError, Result};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// A recorded invocation, without the non-clonable line sink.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordedCall {
        pub program: String,
        pub args: Vec<String>,
    }

    /// Runner double that records invocations and replays scripted outputs.
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        outputs: Mutex<VecDeque<RunOutput>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_output(stdout: &str, stderr: &str, exit_code: i32) -> Self {
            let runner = Self::new();
            runner.push_output(stdout, stderr, exit_code);
            runner
        }

        pub(crate) fn push_output(&self, stdout: &str, stderr: &str, exit_code: i32) {
            self.outputs.lock().unwrap().push_back(RunOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code: Some(exit_code),
                duration: Duration::ZERO,
            });
        }

        pub(crate) fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: Invocation) -> Result<RunOutput> {
            self.calls.lock().unwrap().push(RecordedCall {
                program: invocation.program.clone(),
                args: invocation.args.clone(),
            });
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| CounselError::Spawn {
                    program: invocation.program,
                    message: "scripted runner has no queued output".to_string(),
                })
        }
    }
}
