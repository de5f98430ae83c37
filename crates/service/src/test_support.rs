//! Runner double shared by this crate's test modules.

use async_trait::async_trait;
use counsel_backend::{CommandRunner, Invocation, RunOutput};
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
