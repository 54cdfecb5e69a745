//! Sandboxed execution of untrusted programs.
//!
//! One [`DockerSandbox::execute`] call runs one (program, input) pair in a
//! network-isolated, resource-capped container and returns a classified
//! [`ExecutionOutcome`]. The module does not compare outputs or decide
//! verdicts; it only runs, collects, and classifies.
//!
//! Protocol with the runner images: the source file (fixed per-language
//! name) and `input.txt` are placed in a scratch directory that is
//! bind-mounted read-write at `/code`. The image's entrypoint compiles if
//! needed, runs the program with stdin bound to `input.txt`, and writes
//! back `output.txt`, `error.txt`/`runtime_error.txt`, `compile_error.txt`,
//! `metrics.txt`, and optionally `status.txt`.

pub mod classify;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::get_config;
use crate::error::{JudgeError, Result};
use crate::languages::get_language_config;
use crate::metrics::{parse_metrics, ResourceUsage};
use crate::models::Language;

pub use classify::{classify, ExecutionStatus, RunSignals, TIMEOUT_EXIT_CODE};

/// Classified outcome of one sandbox execution.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    /// Program stdout, read back from `output.txt`.
    pub stdout: String,
    /// Runtime diagnostic: host-captured stderr, or the error file.
    pub stderr: String,
    /// Compiler diagnostic from `compile_error.txt`, empty if none.
    pub compile_diagnostic: String,
    /// Exit code of the sandbox client, 124 for the timeout wrapper.
    pub exit_code: i32,
    /// Measured usage, clamped to the reporting floor.
    pub usage: ResourceUsage,
}

impl ExecutionOutcome {
    /// Outcome for a host-side launch failure. Kept distinct from
    /// RuntimeError: the root cause is infrastructure, not user code.
    pub fn host_error(message: String) -> Self {
        Self {
            status: ExecutionStatus::Error,
            stdout: String::new(),
            stderr: message,
            compile_diagnostic: String::new(),
            exit_code: 1,
            usage: ResourceUsage::default(),
        }
    }
}

/// Execution seam between the orchestrator and the container runtime.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `code` against `input` and classify the result. Total: every
    /// failure mode is reported inside the outcome, never thrown.
    async fn execute(
        &self,
        language: Language,
        code: &str,
        input: &str,
        wait_limit: Duration,
    ) -> ExecutionOutcome;
}

/// Executor backed by per-language Docker runner images.
#[derive(Debug, Default)]
pub struct DockerSandbox;

impl DockerSandbox {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for DockerSandbox {
    async fn execute(
        &self,
        language: Language,
        code: &str,
        input: &str,
        wait_limit: Duration,
    ) -> ExecutionOutcome {
        match try_execute(language, code, input, wait_limit).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("sandbox infrastructure failure: {e}");
                ExecutionOutcome::host_error(e.to_string())
            }
        }
    }
}

async fn try_execute(
    language: Language,
    code: &str,
    input: &str,
    wait_limit: Duration,
) -> Result<ExecutionOutcome> {
    let lang_config = get_language_config(language)
        .ok_or_else(|| JudgeError::LanguageConfig(language.to_string()))?;
    let config = get_config();

    // Removed on every exit path, including early returns below.
    let scratch = tempfile::Builder::new().prefix("seka-box-").tempdir()?;
    tokio::fs::write(scratch.path().join(&lang_config.source_file), code).await?;
    tokio::fs::write(scratch.path().join("input.txt"), input).await?;

    let container = format!("seka-judge-{}", Uuid::new_v4());
    let mut command = Command::new("docker");
    command
        .args(["run", "--rm", "--name", container.as_str()])
        .args(["--network", "none"])
        .arg("--memory")
        .arg(format!("{}m", config.sandbox_memory_mb))
        .arg("--memory-swap")
        .arg(format!("{}m", config.sandbox_memory_mb))
        .arg("--cpus")
        .arg(config.sandbox_cpus.to_string())
        .arg("--user")
        .arg(&config.sandbox_user)
        .arg("-v")
        .arg(format!("{}:/code", scratch.path().display()))
        .arg(&lang_config.image)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    debug!("starting sandbox {container} for {language}");
    let child = command
        .spawn()
        .map_err(|e| JudgeError::SandboxLaunch(e.to_string()))?;
    let client_pid = child.id();

    let (host_timed_out, exit_code, host_stderr) =
        match timeout(wait_limit, child.wait_with_output()).await {
            Ok(Ok(output)) => (
                false,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ),
            Ok(Err(e)) => return Err(JudgeError::SandboxLaunch(e.to_string())),
            Err(_) => {
                warn!(
                    "sandbox {container} exceeded {}s wall clock, killing",
                    wait_limit.as_secs()
                );
                kill_client_group(client_pid);
                let _ = timeout(
                    Duration::from_secs(10),
                    Command::new("docker").args(["kill", container.as_str()]).output(),
                )
                .await;
                (true, TIMEOUT_EXIT_CODE, String::new())
            }
        };

    let stdout = read_artifact(scratch.path(), "output.txt").await;
    let compile_diagnostic = read_artifact(scratch.path(), "compile_error.txt").await;
    let mut file_error = read_artifact(scratch.path(), "error.txt").await;
    if file_error.trim().is_empty() {
        file_error = read_artifact(scratch.path(), "runtime_error.txt").await;
    }
    let metrics_text = read_artifact(scratch.path(), "metrics.txt").await;
    let status_text = read_artifact(scratch.path(), "status.txt").await;
    let status_tag = match status_text.trim() {
        "" => None,
        tag => Some(tag.to_string()),
    };

    // Host-captured stderr takes precedence over the error file as the
    // reported diagnostic.
    let error_output = if !host_stderr.is_empty() {
        host_stderr
    } else {
        file_error.trim().to_string()
    };

    let usage = parse_metrics(&metrics_text).clamped();
    let signals = RunSignals {
        host_timed_out,
        exit_code,
        compile_error: compile_diagnostic.clone(),
        error_output: error_output.clone(),
        status_tag,
    };
    let status = classify(&signals);
    debug!("sandbox {container} finished: {status:?}, exit {exit_code}");

    Ok(ExecutionOutcome {
        status,
        stdout,
        stderr: error_output,
        compile_diagnostic,
        exit_code,
        usage,
    })
}

/// SIGKILL the sandbox client's process group. The dropped child handle is
/// reaped by the runtime afterwards.
fn kill_client_group(pid: Option<u32>) {
    if let Some(raw) = pid {
        if let Err(e) = killpg(Pid::from_raw(raw as i32), Signal::SIGKILL) {
            debug!("killpg on sandbox client {raw} failed: {e}");
        }
    }
}

async fn read_artifact(dir: &Path, name: &str) -> String {
    tokio::fs::read_to_string(dir.join(name))
        .await
        .unwrap_or_default()
}
