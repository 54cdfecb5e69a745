//! End-to-end judging of one submission.
//!
//! Per submission the orchestrator walks INIT (session id + workspace),
//! COMPILING (compiled languages only), EXECUTING (each case in request
//! order), AGGREGATING, DONE. Any infrastructure error falls into the
//! absorbing FAILED state: partial results are discarded and a system-level
//! result is returned. The session workspace is destroyed on every path
//! out, exactly once.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::compiler::{CompileArtifact, Compiler};
use crate::engine::{aggregate, evaluate_case};
use crate::error::{JudgeError, Result};
use crate::models::{JudgeResult, Submission};
use crate::sandbox::{DockerSandbox, ExecutionStatus, Executor};
use crate::workspace::SessionWorkspace;

/// Wall-clock buffer on top of the per-case limit, so the sandbox's own
/// wrapper can self-report a timeout instead of being ambiguously
/// hard-killed by the host.
const SANDBOX_TIMEOUT_BUFFER_SECS: u64 = 5;

/// Drives one submission through compile, execution, and aggregation.
pub struct JudgeOrchestrator<E = DockerSandbox> {
    executor: E,
}

impl JudgeOrchestrator<DockerSandbox> {
    pub fn new() -> Self {
        Self {
            executor: DockerSandbox::new(),
        }
    }
}

impl Default for JudgeOrchestrator<DockerSandbox> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Executor> JudgeOrchestrator<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Judge one submission end to end. Total: infrastructure failures come
    /// back as a system-level result, never as an error or a panic.
    pub async fn judge(&self, submission: &Submission) -> JudgeResult {
        let total_cases = submission.test_cases.len();

        let workspace = match SessionWorkspace::create() {
            Ok(workspace) => workspace,
            Err(e) => {
                error!("failed to allocate session workspace: {e}");
                return JudgeResult::system_failure(total_cases, format!("Critical error: {e}"));
            }
        };
        let session_id = workspace.session_id().to_owned();
        info!(
            "session {session_id}: judging {} submission, {total_cases} cases",
            submission.language
        );

        let outcome = self.run_session(submission, &workspace).await;

        if let Err(e) = workspace.close() {
            warn!("session {session_id}: failed to remove workspace: {e}");
        }

        match outcome {
            Ok(result) => {
                info!(
                    "session {session_id}: verdict {}, {}/{} passed",
                    result.verdict, result.passed_cases, result.total_cases
                );
                result
            }
            Err(e) => {
                error!("session {session_id}: {e}");
                JudgeResult::system_failure(total_cases, format!("Critical error: {e}"))
            }
        }
    }

    async fn run_session(
        &self,
        submission: &Submission,
        workspace: &SessionWorkspace,
    ) -> Result<JudgeResult> {
        let total_cases = submission.test_cases.len();

        if submission.language.is_compiled() {
            let compiler = Compiler::for_language(submission.language);
            match compiler.compile(&submission.code, workspace).await? {
                CompileArtifact::Failed { diagnostic } => {
                    info!(
                        "session {}: rejected at the compile gate",
                        workspace.session_id()
                    );
                    return Ok(JudgeResult::compile_failure(total_cases, diagnostic));
                }
                CompileArtifact::Compiled { invocation } => {
                    debug!(
                        "session {}: artifact runs as {:?}",
                        workspace.session_id(),
                        invocation.build_command()
                    );
                }
            }
        }

        let mut test_results = Vec::with_capacity(total_cases);

        for (idx, test_case) in submission.test_cases.iter().enumerate() {
            let case_number = idx + 1;
            let limits = submission.limits_for(test_case);
            let wait_limit = sandbox_wait_limit(limits.time_limit_ms);

            let outcome = self
                .executor
                .execute(
                    submission.language,
                    &submission.code,
                    &test_case.input,
                    wait_limit,
                )
                .await;

            // Infrastructure failures abort the loop; user-code failures
            // become per-case verdicts and the loop continues.
            if outcome.status == ExecutionStatus::Error {
                return Err(JudgeError::Sandbox(outcome.stderr));
            }

            let result = evaluate_case(case_number, test_case, &outcome, &limits);
            debug!(
                "session {}: case {case_number}/{total_cases} -> {}",
                workspace.session_id(),
                result.verdict
            );
            test_results.push(result);
        }

        Ok(aggregate(test_results, total_cases))
    }
}

/// Host-side wait limit for one case: the time limit rounded up to whole
/// seconds plus a fixed buffer.
fn sandbox_wait_limit(time_limit_ms: f64) -> Duration {
    let seconds = (time_limit_ms / 1000.0).ceil() as u64 + SANDBOX_TIMEOUT_BUFFER_SECS;
    Duration::from_secs(seconds)
}
