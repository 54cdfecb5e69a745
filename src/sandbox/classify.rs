//! Outcome classification for a finished sandbox run.
//!
//! The sandbox reports its outcome through several weakly-correlated
//! signals: the wrapper exit code, an optional `status.txt` tag, and the
//! presence of error files. The precedence between them is kept as one
//! ordered table here so it can be audited and tested without a container
//! runtime.

/// Classified status of one sandbox execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Program ran to completion; output still has to be compared.
    Success,
    /// The build step inside the sandbox failed.
    CompileError,
    /// The program crashed, wrote to stderr, or exited non-zero.
    RuntimeError,
    /// The wrapper or the host-side wait hit the time limit.
    Timeout,
    /// Infrastructure failure on the host side; not a user verdict.
    Error,
}

/// Exit code the timeout wrapper inside the runner images reports.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Signals collected after the sandbox exited or was killed.
#[derive(Debug, Clone, Default)]
pub struct RunSignals {
    /// The host-side wait itself expired and the sandbox was killed.
    pub host_timed_out: bool,
    /// Exit code of the sandbox client process.
    pub exit_code: i32,
    /// Content of `compile_error.txt`, empty if absent.
    pub compile_error: String,
    /// First non-empty of host-captured stderr and the error files.
    pub error_output: String,
    /// Content of `status.txt`, if present.
    pub status_tag: Option<String>,
}

/// Apply the ordered classification table.
///
/// A non-empty `error_output` is authoritative over an optimistic status
/// tag: a sandbox that says SUCCESS but leaves a stack trace behind is
/// classified as a runtime error.
pub fn classify(signals: &RunSignals) -> ExecutionStatus {
    if signals.host_timed_out || signals.exit_code == TIMEOUT_EXIT_CODE {
        return ExecutionStatus::Timeout;
    }

    let tag = signals.status_tag.as_deref().map(str::trim);

    if !signals.compile_error.trim().is_empty()
        && (tag == Some("COMPILE_ERROR") || signals.exit_code != 0)
    {
        return ExecutionStatus::CompileError;
    }

    if !signals.error_output.trim().is_empty() || signals.exit_code != 0 {
        return ExecutionStatus::RuntimeError;
    }

    match tag {
        Some("TIMEOUT") => ExecutionStatus::Timeout,
        Some("COMPILE_ERROR") => ExecutionStatus::CompileError,
        Some("RUNTIME_ERROR") => ExecutionStatus::RuntimeError,
        _ => ExecutionStatus::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> RunSignals {
        RunSignals::default()
    }

    #[test]
    fn test_clean_exit_is_success() {
        assert_eq!(classify(&clean()), ExecutionStatus::Success);
    }

    #[test]
    fn test_host_timeout_wins_over_everything() {
        let signals = RunSignals {
            host_timed_out: true,
            compile_error: "syntax error".into(),
            error_output: "trace".into(),
            status_tag: Some("SUCCESS".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::Timeout);
    }

    #[test]
    fn test_wrapper_exit_124_is_timeout() {
        let signals = RunSignals {
            exit_code: TIMEOUT_EXIT_CODE,
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::Timeout);
    }

    #[test]
    fn test_compile_error_needs_corroboration() {
        // File present, nothing backing it up: not a compile error.
        let signals = RunSignals {
            compile_error: "warning treated as note".into(),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::Success);

        // Backed by the status tag.
        let signals = RunSignals {
            compile_error: "main.c:3: error".into(),
            status_tag: Some("COMPILE_ERROR".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::CompileError);

        // Backed by a non-zero exit code.
        let signals = RunSignals {
            compile_error: "main.c:3: error".into(),
            exit_code: 1,
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::CompileError);
    }

    #[test]
    fn test_compile_error_outranks_runtime_signals() {
        let signals = RunSignals {
            compile_error: "main.cpp:1: error".into(),
            error_output: "also some stderr".into(),
            exit_code: 2,
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::CompileError);
    }

    #[test]
    fn test_stderr_overrides_optimistic_status_tag() {
        let signals = RunSignals {
            error_output: "Traceback (most recent call last):".into(),
            status_tag: Some("SUCCESS".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::RuntimeError);
    }

    #[test]
    fn test_unexplained_nonzero_exit_is_runtime_error() {
        let signals = RunSignals {
            exit_code: 139,
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::RuntimeError);
    }

    #[test]
    fn test_explicit_status_tag_applies_when_not_overridden() {
        let signals = RunSignals {
            status_tag: Some("TIMEOUT".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::Timeout);

        let signals = RunSignals {
            status_tag: Some("RUNTIME_ERROR".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::RuntimeError);

        let signals = RunSignals {
            status_tag: Some("COMPILE_ERROR".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::CompileError);
    }

    #[test]
    fn test_unknown_status_tag_falls_through_to_success() {
        let signals = RunSignals {
            status_tag: Some("SUCCESS".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::Success);

        let signals = RunSignals {
            status_tag: Some("GARBAGE".into()),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::Success);
    }

    #[test]
    fn test_whitespace_only_files_do_not_count() {
        let signals = RunSignals {
            compile_error: "  \n".into(),
            error_output: "\n\n".into(),
            ..clean()
        };
        assert_eq!(classify(&signals), ExecutionStatus::Success);
    }
}
