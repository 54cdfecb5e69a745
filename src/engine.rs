//! Verdict computation: one execution outcome to one per-case verdict, and
//! all per-case verdicts to one submission result.

use chrono::Utc;

use crate::comparator::outputs_match;
use crate::models::{preview, round2, CaseLimits, JudgeResult, TestCase, TestCaseResult};
use crate::sandbox::{ExecutionOutcome, ExecutionStatus};
use crate::verdict::Verdict;

/// Evaluate one test case. First matching rung of the ladder wins:
/// compile error, runtime error, timeout (explicit or measured), memory
/// limit, then output comparison.
///
/// Infrastructure failures (`ExecutionStatus::Error`) are intercepted by
/// the orchestrator before evaluation; they are not a user verdict.
pub fn evaluate_case(
    case_number: usize,
    test_case: &TestCase,
    outcome: &ExecutionOutcome,
    limits: &CaseLimits,
) -> TestCaseResult {
    let time_ms = outcome.usage.time_ms.map(round2).unwrap_or(0.0);
    let memory_kb = outcome.usage.memory_kb.map(round2).unwrap_or(0.0);
    let input_data = preview(&test_case.input);

    if outcome.status == ExecutionStatus::CompileError {
        return TestCaseResult {
            case_number,
            verdict: Verdict::CompilationError,
            time_ms: 0.0,
            memory_kb: 0.0,
            input_data,
            expected_output: preview(&test_case.expected_output),
            actual_output: String::new(),
            error_message: Some(format!(
                "Compilation Error: {}",
                outcome.compile_diagnostic.trim()
            )),
        };
    }

    if outcome.status == ExecutionStatus::RuntimeError {
        return TestCaseResult {
            case_number,
            verdict: Verdict::RuntimeError,
            time_ms,
            memory_kb,
            input_data,
            expected_output: preview(&test_case.expected_output),
            actual_output: preview(outcome.stdout.trim()),
            error_message: Some(format!("Runtime Error (exit code: {})", outcome.exit_code)),
        };
    }

    if outcome.status == ExecutionStatus::Timeout {
        return TestCaseResult {
            case_number,
            verdict: Verdict::TimeLimitExceeded,
            // The run was cut off, so the limit itself is the best lower
            // bound on the time spent.
            time_ms: limits.time_limit_ms,
            memory_kb,
            input_data,
            expected_output: preview(&test_case.expected_output),
            actual_output: preview(outcome.stdout.trim()),
            error_message: Some(format!(
                "Time Limit Exceeded (>{}ms)",
                limits.time_limit_ms
            )),
        };
    }

    if let Some(measured) = outcome.usage.time_ms {
        if measured > limits.time_limit_ms {
            return TestCaseResult {
                case_number,
                verdict: Verdict::TimeLimitExceeded,
                time_ms,
                memory_kb,
                input_data,
                expected_output: preview(&test_case.expected_output),
                actual_output: preview(outcome.stdout.trim()),
                error_message: Some(format!(
                    "Time Limit Exceeded ({time_ms}ms > {}ms)",
                    limits.time_limit_ms
                )),
            };
        }
    }

    if let Some(measured) = outcome.usage.memory_kb {
        if measured > limits.memory_limit_kb {
            return TestCaseResult {
                case_number,
                verdict: Verdict::MemoryLimitExceeded,
                time_ms,
                memory_kb,
                input_data,
                expected_output: preview(&test_case.expected_output),
                actual_output: preview(outcome.stdout.trim()),
                error_message: Some(format!(
                    "Memory Limit Exceeded ({memory_kb}KB > {}KB)",
                    limits.memory_limit_kb
                )),
            };
        }
    }

    let expected = test_case.expected_output.trim();
    let actual = outcome.stdout.trim();

    if outputs_match(expected, actual) {
        TestCaseResult {
            case_number,
            verdict: Verdict::Accepted,
            time_ms,
            memory_kb,
            input_data,
            expected_output: preview(expected),
            actual_output: preview(actual),
            error_message: None,
        }
    } else {
        TestCaseResult {
            case_number,
            verdict: Verdict::WrongAnswer,
            time_ms,
            memory_kb,
            input_data,
            expected_output: preview(expected),
            actual_output: preview(actual),
            error_message: Some("Wrong Answer: Output does not match expected output".to_string()),
        }
    }
}

/// Aggregate per-case results into the submission result.
///
/// The overall verdict is the highest-priority verdict present. Aggregate
/// metrics are computed only over cases with a measured, positive value;
/// a case that never ran contributes nothing to them.
pub fn aggregate(test_results: Vec<TestCaseResult>, total_cases: usize) -> JudgeResult {
    let verdict = Verdict::reduce(test_results.iter().map(|r| r.verdict));
    let passed_cases = test_results
        .iter()
        .filter(|r| r.verdict == Verdict::Accepted)
        .count();

    let score = if total_cases > 0 {
        round2(passed_cases as f64 / total_cases as f64 * 100.0)
    } else {
        0.0
    };

    let times: Vec<f64> = test_results
        .iter()
        .map(|r| r.time_ms)
        .filter(|t| *t > 0.0)
        .collect();
    let memories: Vec<f64> = test_results
        .iter()
        .map(|r| r.memory_kb)
        .filter(|m| *m > 0.0)
        .collect();

    let total_time_ms: f64 = times.iter().sum();
    let max_time_ms = times.iter().cloned().fold(0.0, f64::max);
    let avg_time_ms = if times.is_empty() {
        0.0
    } else {
        total_time_ms / times.len() as f64
    };
    let max_memory_kb = memories.iter().cloned().fold(0.0, f64::max);

    JudgeResult {
        verdict,
        score,
        total_cases,
        passed_cases,
        total_time_ms: round2(total_time_ms),
        max_time_ms: round2(max_time_ms),
        avg_time_ms: round2(avg_time_ms),
        max_memory_kb: round2(max_memory_kb),
        test_results,
        error_message: None,
        judged_at: Utc::now(),
    }
}
