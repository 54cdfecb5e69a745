//! Request and response shapes of the judge worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::verdict::Verdict;

/// Default per-case time limit when the request carries none (5 seconds).
pub const DEFAULT_TIME_LIMIT_MS: f64 = 5000.0;
/// Default per-case memory limit when the request carries none (256 MB).
pub const DEFAULT_MEMORY_LIMIT_KB: f64 = 256_000.0;

/// Maximum length of input/expected/actual excerpts in results.
const PREVIEW_LEN: usize = 100;

/// Supported submission languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    #[serde(alias = "c++")]
    Cpp,
    Java,
    Python,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
        }
    }

    /// Whether the language has a host-side build step before execution.
    pub fn is_compiled(&self) -> bool {
        matches!(self, Language::C | Language::Cpp | Language::Java)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test case of a submission. Order is significant; case numbering
/// follows input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit_kb: Option<f64>,
}

/// A judging request. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub code: String,
    pub language: Language,
    pub test_cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit_kb: Option<f64>,
}

/// Effective limits for one test case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseLimits {
    pub time_limit_ms: f64,
    pub memory_limit_kb: f64,
}

impl Submission {
    /// Resolve the limits for one case: per-case overrides fall back to the
    /// submission-level limits, then to the engine defaults.
    pub fn limits_for(&self, case: &TestCase) -> CaseLimits {
        CaseLimits {
            time_limit_ms: case
                .time_limit_ms
                .or(self.time_limit_ms)
                .unwrap_or(DEFAULT_TIME_LIMIT_MS),
            memory_limit_kb: case
                .memory_limit_kb
                .or(self.memory_limit_kb)
                .unwrap_or(DEFAULT_MEMORY_LIMIT_KB),
        }
    }
}

/// Result of judging one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// 1-based case number, following request order.
    pub case_number: usize,
    pub verdict: Verdict,
    /// Measured time in ms, 0 when unmeasured.
    pub time_ms: f64,
    /// Measured memory in KB, 0 when unmeasured.
    pub memory_kb: f64,
    pub input_data: String,
    pub expected_output: String,
    pub actual_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Result of judging a whole submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeResult {
    pub verdict: Verdict,
    /// 0-100, two decimals.
    pub score: f64,
    pub total_cases: usize,
    pub passed_cases: usize,
    pub total_time_ms: f64,
    pub max_time_ms: f64,
    pub avg_time_ms: f64,
    pub max_memory_kb: f64,
    pub test_results: Vec<TestCaseResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub judged_at: DateTime<Utc>,
}

impl JudgeResult {
    /// Submission rejected at the compile gate: no test case was executed,
    /// the compiler diagnostic travels in `error_message`.
    pub fn compile_failure(total_cases: usize, diagnostic: String) -> Self {
        Self {
            verdict: Verdict::CompilationError,
            score: 0.0,
            total_cases,
            passed_cases: 0,
            total_time_ms: 0.0,
            max_time_ms: 0.0,
            avg_time_ms: 0.0,
            max_memory_kb: 0.0,
            test_results: vec![],
            error_message: Some(diagnostic),
            judged_at: Utc::now(),
        }
    }

    /// System-level failure result: partial results are discarded, the
    /// cause travels in `error_message` and is never mistaken for a user
    /// verdict on any case.
    pub fn system_failure(total_cases: usize, message: String) -> Self {
        Self {
            verdict: Verdict::RuntimeError,
            score: 0.0,
            total_cases,
            passed_cases: 0,
            total_time_ms: 0.0,
            max_time_ms: 0.0,
            avg_time_ms: 0.0,
            max_memory_kb: 0.0,
            test_results: vec![],
            error_message: Some(message),
            judged_at: Utc::now(),
        }
    }
}

/// Round a reported number to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bounded-length excerpt of a payload for reporting.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LEN {
        let truncated: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tags() {
        let language: Language = serde_json::from_str("\"cpp\"").unwrap();
        assert_eq!(language, Language::Cpp);
        let language: Language = serde_json::from_str("\"c++\"").unwrap();
        assert_eq!(language, Language::Cpp);
        assert!(serde_json::from_str::<Language>("\"brainfuck\"").is_err());
    }

    #[test]
    fn test_compiled_languages() {
        assert!(Language::C.is_compiled());
        assert!(Language::Cpp.is_compiled());
        assert!(Language::Java.is_compiled());
        assert!(!Language::Python.is_compiled());
    }

    #[test]
    fn test_request_shape() {
        let request = r#"{
            "code": "print(42)",
            "language": "python",
            "test_cases": [{"input": "", "expected_output": "42", "time_limit_ms": 2000}],
            "memory_limit_kb": 131072
        }"#;
        let submission: Submission = serde_json::from_str(request).unwrap();
        assert_eq!(submission.language, Language::Python);
        assert_eq!(submission.test_cases.len(), 1);

        let limits = submission.limits_for(&submission.test_cases[0]);
        assert_eq!(limits.time_limit_ms, 2000.0);
        assert_eq!(limits.memory_limit_kb, 131_072.0);
    }

    #[test]
    fn test_limit_fallback_to_defaults() {
        let submission = Submission {
            code: String::new(),
            language: Language::C,
            test_cases: vec![TestCase {
                input: String::new(),
                expected_output: String::new(),
                time_limit_ms: None,
                memory_limit_kb: None,
            }],
            time_limit_ms: None,
            memory_limit_kb: None,
        };
        let limits = submission.limits_for(&submission.test_cases[0]);
        assert_eq!(limits.time_limit_ms, DEFAULT_TIME_LIMIT_MS);
        assert_eq!(limits.memory_limit_kb, DEFAULT_MEMORY_LIMIT_KB);
    }

    #[test]
    fn test_preview_truncates_long_payloads() {
        let short = "abc";
        assert_eq!(preview(short), "abc");

        let long = "x".repeat(150);
        let excerpt = preview(&long);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 103);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.66666), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_result_serialization_omits_empty_error() {
        let result = JudgeResult {
            verdict: Verdict::Accepted,
            score: 100.0,
            total_cases: 1,
            passed_cases: 1,
            total_time_ms: 1.0,
            max_time_ms: 1.0,
            avg_time_ms: 1.0,
            max_memory_kb: 640.0,
            test_results: vec![],
            error_message: None,
            judged_at: Utc::now(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error_message").is_none());
        assert_eq!(json["verdict"], "accepted");
        assert!(json["judged_at"].is_string());
    }

    #[test]
    fn test_system_failure_shape() {
        let result = JudgeResult::system_failure(3, "Critical error: boom".into());
        assert_eq!(result.verdict, Verdict::RuntimeError);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.total_cases, 3);
        assert_eq!(result.passed_cases, 0);
        assert!(result.test_results.is_empty());
        assert_eq!(result.error_message.as_deref(), Some("Critical error: boom"));
    }
}
