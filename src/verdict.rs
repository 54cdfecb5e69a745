use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict for a judged test case or submission.
///
/// `Pending` and `Judging` are pre-execution placeholders used by callers
/// tracking submission state; the engine itself never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pending,
    Judging,
    CompilationError,
    RuntimeError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    WrongAnswer,
    Accepted,
}

impl Verdict {
    /// Priority for submission-level aggregation. Lower value wins.
    ///
    /// The placeholders sort after Accepted so a stray one can never
    /// displace a real verdict.
    pub fn priority(&self) -> u8 {
        match self {
            Verdict::CompilationError => 0,
            Verdict::RuntimeError => 1,
            Verdict::TimeLimitExceeded => 2,
            Verdict::MemoryLimitExceeded => 3,
            Verdict::WrongAnswer => 4,
            Verdict::Accepted => 5,
            Verdict::Pending | Verdict::Judging => 6,
        }
    }

    /// Reduce a sequence of per-case verdicts to the submission verdict.
    ///
    /// The highest-priority verdict present wins; an empty sequence is
    /// Accepted (a submission with zero cases has nothing to fail).
    pub fn reduce<I>(verdicts: I) -> Verdict
    where
        I: IntoIterator<Item = Verdict>,
    {
        verdicts
            .into_iter()
            .min_by_key(Verdict::priority)
            .unwrap_or(Verdict::Accepted)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Pending => "pending",
            Verdict::Judging => "judging",
            Verdict::CompilationError => "compilation_error",
            Verdict::RuntimeError => "runtime_error",
            Verdict::TimeLimitExceeded => "time_limit_exceeded",
            Verdict::MemoryLimitExceeded => "memory_limit_exceeded",
            Verdict::WrongAnswer => "wrong_answer",
            Verdict::Accepted => "accepted",
        };
        write!(f, "{}", s)
    }
}
