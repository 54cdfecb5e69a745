//! Seka Judge - sandboxed judging of untrusted code submissions.
//!
//! A submission (source code, language, ordered test cases) is compiled,
//! executed case by case inside network-isolated resource-capped sandboxes,
//! and reduced to a single verdict with timing and memory metrics.

pub mod comparator;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod languages;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod pool;
pub mod sandbox;
pub mod verdict;
pub mod workspace;

pub use config::JudgeConfig;
pub use error::{JudgeError, Result};
pub use models::{JudgeResult, Language, Submission, TestCase, TestCaseResult};
pub use orchestrator::JudgeOrchestrator;
pub use pool::JudgePool;
pub use verdict::Verdict;
