//! System-level errors of the judge worker.
//!
//! Only infrastructure faults live here. Failures of the judged program
//! (compile errors, crashes, exceeded limits, wrong output) are verdicts,
//! not errors, and never travel through this type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, JudgeError>;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("workspace I/O failure: {0}")]
    Workspace(#[from] std::io::Error),
    #[error("failed to launch sandbox: {0}")]
    SandboxLaunch(String),
    #[error("sandbox reported an infrastructure failure: {0}")]
    Sandbox(String),
    #[error("failed to invoke compiler: {0}")]
    CompilerSpawn(String),
    #[error("language `{0}` has no configuration entry")]
    LanguageConfig(String),
    #[error("judge worker is saturated")]
    Saturated,
}
