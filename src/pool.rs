//! Bounded admission control for concurrent submissions.
//!
//! Each submission owns its own workspace and sandbox, so the only shared
//! resource is the host itself. The pool caps how many sandboxes run at
//! once; excess submissions queue (`judge`) or are rejected (`try_judge`)
//! rather than degrading isolation.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::{JudgeError, Result};
use crate::models::{JudgeResult, Submission};
use crate::orchestrator::JudgeOrchestrator;
use crate::sandbox::Executor;

/// Worker-slot pool shared by all in-flight submissions.
#[derive(Debug, Clone)]
pub struct JudgePool {
    permits: Arc<Semaphore>,
}

impl JudgePool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Judge a submission, waiting for a free worker slot.
    pub async fn judge<E: Executor>(
        &self,
        orchestrator: &JudgeOrchestrator<E>,
        submission: &Submission,
    ) -> Result<JudgeResult> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| JudgeError::Saturated)?;
        Ok(orchestrator.judge(submission).await)
    }

    /// Judge a submission only if a worker slot is free right now.
    pub async fn try_judge<E: Executor>(
        &self,
        orchestrator: &JudgeOrchestrator<E>,
        submission: &Submission,
    ) -> Result<JudgeResult> {
        let _permit = self
            .permits
            .try_acquire()
            .map_err(|_| JudgeError::Saturated)?;
        Ok(orchestrator.judge(submission).await)
    }

    /// Free worker slots.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
