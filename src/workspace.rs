//! Session-scoped scratch workspaces.
//!
//! Every judging request owns exactly one workspace for its lifetime. The
//! handle removes the directory when released; dropping it unreleased
//! removes it as well, so no exit path can leak a directory.

use std::path::Path;

use tempfile::TempDir;
use uuid::Uuid;

use crate::error::Result;

/// Scratch workspace for one judging session.
#[derive(Debug)]
pub struct SessionWorkspace {
    session_id: String,
    dir: TempDir,
}

impl SessionWorkspace {
    /// Allocate a fresh session identifier and scratch directory.
    pub fn create() -> Result<Self> {
        let session_id = Uuid::new_v4().to_string();
        let dir = tempfile::Builder::new().prefix("seka-judge-").tempdir()?;
        Ok(Self { session_id, dir })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Destroy the workspace. The terminal action for the session; called
    /// exactly once, with `Drop` as the backstop for paths that unwind.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}
