// tidyguard-core/src/infrastructure/git.rs

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::infrastructure::error::InfrastructureError;
use crate::ports::worktree::WorktreeStatus;

/// `git status --porcelain` scoped to the module directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitWorktree;

#[async_trait]
impl WorktreeStatus for GitWorktree {
    #[instrument(skip(self))]
    async fn dirty_entries(
        &self,
        dir: &Path,
        deadline: Instant,
    ) -> Result<Vec<String>, InfrastructureError> {
        let vcs_err = |message: String| InfrastructureError::Vcs {
            dir: dir.to_path_buf(),
            message,
        };

        let output = Command::new("git")
            .args(["status", "--porcelain", "--untracked-files=all", "--", "."])
            .current_dir(dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout_at(deadline, output)
            .await
            .map_err(|_| vcs_err("deadline exceeded".to_string()))?
            .map_err(|e| vcs_err(e.to_string()))?;

        if !output.status.success() {
            return Err(vcs_err(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let entries: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        debug!(count = entries.len(), "worktree status");
        Ok(entries)
    }
}
