// tidyguard-core/src/ports/worktree.rs

use std::path::Path;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::infrastructure::error::InfrastructureError;

/// Version-control probe for the optional clean-tree precondition.
#[async_trait]
pub trait WorktreeStatus: Send + Sync {
    /// Uncommitted entries under `dir`, empty when clean.
    async fn dirty_entries(
        &self,
        dir: &Path,
        deadline: Instant,
    ) -> Result<Vec<String>, InfrastructureError>;
}
