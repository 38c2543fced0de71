// tidyguard-core/src/application/verify.rs

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::domain::configuration::TidyConfig;
use crate::domain::diff::DiffRenderer;
use crate::domain::outcome::{NormalizationOutcome, VerificationResult};
use crate::domain::snapshot::{Snapshot, TrackedFilePair};
use crate::domain::target::Target;
use crate::error::TidyError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::snapshot::{self, RestoreGuard};
use crate::ports::{Normalizer, WorktreeStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    pub descriptor: String,
    pub lock: Option<String>,
    /// Render a unified diff for untidy targets.
    pub show_diff: bool,
    /// Refuse to run on a target with uncommitted changes.
    pub require_clean_worktree: bool,
}

impl VerifyOptions {
    pub fn from_config(config: &TidyConfig, show_diff: bool) -> Self {
        Self {
            descriptor: config.descriptor.clone(),
            lock: config.lock.clone(),
            show_diff,
            require_clean_worktree: config.require_clean_worktree,
        }
    }
}

/// Check-and-rollback transaction for one module directory.
///
/// `capture → normalize → capture → compare → restore`, where the restore
/// runs on every exit path once the first capture succeeded.
pub struct TidinessVerifier<'a> {
    normalizer: &'a dyn Normalizer,
    worktree: &'a dyn WorktreeStatus,
    options: VerifyOptions,
}

impl<'a> TidinessVerifier<'a> {
    pub fn new(
        normalizer: &'a dyn Normalizer,
        worktree: &'a dyn WorktreeStatus,
        options: VerifyOptions,
    ) -> Self {
        Self {
            normalizer,
            worktree,
            options,
        }
    }

    #[instrument(skip_all, fields(target = %target))]
    pub async fn verify(
        &self,
        target: &Target,
        deadline: Instant,
    ) -> Result<VerificationResult, TidyError> {
        let dir = target.working_dir();

        // 0. Optional precondition
        if self.options.require_clean_worktree {
            debug!("checking if working tree is modified");
            let entries = self.worktree.dirty_entries(&dir, deadline).await?;
            if !entries.is_empty() {
                return Err(TidyError::DirtyWorkingTree { dir, entries });
            }
        }

        // 1. Idle -> Captured (nothing mutated yet, no rollback needed)
        let pair = TrackedFilePair::resolve(
            target.base(),
            &self.options.descriptor,
            self.options.lock.as_deref(),
        );
        let before = snapshot::capture(&pair)?;
        let guard = RestoreGuard::arm(&before);

        // 2-3. Captured -> Normalized -> Compared
        let probed = self.probe(target, &pair, deadline).await;

        // 4. -> RestoredOrFailed, whatever happened above
        debug!("restoring tracked files");
        let restored = guard.restore();

        let after = settle(&before, probed, restored)?;

        // 5. Done
        let needs_normalization = before != after;
        if !needs_normalization {
            debug!("tracked files unchanged");
            return Ok(VerificationResult::tidy(target.to_string()));
        }

        info!("module isn't tidy");
        let diff = if self.options.show_diff {
            render_diffs(&before, &after)
        } else {
            None
        };

        Ok(VerificationResult {
            target: target.to_string(),
            needs_normalization,
            diff,
        })
    }

    async fn probe(
        &self,
        target: &Target,
        pair: &TrackedFilePair,
        deadline: Instant,
    ) -> Result<Snapshot, TidyError> {
        debug!(command = %self.normalizer.describe(), "running normalizer");
        match self.normalizer.run(&target.working_dir(), deadline).await {
            NormalizationOutcome::Success => {}
            NormalizationOutcome::ToolFailure { exit_code, output } => {
                return Err(TidyError::ToolFailure {
                    command: self.normalizer.describe(),
                    exit_code,
                    output,
                });
            }
            NormalizationOutcome::InvocationFailure { cause } => {
                return Err(TidyError::InvocationFailure {
                    command: self.normalizer.describe(),
                    cause,
                });
            }
        }

        debug!("checking if tracked files have been modified");
        Ok(snapshot::capture_current(pair)?)
    }
}

/// Folds the probe and the rollback into one result. A failed restore
/// carries the verdict when the probe reached one, or the probe's error.
fn settle(
    before: &Snapshot,
    probed: Result<Snapshot, TidyError>,
    restored: Result<(), InfrastructureError>,
) -> Result<Snapshot, TidyError> {
    match (probed, restored) {
        (Ok(after), Ok(())) => Ok(after),
        (Err(e), Ok(())) => Err(e),
        (probed, Err(source)) => {
            let (needs_normalization, prior) = match probed {
                Ok(after) => (Some(*before != after), None),
                Err(e) => (None, Some(Box::new(e))),
            };
            Err(TidyError::RestoreFailed {
                source,
                needs_normalization,
                prior,
            })
        }
    }
}

/// One diff per changed file, descriptor first. A render failure drops the
/// whole diff; the verdict stands regardless.
fn render_diffs(before: &Snapshot, after: &Snapshot) -> Option<String> {
    let mut rendered = String::new();
    for (old, new) in before.changed_against(after) {
        let label = old.path.display().to_string();
        match DiffRenderer::render(&label, old.state.bytes(), new.state.bytes()) {
            Ok(diff) => rendered.push_str(&diff),
            Err(e) => {
                warn!(error = %e, "omitting diff");
                return None;
            }
        }
    }
    Some(rendered).filter(|diff| !diff.is_empty())
}
