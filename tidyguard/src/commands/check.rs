// tidyguard/src/commands/check.rs
//
// USE CASE: Check that every module is tidy, leaving the tree untouched.

use std::time::Duration;

use anyhow::Context;
use tokio::time::Instant;
use tracing::debug;

use tidyguard_core::application::{TidinessVerifier, VerifyOptions, run_targets};
use tidyguard_core::infrastructure::config::load_config;
use tidyguard_core::infrastructure::{CommandNormalizer, GitWorktree};

use crate::cli::Cli;
use crate::sandbox;

/// Returns whether any module needs normalization.
pub async fn execute(cli: Cli) -> anyhow::Result<bool> {
    // A. Load the Config (Infra)
    let cwd = std::env::current_dir().context("resolving current directory")?;
    let mut config = load_config(cli.config.as_deref(), &cwd).with_context(|| match &cli.config {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => format!("loading configuration in {}", cwd.display()),
    })?;
    if cli.require_clean {
        config.require_clean_worktree = true;
    }
    debug!(?config, "configuration");

    // B. Resolve module paths
    let paths = if sandbox::running_as_action() {
        sandbox::paths_inside_container(cli.paths).context("getting paths inside container")?
    } else {
        cli.paths
    };

    // C. Wire the adapters and run (Application Layer)
    let deadline = Instant::now()
        .checked_add(Duration::from_secs(config.timeout_secs))
        .with_context(|| format!("timeout of {}s is out of range", config.timeout_secs))?;
    let normalizer = CommandNormalizer::new(config.normalizer.clone());
    let worktree = GitWorktree;
    let verifier = TidinessVerifier::new(
        &normalizer,
        &worktree,
        VerifyOptions::from_config(&config, cli.diff),
    );

    let summary = run_targets(&verifier, paths.as_slice(), deadline).await?;
    Ok(summary.untidy)
}
