// tidyguard-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::domain::configuration::TidyConfig;
use crate::infrastructure::error::InfrastructureError;

const CANDIDATES: [&str; 2] = ["tidyguard.yaml", ".tidyguard.yaml"];

/// One week. Keeps `now + timeout` representable on every platform.
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Loads the configuration.
///
/// An explicit path must exist. Otherwise the candidates are looked up in
/// `root`, falling back to defaults when none is present. Environment
/// overrides are applied last.
#[instrument(skip(root))]
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<TidyConfig, InfrastructureError> {
    // 1. Discovery
    let path = match explicit {
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        Some(path) => {
            return Err(InfrastructureError::ConfigNotFound(
                path.display().to_string(),
            ));
        }
        None => find_config(root),
    };

    // 2. YAML (or defaults)
    let mut config = match path {
        Some(path) => {
            info!(path = ?path, "Loading configuration");
            let content = fs::read_to_string(&path).map_err(|source| {
                InfrastructureError::Read {
                    path: path.clone(),
                    source,
                }
            })?;
            serde_yaml::from_str(&content)?
        }
        None => {
            debug!("no configuration file, using defaults");
            TidyConfig::default()
        }
    };

    // 3. Layering: TIDYGUARD_TIMEOUT_SECS=60 tidyguard ./...
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate(&config)?;
    Ok(config)
}

fn find_config(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|candidate| candidate.is_file())
}

/// Applies `TIDYGUARD_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut TidyConfig, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("TIDYGUARD_TIMEOUT_SECS") {
        let secs = val.trim().parse::<u64>().map_err(|e| {
            InfrastructureError::ConfigError(format!("TIDYGUARD_TIMEOUT_SECS={val:?}: {e}"))
        })?;
        info!(old = config.timeout_secs, new = secs, "Overriding timeout via ENV");
        config.timeout_secs = secs;
    }
    if let Some(val) = lookup("TIDYGUARD_REQUIRE_CLEAN") {
        let on = matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        info!(new = on, "Overriding require-clean-worktree via ENV");
        config.require_clean_worktree = on;
    }
    if let Some(val) = lookup("TIDYGUARD_NORMALIZER") {
        info!(old = ?config.normalizer.program, new = ?val, "Overriding normalizer via ENV");
        config.normalizer.program = val;
    }
    Ok(())
}

fn validate(config: &TidyConfig) -> Result<(), InfrastructureError> {
    if config.normalizer.program.trim().is_empty() {
        return Err(InfrastructureError::ConfigError(
            "normalizer.program must not be empty".to_string(),
        ));
    }
    if config.descriptor.trim().is_empty() {
        return Err(InfrastructureError::ConfigError(
            "descriptor must not be empty".to_string(),
        ));
    }
    if config.lock.as_deref() == Some(config.descriptor.as_str()) {
        return Err(InfrastructureError::ConfigError(
            "lock and descriptor must be different files".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(InfrastructureError::ConfigError(
            "timeout-secs must be positive".to_string(),
        ));
    }
    if config.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(InfrastructureError::ConfigError(format!(
            "timeout-secs must be at most {MAX_TIMEOUT_SECS}, got {}",
            config.timeout_secs
        )));
    }
    Ok(())
}
