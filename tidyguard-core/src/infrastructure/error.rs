// tidyguard-core/src/infrastructure/error.rs

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(tidyguard::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}", .path.display())]
    #[diagnostic(code(tidyguard::infra::read))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}", .path.display())]
    #[diagnostic(
        code(tidyguard::infra::write),
        help("Check file permissions or path validity.")
    )]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove {}", .path.display())]
    #[diagnostic(code(tidyguard::infra::remove))]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    // --- VCS ---
    #[error("git status failed in {}: {message}", .dir.display())]
    #[diagnostic(
        code(tidyguard::infra::vcs),
        help("--require-clean needs `git` on PATH and a module inside a repository.")
    )]
    Vcs { dir: PathBuf, message: String },

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(tidyguard::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(tidyguard::infra::config))]
    ConfigError(String),

    #[error("Configuration not found at '{0}'")]
    #[diagnostic(code(tidyguard::infra::config_missing))]
    ConfigNotFound(String),
}
