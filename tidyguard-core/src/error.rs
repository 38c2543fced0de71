// tidyguard-core/src/error.rs

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::outcome::InvocationCause;
use crate::infrastructure::error::InfrastructureError;

#[derive(Error, Debug, Diagnostic)]
pub enum TidyError {
    // --- PRECONDITIONS (nothing was mutated) ---
    #[error("module descriptor {} not found", .path.display())]
    #[diagnostic(
        code(tidyguard::missing_descriptor),
        help("Point the check at a module directory, or set `descriptor` in tidyguard.yaml.")
    )]
    MissingDescriptor { path: PathBuf },

    #[error(
        "working tree at {} has {} uncommitted change(s)",
        .dir.display(),
        .entries.len()
    )]
    #[diagnostic(
        code(tidyguard::dirty_worktree),
        help("Commit or stash local edits first, or drop --require-clean.")
    )]
    DirtyWorkingTree { dir: PathBuf, entries: Vec<String> },

    // --- NORMALIZER (tracked files restored before propagation) ---
    #[error("could not run `{command}`")]
    #[diagnostic(code(tidyguard::invocation))]
    InvocationFailure {
        command: String,
        #[source]
        cause: InvocationCause,
    },

    #[error("`{command}` exited with status {exit_code}{}", format_output(.output))]
    #[diagnostic(
        code(tidyguard::tool_failure),
        help("The normalizer itself rejected the module; its output is shown above.")
    )]
    ToolFailure {
        command: String,
        exit_code: i32,
        output: String,
    },

    // --- ROLLBACK ---
    #[error("restoring tracked files failed{}", format_prior(.prior))]
    #[diagnostic(
        code(tidyguard::restore),
        help("The module directory may be left modified; inspect it before committing.")
    )]
    RestoreFailed {
        #[source]
        source: InfrastructureError,
        /// Verdict reached before the rollback failed, if the probe got that far.
        needs_normalization: Option<bool>,
        prior: Option<Box<TidyError>>,
    },

    // --- NON-FATAL ---
    #[error("rendering diff for {label} failed: {reason}")]
    #[diagnostic(code(tidyguard::diff))]
    DiffRenderFailed { label: String, reason: String },

    // --- RUNNER ANNOTATION ---
    #[error("checking module {target:?}")]
    Target {
        target: String,
        #[source]
        source: Box<TidyError>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

fn format_prior(prior: &Option<Box<TidyError>>) -> String {
    match prior {
        Some(err) => format!(" after a previous error: {err}"),
        None => String::new(),
    }
}
