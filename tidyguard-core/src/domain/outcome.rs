// tidyguard-core/src/domain/outcome.rs

use std::time::Duration;

use thiserror::Error;

/// Why the normalizer could not be run to completion.
#[derive(Error, Debug)]
pub enum InvocationCause {
    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lost track of `{program}` while it was running")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("deadline exceeded after {0:.2?}, process killed")]
    DeadlineExceeded(Duration),

    #[error("process terminated by a signal")]
    Killed,
}

/// Result of one normalizer run. Consumed by the verifier immediately.
#[derive(Debug)]
pub enum NormalizationOutcome {
    Success,
    ToolFailure { exit_code: i32, output: String },
    InvocationFailure { cause: InvocationCause },
}

/// Verdict for one target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub target: String,
    pub needs_normalization: bool,
    pub diff: Option<String>,
}

impl VerificationResult {
    pub fn tidy(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            needs_normalization: false,
            diff: None,
        }
    }
}
