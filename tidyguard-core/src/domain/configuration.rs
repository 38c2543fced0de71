// tidyguard-core/src/domain/configuration.rs

use serde::{Deserialize, Serialize};

/// External command that rewrites the tracked files in place.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            args: vec!["mod".to_string(), "tidy".to_string()],
        }
    }
}

impl NormalizerConfig {
    /// Shell-like rendering used in messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TidyConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    #[serde(default = "default_descriptor")]
    pub descriptor: String,

    /// `null` tracks the descriptor alone.
    #[serde(default = "default_lock")]
    pub lock: Option<String>,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "require-clean-worktree", default)]
    pub require_clean_worktree: bool,
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            descriptor: default_descriptor(),
            lock: default_lock(),
            timeout_secs: default_timeout_secs(),
            require_clean_worktree: false,
        }
    }
}

fn default_descriptor() -> String {
    "go.mod".to_string()
}
fn default_lock() -> Option<String> {
    Some("go.sum".to_string())
}
fn default_timeout_secs() -> u64 {
    300
}
