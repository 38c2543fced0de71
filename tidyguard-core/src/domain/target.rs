// tidyguard-core/src/domain/target.rs

use std::fmt;
use std::path::{Path, PathBuf};

const RECURSIVE_SUFFIX: &str = "/...";

/// A module directory as given on the command line.
///
/// The empty string stands for the current directory. A trailing `/...` is
/// accepted for compatibility with package patterns but only the named
/// directory itself is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    raw: String,
    path: String,
}

impl Target {
    pub fn parse(raw: &str) -> Self {
        let path = raw.strip_suffix(RECURSIVE_SUFFIX).unwrap_or(raw);
        Self {
            raw: raw.to_string(),
            path: path.to_string(),
        }
    }

    /// The current directory.
    pub fn implicit() -> Self {
        Self::parse("")
    }

    pub fn is_implicit(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether a recursive suffix was dropped from the raw argument.
    pub fn was_trimmed(&self) -> bool {
        self.raw != self.path
    }

    /// The argument as the user typed it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Base for tracked file paths. Empty for the implicit target so labels
    /// read `go.mod` rather than `./go.mod`.
    pub fn base(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Working directory for child processes.
    pub fn working_dir(&self) -> PathBuf {
        if self.is_implicit() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.path)
        }
    }

    /// ` in "./path"` fragment of the status line, empty for the implicit target.
    pub fn location_suffix(&self) -> String {
        if self.is_implicit() {
            return String::new();
        }
        let shown = if self.path.starts_with('/') || self.path.starts_with('.') {
            self.path.clone()
        } else {
            format!("./{}", self.path)
        };
        format!(" in {shown:?}")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
