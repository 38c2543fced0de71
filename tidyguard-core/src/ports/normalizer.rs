// tidyguard-core/src/ports/normalizer.rs

// What the verifier needs from the tool that rewrites the manifest pair.
// The tool is a black box: the verifier only observes its side effects on disk.

use std::path::Path;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::outcome::NormalizationOutcome;

#[async_trait]
pub trait Normalizer: Send + Sync {
    /// Runs the tool once with `dir` as working directory. Must give up at
    /// `deadline` and report that as an invocation failure.
    async fn run(&self, dir: &Path, deadline: Instant) -> NormalizationOutcome;

    /// Human readable command line, for messages.
    fn describe(&self) -> String;
}
