// tidyguard-core/src/application/runner.rs

use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::application::verify::TidinessVerifier;
use crate::domain::outcome::VerificationResult;
use crate::domain::target::Target;
use crate::error::TidyError;

/// Aggregate of a multi-target run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// True if any target needs normalization.
    pub untidy: bool,
    /// Per-target results, in argument order.
    pub results: Vec<VerificationResult>,
}

/// Verifies each target in turn against one shared deadline.
///
/// No targets means the current directory. The first hard error stops the
/// run and is returned annotated with the offending target. Untidy targets
/// are reported on stdout as they are found.
#[instrument(skip_all, fields(targets = targets.len()))]
pub async fn run_targets<S: AsRef<str>>(
    verifier: &TidinessVerifier<'_>,
    targets: &[S],
    deadline: Instant,
) -> Result<RunSummary, TidyError> {
    let targets: Vec<Target> = if targets.is_empty() {
        vec![Target::implicit()]
    } else {
        targets.iter().map(|raw| Target::parse(raw.as_ref())).collect()
    };

    let mut summary = RunSummary::default();
    for target in &targets {
        if target.was_trimmed() {
            debug!(raw = target.raw(), "trimming trailing /... from module path");
        }
        debug!("checking module {:?}", target.to_string());

        let result = verifier
            .verify(target, deadline)
            .await
            .map_err(|source| TidyError::Target {
                target: target.to_string(),
                source: Box::new(source),
            })?;

        if result.needs_normalization {
            println!("module{} isn't tidy", target.location_suffix());
            if let Some(diff) = &result.diff {
                print!("{diff}");
            }
        }

        summary.untidy |= result.needs_normalization;
        summary.results.push(result);
    }

    Ok(summary)
}
