// tidyguard-core/src/infrastructure/normalizer.rs

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::domain::configuration::NormalizerConfig;
use crate::domain::outcome::{InvocationCause, NormalizationOutcome};
use crate::ports::normalizer::Normalizer;

/// Per-stream cap on retained output. Anything past it is drained and dropped.
const MAX_CAPTURED_BYTES: u64 = 4 * 1024 * 1024;

/// How long output is still read once the process has exited.
const PIPE_GRACE: Duration = Duration::from_secs(2);

/// Runs the configured program as a child process.
#[derive(Debug, Clone)]
pub struct CommandNormalizer {
    config: NormalizerConfig,
}

impl CommandNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Normalizer for CommandNormalizer {
    #[instrument(skip(self), fields(command = %self.config.command_line()))]
    async fn run(&self, dir: &Path, deadline: Instant) -> NormalizationOutcome {
        let start = Instant::now();

        let mut child = match Command::new(&self.config.program)
            .args(&self.config.args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                return NormalizationOutcome::InvocationFailure {
                    cause: InvocationCause::Spawn {
                        program: self.config.program.clone(),
                        source,
                    },
                };
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut output = Vec::new();
        let mut stderr_bytes = Vec::new();
        let collected = tokio::time::timeout_at(deadline, async {
            let drains = async {
                tokio::try_join!(drain(stdout, &mut output), drain(stderr, &mut stderr_bytes))
                    .map(|_| ())
            };
            tokio::pin!(drains);

            let status = tokio::select! {
                status = child.wait() => status?,
                drained = &mut drains => {
                    drained?;
                    return child.wait().await;
                }
            };
            // A background grandchild may keep the pipes open after the tool exits
            match tokio::time::timeout(PIPE_GRACE, &mut drains).await {
                Ok(drained) => drained?,
                Err(_) => warn!("normalizer exited with its output pipes still open; output truncated"),
            }
            Ok::<_, io::Error>(status)
        })
        .await;

        let status = match collected {
            Ok(Ok(status)) => status,
            Ok(Err(source)) => {
                return NormalizationOutcome::InvocationFailure {
                    cause: InvocationCause::Wait {
                        program: self.config.program.clone(),
                        source,
                    },
                };
            }
            Err(_elapsed) => {
                // Reap before returning so the restore does not race the tool.
                // Only the direct child is killed; its own children are not tracked.
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill normalizer after deadline");
                }
                return NormalizationOutcome::InvocationFailure {
                    cause: InvocationCause::DeadlineExceeded(start.elapsed()),
                };
            }
        };
        output.extend_from_slice(&stderr_bytes);

        debug!(?status, elapsed = ?start.elapsed(), "normalizer finished");

        if status.success() {
            return NormalizationOutcome::Success;
        }
        match status.code() {
            Some(exit_code) => NormalizationOutcome::ToolFailure {
                exit_code,
                output: String::from_utf8_lossy(&output).into_owned(),
            },
            None => NormalizationOutcome::InvocationFailure {
                cause: InvocationCause::Killed,
            },
        }
    }

    fn describe(&self) -> String {
        self.config.command_line()
    }
}

/// Reads a pipe to the end, keeping at most [`MAX_CAPTURED_BYTES`].
async fn drain<R>(pipe: Option<R>, buf: &mut Vec<u8>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(());
    };
    (&mut pipe).take(MAX_CAPTURED_BYTES).read_to_end(buf).await?;
    tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh(script: &str) -> CommandNormalizer {
        CommandNormalizer::new(NormalizerConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
        })
    }

    fn in_a_minute() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_zero_exit_is_success_even_when_files_change() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let outcome = sh("echo rewritten > go.mod").run(dir.path(), in_a_minute()).await;

        assert!(matches!(outcome, NormalizationOutcome::Success));
        assert_eq!(std::fs::read_to_string(dir.path().join("go.mod"))?, "rewritten\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_tool_failure_with_combined_output() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let outcome = sh("echo resolving; echo 'go: missing go.sum entry' >&2; exit 3")
            .run(dir.path(), in_a_minute())
            .await;

        match outcome {
            NormalizationOutcome::ToolFailure { exit_code, output } => {
                assert_eq!(exit_code, 3);
                assert_eq!(output, "resolving\ngo: missing go.sum entry\n");
            }
            other => anyhow::bail!("expected tool failure, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_binary_is_invocation_failure() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let normalizer = CommandNormalizer::new(NormalizerConfig {
            program: "tidyguard-no-such-normalizer".to_string(),
            args: vec![],
        });

        let outcome = normalizer.run(dir.path(), in_a_minute()).await;
        assert!(matches!(
            outcome,
            NormalizationOutcome::InvocationFailure {
                cause: InvocationCause::Spawn { .. }
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_background_grandchild_holding_pipes_does_not_block() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let started = Instant::now();
        let outcome = sh("sleep 30 & echo tidied")
            .run(dir.path(), in_a_minute())
            .await;

        assert!(matches!(outcome, NormalizationOutcome::Success));
        assert!(started.elapsed() < Duration::from_secs(20));
        Ok(())
    }

    #[tokio::test]
    async fn test_deadline_kills_the_process() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let started = Instant::now();
        let outcome = sh("sleep 30")
            .run(dir.path(), Instant::now() + Duration::from_millis(200))
            .await;

        assert!(matches!(
            outcome,
            NormalizationOutcome::InvocationFailure {
                cause: InvocationCause::DeadlineExceeded(_)
            }
        ));
        assert!(started.elapsed() < Duration::from_secs(10));
        Ok(())
    }
}
