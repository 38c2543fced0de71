// Drives the binary against copies of tests/testdata with a shell script
// standing in for `go mod tidy`.
#![cfg(unix)]

use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Drops every line mentioning "unused" from the tracked files that exist.
const TIDY_SCRIPT: &str = r#"for f in go.mod go.sum; do [ -f "$f" ] || continue; grep -v unused "$f" > "$f.tidy"; mv "$f.tidy" "$f"; done"#;

/// Abstraction for managing the test environment.
struct TidyTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl TidyTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let testdata = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/testdata");

        let dest = tmp.path().join("repo");
        Self::copy_dir(&testdata, &dest)?;

        let env = Self {
            _tmp: tmp,
            root: dest,
        };
        env.write_config(&format!(
            "normalizer:\n  program: sh\n  args: ['-c', '{TIDY_SCRIPT}']\ntimeout-secs: 60\n"
        ))?;
        Ok(env)
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.content_only = true;

        fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn write_config(&self, yaml: &str) -> Result<()> {
        fs::write(self.root.join("tidyguard.yaml"), yaml)?;
        Ok(())
    }

    fn read(&self, rel: &str) -> Result<String> {
        fs::read_to_string(self.root.join(rel)).with_context(|| format!("reading {rel}"))
    }

    fn tidyguard(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tidyguard"));
        cmd.current_dir(&self.root)
            .env_remove("GITHUB_ACTION_REPOSITORY")
            .env_remove("TIDYGUARD_CONFIG")
            .env_remove("TIDYGUARD_TIMEOUT_SECS")
            .env_remove("TIDYGUARD_REQUIRE_CLEAN")
            .env_remove("TIDYGUARD_NORMALIZER")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn test_tidy_module_exits_zero() -> Result<()> {
    let env = TidyTestEnv::new()?;

    env.tidyguard()
        .arg("tidy/module3")
        .assert()
        .success()
        .stdout(predicate::str::contains("isn't tidy").not());
    Ok(())
}

#[test]
fn test_multiple_modules_including_untidy() -> Result<()> {
    let env = TidyTestEnv::new()?;
    let mod_before = env.read("untidy/module1/go.mod")?;
    let sum_before = env.read("untidy/module1/go.sum")?;

    env.tidyguard()
        .args(["-d", "untidy/module1", "untidy/module2", "tidy/module3"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "module in \"./untidy/module1\" isn't tidy",
        ))
        .stdout(predicate::str::contains(
            "module in \"./untidy/module2\" isn't tidy",
        ))
        .stdout(predicate::str::contains("tidy/module3\" isn't tidy").not())
        .stdout(predicate::str::contains("--- a/untidy/module1/go.mod"))
        .stdout(predicate::str::contains("+++ b/untidy/module1/go.sum"))
        .stdout(predicate::str::contains("-\texample.com/unused v0.3.1"));

    // Nothing left behind
    assert_eq!(env.read("untidy/module1/go.mod")?, mod_before);
    assert_eq!(env.read("untidy/module1/go.sum")?, sum_before);
    assert!(!env.root.join("untidy/module2/go.sum").exists());
    assert!(!env.root.join("untidy/module1/go.mod.tidy").exists());
    Ok(())
}

#[test]
fn test_diffs_are_only_printed_on_request() -> Result<()> {
    let env = TidyTestEnv::new()?;

    env.tidyguard()
        .arg("untidy/module1")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("isn't tidy"))
        .stdout(predicate::str::contains("--- a/").not());
    Ok(())
}

#[test]
fn test_empty_args_default_to_current_directory() -> Result<()> {
    let env = TidyTestEnv::new()?;
    fs::copy(env.root.join("tidyguard.yaml"), env.root.join("tidy/module3/tidyguard.yaml"))?;

    let mut cmd = env.tidyguard();
    cmd.current_dir(env.root.join("tidy/module3"));
    cmd.assert().success();
    Ok(())
}

#[test]
fn test_untidy_current_directory_has_no_location() -> Result<()> {
    let env = TidyTestEnv::new()?;
    fs::copy(env.root.join("tidyguard.yaml"), env.root.join("untidy/module2/tidyguard.yaml"))?;

    let mut cmd = env.tidyguard();
    cmd.current_dir(env.root.join("untidy/module2"));
    cmd.assert()
        .code(1)
        .stdout(predicate::str::starts_with("module isn't tidy"));
    Ok(())
}

#[test]
fn test_recursive_suffix_is_accepted() -> Result<()> {
    let env = TidyTestEnv::new()?;

    env.tidyguard()
        .arg("untidy/module1/...")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "module in \"./untidy/module1\" isn't tidy",
        ));
    Ok(())
}

#[test]
fn test_missing_descriptor_is_a_hard_error() -> Result<()> {
    let env = TidyTestEnv::new()?;
    fs::create_dir_all(env.root.join("empty"))?;

    env.tidyguard()
        .args(["tidy/module3", "empty", "untidy/module1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("checking module \"empty\""))
        .stderr(predicate::str::contains("go.mod not found"))
        // Aborted before reaching the untidy module
        .stdout(predicate::str::contains("isn't tidy").not());
    Ok(())
}

#[test]
fn test_tool_failure_is_reported_and_rolled_back() -> Result<()> {
    let env = TidyTestEnv::new()?;
    env.write_config(
        "normalizer:\n  program: sh\n  args: ['-c', 'echo broken > go.mod; echo no network >&2; exit 2']\n",
    )?;
    let before = env.read("untidy/module1/go.mod")?;

    env.tidyguard()
        .arg("untidy/module1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with status 2"))
        .stderr(predicate::str::contains("no network"));

    assert_eq!(env.read("untidy/module1/go.mod")?, before);
    Ok(())
}

#[test]
fn test_missing_normalizer_binary_is_reported() -> Result<()> {
    let env = TidyTestEnv::new()?;
    env.write_config("normalizer:\n  program: tidyguard-no-such-tool\n")?;

    env.tidyguard()
        .arg("tidy/module3")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not run `tidyguard-no-such-tool`"));
    Ok(())
}

#[test]
fn test_explicit_missing_config_fails() -> Result<()> {
    let env = TidyTestEnv::new()?;

    env.tidyguard()
        .args(["--config", "nope.yaml", "tidy/module3"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn test_oversized_timeout_is_a_config_error() -> Result<()> {
    let env = TidyTestEnv::new()?;

    env.tidyguard()
        .env("TIDYGUARD_TIMEOUT_SECS", u64::MAX.to_string())
        .arg("tidy/module3")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timeout-secs must be at most"))
        .stderr(predicate::str::contains("panicked").not());
    Ok(())
}

#[test]
fn test_version_short_circuits() -> Result<()> {
    let env = TidyTestEnv::new()?;

    env.tidyguard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tidyguard "));
    Ok(())
}
