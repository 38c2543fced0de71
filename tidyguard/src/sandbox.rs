// tidyguard/src/sandbox.rs
//
// Path translation for running inside the GitHub Action container.
// Paths given as workflow inputs are host paths; the repository is mounted
// at /github/workspace inside the container.

use std::path::Path;

use anyhow::Context;
use regex::Regex;
use tracing::debug;

const ACTION_REPOSITORY_VAR: &str = "GITHUB_ACTION_REPOSITORY";
pub const ACTION_REPOSITORY: &str = "tidyguard/tidyguard";
const MOUNT_INFO_PATH: &str = "/proc/self/mountinfo";
const CONTAINER_MOUNT_POINT: &str = "/github/workspace";

// Quoted segment or bare word, followed by whitespace or end of input
const ARGS_PATTERN: &str = r#"("[^"]*"|[^"\s]+)(\s+|$)"#;

pub fn running_as_action() -> bool {
    std::env::var(ACTION_REPOSITORY_VAR).is_ok_and(|repo| repo == ACTION_REPOSITORY)
}

/// Rewrites host paths into container paths.
pub fn paths_inside_container(paths: Vec<String>) -> anyhow::Result<Vec<String>> {
    // A single argument may carry several paths (action inputs are one string)
    let paths = match paths.as_slice() {
        [single] => split_args(single)?,
        _ => paths,
    };

    let mount_info = std::fs::read_to_string(MOUNT_INFO_PATH)
        .with_context(|| format!("reading {MOUNT_INFO_PATH:?}"))?;
    let Some(source) = mount_source(&mount_info, CONTAINER_MOUNT_POINT) else {
        debug!("no mount for {CONTAINER_MOUNT_POINT}, leaving paths as given");
        return Ok(paths);
    };
    println!("mount source: {source}");

    Ok(translate(paths, &source, CONTAINER_MOUNT_POINT))
}

/// Splits a multi-argument string, keeping double-quoted segments whole.
pub fn split_args(multi_arg: &str) -> anyhow::Result<Vec<String>> {
    let re = Regex::new(ARGS_PATTERN).context("compiling argument pattern")?;
    Ok(re
        .find_iter(multi_arg)
        .map(|m| m.as_str().trim().to_string())
        .collect())
}

/// Root of the mount whose mount point is `mount_point`, from mountinfo text.
pub fn mount_source(mount_info: &str, mount_point: &str) -> Option<String> {
    mount_info.lines().find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [_, _, _, root, point, ..] if *point == mount_point => Some(root.to_string()),
            _ => None,
        }
    })
}

pub fn translate(paths: Vec<String>, mount_source: &str, mount_point: &str) -> Vec<String> {
    paths
        .into_iter()
        .map(|path| match path
            .strip_prefix(mount_source)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        {
            Some(rest) => {
                let rest = rest.trim_start_matches('/');
                let new_path = Path::new(mount_point).join(rest).display().to_string();
                println!("replacing path {path:?} with {new_path:?}");
                new_path
            }
            None => path,
        })
        .collect()
}
