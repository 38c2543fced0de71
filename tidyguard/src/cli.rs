// tidyguard/src/cli.rs
//
// Single source of truth for the CLI definition (Clap structs).

use clap::Parser;
use std::path::PathBuf;

/// Version injected at build time (`TIDYGUARD_VERSION=v1.2.3 cargo build`),
/// falling back to the crate version.
pub const VERSION: &str = match option_env!("TIDYGUARD_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Parser, Debug)]
#[command(name = "tidyguard")]
#[command(about = "tidyguard checks if your modules are tidy.", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// Verbose debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print diffs of what the normalizer would change
    #[arg(short, long)]
    pub diff: bool,

    /// Configuration file (default: ./tidyguard.yaml when present)
    #[arg(short, long, env = "TIDYGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Refuse to check modules with uncommitted changes
    #[arg(long)]
    pub require_clean: bool,

    /// Module directories (default: current directory). A trailing `/...` is ignored.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}
