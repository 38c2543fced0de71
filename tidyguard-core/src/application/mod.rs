// tidyguard-core/src/application/mod.rs

pub mod runner;
pub mod verify;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI do `use tidyguard_core::application::{run_targets, TidinessVerifier};`
pub use runner::{RunSummary, run_targets};
pub use verify::{TidinessVerifier, VerifyOptions};
