// tidyguard-core/src/infrastructure/mod.rs

pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod normalizer;
pub mod snapshot;

pub use git::GitWorktree;
pub use normalizer::CommandNormalizer;
