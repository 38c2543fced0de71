// tidyguard-core/src/ports/mod.rs

pub mod normalizer;
pub mod worktree;

pub use normalizer::Normalizer;
pub use worktree::WorktreeStatus;
