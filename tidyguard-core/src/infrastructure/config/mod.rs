pub mod project;

pub use crate::domain::configuration::{NormalizerConfig, TidyConfig};
pub use project::{apply_env_overrides, load_config};
