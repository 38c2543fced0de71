// tidyguard-core/src/domain/mod.rs

pub mod configuration;
pub mod diff;
pub mod outcome;
pub mod snapshot;
pub mod target;

// Handy re-exports to keep imports short elsewhere
pub use configuration::{NormalizerConfig, TidyConfig};
pub use diff::DiffRenderer;
pub use outcome::{InvocationCause, NormalizationOutcome, VerificationResult};
pub use snapshot::{FileState, Linkage, Presence, Snapshot, TrackedFile, TrackedFilePair};
pub use target::Target;
