// tidyguard-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for the side-effecting collaborators (normalizer, VCS probe).
pub mod ports;

// 2. Domain
// Snapshots, targets, outcomes, diff rendering, configuration model.
// Depends on nothing else in the crate except the error taxonomy.
pub mod domain;

// 3. Infrastructure (Adapters)
// Filesystem snapshot store, process-backed normalizer, git status, config files.
pub mod infrastructure;

// 4. Application (Use Cases)
// Single-target verification transaction and the multi-target runner.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::TidyError;
