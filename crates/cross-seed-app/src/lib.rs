//! Application bootstrap: wires configuration, persistence, the torrent
//! cache, and the job scheduler together behind a single `run_app` entry
//! point.

#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

/// Application bootstrap wiring.
pub mod bootstrap;
/// `CLEANUP` job executor.
pub mod cleanup;
/// Application-level error type.
pub mod error;

pub use bootstrap::{run_app, Collaborators};
pub use cleanup::CleanupExecutor;
pub use error::{AppError, AppResult};
