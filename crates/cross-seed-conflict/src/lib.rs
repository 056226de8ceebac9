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

//! Conflict resolution: decides whether a higher-priority candidate should
//! evict an incumbent torrent from its owning clients, per an operator's
//! ordered conflict-rule set.

/// Error type for conflict resolution.
pub mod error;
/// External collaborator for requesting and verifying torrent removal.
pub mod client;
/// Priority computation and the all-or-nothing eviction algorithm.
pub mod resolver;

pub use client::ClientDriver;
pub use error::{ConflictError, ConflictResult};
pub use resolver::ConflictResolver;
