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

//! Shared fixtures and environment probes used across this workspace's
//! test suites.

/// Docker-daemon reachability probe for Postgres-backed integration tests.
pub mod docker;
/// Builders for domain fixtures (metafiles, searchees, candidates).
pub mod fixtures;
