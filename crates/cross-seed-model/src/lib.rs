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

//! Core domain types for the cross-seeding engine.
//!
//! Layout: `metafile.rs` (parsed-torrent value type), `searchee.rs` (local
//! seeded content), `candidate.rs` (indexer search hits), `tracker.rs`
//! (hostname normalization shared by every subsystem that compares tracker
//! sets), and `decision.rs` (the exhaustive decision taxonomy and the
//! `ResultAssessment` the decision engine produces).

/// Indexer search hit under evaluation by the decision engine.
pub mod candidate;
/// Exhaustive decision taxonomy and assessment result type.
pub mod decision;
/// Parsed-torrent value type (`Metafile`) and its file entries.
pub mod metafile;
/// Local seeded content (`Searchee`) that candidates are compared against.
pub mod searchee;
/// Tracker hostname normalization shared across subsystems.
pub mod tracker;

pub use candidate::Candidate;
pub use decision::{Decision, ResultAssessment, TrackerMismatch};
pub use metafile::{Metafile, MetafileFile, Privacy};
pub use searchee::{Searchee, SearcheeLabel};
pub use tracker::normalize_trackers;
