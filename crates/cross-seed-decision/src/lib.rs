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
#![allow(
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::cast_precision_loss
)]

//! Candidate assessment engine: classifies a candidate release or
//! already-parsed metafile against a local searchee into the decision
//! taxonomy, driving the pre-filter chain, snatch retries, identity
//! checks, and content matching described across this crate's modules.

/// Error type for decision engine operations.
pub mod error;
/// Per-call tuning (match mode, fuzzy size tolerance, season-pack opt-in).
pub mod options;
/// Release-name pre-filter chain and block-list matching.
pub mod prefilter;
/// File-tree comparison (full, size-only, partial) and season-pack guard.
pub mod matching;
/// External snatcher collaborator trait.
pub mod snatcher;
/// Core assessment engine.
pub mod engine;
/// Persistence wrapper implementing the excluded-hash short-circuit path.
pub mod caching;

pub use caching::CachingAssessor;
pub use engine::{CandidateOrMetafile, ConflictResolver, DecisionEngine, TrackerLookup};
pub use error::{DecisionError, DecisionResult};
pub use options::{AssessmentOptions, MatchMode};
pub use snatcher::{SnatchFailure, Snatcher};
