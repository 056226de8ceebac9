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

//! Content-addressed torrent cache and indexer-to-local correlation map.
//!
//! Layout: `error.rs` (`CacheError`), `store.rs` (`TorrentCache`, the
//! on-disk `{infoHash}.cached.torrent` store), `guid_map.rs`
//! (`GuidInfoHashMap`, the in-memory `(guid, link) -> info_hash` map used to
//! correlate repeated indexer hits without re-snatching).

/// Error type for cache operations.
pub mod error;
/// In-memory `(guid, link) -> info_hash` correlation map.
pub mod guid_map;
/// On-disk content-addressed torrent store.
pub mod store;

pub use error::CacheError;
pub use guid_map::GuidInfoHashMap;
pub use store::{MetafileParser, TorrentCache};
