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

//! Binary entrypoint that boots the cross-seeding engine and blocks until
//! shutdown.

use cross_seed_app::Collaborators;

/// Bootstraps the application and blocks until shutdown.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cross_seed_app::run_app(None, Collaborators::default())
        .await
        .map_err(anyhow::Error::from)
}
